//! Constrained parametric difference-bound matrices
//!
//! A [`Cpdbm`] is a pair `(C, D)` of a parameter constraint set and a
//! [`Pdbm`]; its semantics is the set of (parameter valuation, clock
//! valuation) pairs satisfying both. This is the type the reachability
//! driver works with: it threads `C` through every matrix operation, wraps
//! each produced `(C', D')` pair, and filters out empty zones.

use std::fmt;

use log::debug;
use parda_display_utils::indent_all;

use crate::expressions::constraint::ConstraintSet;
use crate::expressions::Clock;
use crate::oracle::{Oracle, OracleError, Satisfiability};
use crate::zone::pdbm::Pdbm;
use crate::zone::{AtomicGuard, ResetSet};

/// A parametrised zone `(C, D)`
///
/// Immutable like everything else in the engine; operations return fresh
/// values. Operations that may split the parameter space return
/// `Vec<Cpdbm>` in deterministic order with empty results removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cpdbm {
    constraints: ConstraintSet,
    pdbm: Pdbm,
}

impl Cpdbm {
    /// Pair a constraint set with a matrix
    pub fn new(constraints: ConstraintSet, pdbm: Pdbm) -> Self {
        Cpdbm { constraints, pdbm }
    }

    /// Seed zones for the given clocks: `∀c. c >= 0` under `constraints`,
    /// canonicalised, with empty results removed
    pub fn create_initial(
        clocks: impl IntoIterator<Item = Clock>,
        constraints: ConstraintSet,
        oracle: &mut dyn Oracle,
    ) -> Result<Vec<Cpdbm>, OracleError> {
        Cpdbm::new(constraints, Pdbm::initial(clocks)).canonical(oracle)
    }

    /// The parameter constraint set `C`
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// The matrix `D`
    pub fn pdbm(&self) -> &Pdbm {
        &self.pdbm
    }

    /// Conjoin an atomic guard; see [`Pdbm::add_guard`]
    pub fn add_guard(
        &self,
        guard: &AtomicGuard,
        oracle: &mut dyn Oracle,
    ) -> Result<Vec<Cpdbm>, OracleError> {
        let pairs = self.pdbm.add_guard(guard, &self.constraints, oracle)?;
        Self::wrap_non_empty(pairs, oracle)
    }

    /// Canonicalise the zone; see [`Pdbm::canonical`]
    pub fn canonical(&self, oracle: &mut dyn Oracle) -> Result<Vec<Cpdbm>, OracleError> {
        let pairs = self.pdbm.canonical(&self.constraints, oracle)?;
        Self::wrap_non_empty(pairs, oracle)
    }

    /// Let time elapse; see [`Pdbm::delay`]
    pub fn delay(&self) -> Cpdbm {
        Cpdbm::new(self.constraints.clone(), self.pdbm.delay())
    }

    /// Reset clocks to constants; see [`Pdbm::reset`]
    pub fn reset(&self, resets: &ResetSet) -> Cpdbm {
        Cpdbm::new(self.constraints.clone(), self.pdbm.reset(resets))
    }

    /// Conjoin a guard and restore canonicity in one step
    ///
    /// Equivalent to [`Cpdbm::add_guard`] followed by [`Cpdbm::canonical`]
    /// on every produced zone, with duplicates and empties removed. This is
    /// the operation a reachability driver applies once per guard atom.
    pub fn add_guard_and_canonical(
        &self,
        guard: &AtomicGuard,
        oracle: &mut dyn Oracle,
    ) -> Result<Vec<Cpdbm>, OracleError> {
        let mut results = Vec::new();
        for zone in self.add_guard(guard, oracle)? {
            for canonical in zone.canonical(oracle)? {
                if !results.contains(&canonical) {
                    results.push(canonical);
                }
            }
        }
        Ok(results)
    }

    /// Let time elapse and restore canonicity
    pub fn delay_and_canonical(
        &self,
        oracle: &mut dyn Oracle,
    ) -> Result<Vec<Cpdbm>, OracleError> {
        self.delay().canonical(oracle)
    }

    /// Reset clocks and restore canonicity
    pub fn reset_and_canonical(
        &self,
        resets: &ResetSet,
        oracle: &mut dyn Oracle,
    ) -> Result<Vec<Cpdbm>, OracleError> {
        self.reset(resets).canonical(oracle)
    }

    /// Decide whether the zone denotes the empty set
    ///
    /// The constraint set is checked first; only if it is satisfiable is
    /// the matrix consulted. Undecided queries are conservatively treated
    /// as non-empty.
    pub fn is_empty(&self, oracle: &mut dyn Oracle) -> Result<bool, OracleError> {
        match oracle.is_sat(&self.constraints)? {
            Satisfiability::Unsat => {
                debug!("is_empty: constraint set {} is unsatisfiable", self.constraints);
                return Ok(true);
            }
            Satisfiability::Unknown => {
                debug!(
                    "is_empty: satisfiability of {} undecided, treating zone as non-empty",
                    self.constraints
                );
                return Ok(false);
            }
            Satisfiability::Sat => {}
        }
        self.pdbm.is_empty(&self.constraints, oracle)
    }

    fn wrap_non_empty(
        pairs: Vec<(ConstraintSet, Pdbm)>,
        oracle: &mut dyn Oracle,
    ) -> Result<Vec<Cpdbm>, OracleError> {
        let mut result = Vec::new();
        for (constraints, pdbm) in pairs {
            let zone = Cpdbm::new(constraints, pdbm);
            if !zone.is_empty(oracle)? && !result.contains(&zone) {
                result.push(zone);
            }
        }
        Ok(result)
    }
}

impl fmt::Display for Cpdbm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(C: {},", self.constraints)?;
        writeln!(f, " D:")?;
        write!(f, "{})", indent_all(&self.pdbm.to_string()))
    }
}
