//! A test oracle for parameter-free automata
//!
//! With no parameters in play every coverage comparison is resolved inside
//! the engine, so the oracle is only asked about constant constraint sets
//! and constant clock bounds. Satisfiability of the bounds is decided by
//! negative-cycle detection; anything parametric panics, which is what a
//! parameter-free test wants.

use std::collections::{BTreeSet, HashMap};

use parda_pdbm::{
    AtomicGuard, Clock, ConstraintSet, Coverage, Oracle, OracleError, ParameterConstraint,
    ParameterValuation, Rational, RelationType, Satisfiability,
};

#[derive(Debug, Default)]
pub struct ConstantOracle;

impl ConstantOracle {
    pub fn new() -> Self {
        ConstantOracle
    }
}

impl Oracle for ConstantOracle {
    fn is_sat(&mut self, constraints: &ConstraintSet) -> Result<Satisfiability, OracleError> {
        for constraint in constraints.iter() {
            assert!(
                constraint.expr().is_constant(),
                "parametric constraint {constraint} reached the constant-only oracle"
            );
            if constraint.is_trivially_false() {
                return Ok(Satisfiability::Unsat);
            }
        }
        Ok(Satisfiability::Sat)
    }

    fn check_coverage(
        &mut self,
        candidate: &ParameterConstraint,
        _context: &ConstraintSet,
    ) -> Result<Coverage, OracleError> {
        if candidate.is_trivially_true() {
            return Ok(Coverage::Yes);
        }
        if candidate.is_trivially_false() {
            return Ok(Coverage::No);
        }
        panic!("parametric comparison {candidate} reached the constant-only oracle");
    }

    fn is_zone_sat(
        &mut self,
        constraints: &ConstraintSet,
        bounds: &[AtomicGuard],
    ) -> Result<Satisfiability, OracleError> {
        if self.is_sat(constraints)? == Satisfiability::Unsat {
            return Ok(Satisfiability::Unsat);
        }

        let no_parameters = ParameterValuation::default();

        let mut clocks: BTreeSet<Clock> = BTreeSet::new();
        clocks.insert(Clock::ZERO);
        for guard in bounds {
            let (lhs, rhs) = guard.upper_clocks();
            clocks.insert(lhs);
            clocks.insert(rhs);
        }
        let clocks: Vec<Clock> = clocks.into_iter().collect();
        let index: HashMap<Clock, usize> =
            clocks.iter().enumerate().map(|(i, c)| (*c, i)).collect();
        let n = clocks.len();

        // (bound, strict) weights; shortest paths must not close a
        // negative cycle
        let mut weights = vec![(Rational::infinity(), true); n * n];
        for i in 0..n {
            weights[i * n + i] = (Rational::zero(), false);
        }
        for guard in bounds {
            let (lhs, rhs) = guard.upper_clocks();
            let (i, j) = (index[&lhs], index[&rhs]);
            let value = guard.upper_bound().evaluate(&no_parameters);
            let strict = guard.upper_bound_relation() == RelationType::Lt;
            if tighter(&(value.clone(), strict), &weights[i * n + j]) {
                weights[i * n + j] = (value, strict);
            }
        }

        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if !weights[i * n + k].0.is_finite() || !weights[k * n + j].0.is_finite() {
                        continue;
                    }
                    let candidate = (
                        &weights[i * n + k].0 + &weights[k * n + j].0,
                        weights[i * n + k].1 || weights[k * n + j].1,
                    );
                    if tighter(&candidate, &weights[i * n + j]) {
                        weights[i * n + j] = candidate;
                    }
                }
            }
        }

        let consistent = (0..n).all(|i| {
            let (value, strict) = &weights[i * n + i];
            *value > Rational::zero() || (*value == Rational::zero() && !strict)
        });
        Ok(if consistent {
            Satisfiability::Sat
        } else {
            Satisfiability::Unsat
        })
    }
}

fn tighter(a: &(Rational, bool), b: &(Rational, bool)) -> bool {
    a.0 < b.0 || (a.0 == b.0 && a.1 && !b.1)
}
