//! The decision procedure interface consumed by the engine
//!
//! Every comparison between parametric bounds is delegated to an
//! [`Oracle`], an external decision procedure over linear real arithmetic
//! in which all parameters are non-negative reals, the zero clock is fixed
//! at 0 and all other clocks are non-negative.
//!
//! The engine takes the oracle by mutable reference: implementations are
//! expected to hold per-thread solver state (see `parda-smt-oracle`), and
//! one oracle value is owned by exactly one computation at a time. Calls
//! must be referentially transparent for a fixed set of clocks and
//! parameters.
//!
//! `Unknown` results are values, not errors: the engine prunes the affected
//! branch, trading completeness for soundness. Transport failures of the
//! underlying procedure are [`OracleError`]s and propagate to the caller
//! unchanged.

use std::fmt;
use std::io;

use crate::expressions::constraint::{ConstraintSet, ParameterConstraint};
use crate::zone::AtomicGuard;

/// Result of a satisfiability query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfiability {
    /// The query is satisfiable
    Sat,
    /// The query is unsatisfiable
    Unsat,
    /// The procedure could not decide (e.g. a timeout)
    Unknown,
}

impl fmt::Display for Satisfiability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Satisfiability::Sat => write!(f, "SAT"),
            Satisfiability::Unsat => write!(f, "UNSAT"),
            Satisfiability::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Result of a coverage query `check_coverage(c, C)`
///
/// For a candidate constraint `c` and a context `C`:
/// - `Yes` iff `C ⊨ c` (`C ∧ ¬c` is unsatisfiable)
/// - `No` iff `C ⊨ ¬c` (`C ∧ c` is unsatisfiable)
/// - `Split` iff both `C ∧ c` and `C ∧ ¬c` are satisfiable
/// - `Unknown` otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// The context entails the candidate
    Yes,
    /// The context entails the negated candidate
    No,
    /// The candidate holds on part of the context only
    Split,
    /// The procedure could not decide
    Unknown,
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coverage::Yes => write!(f, "YES"),
            Coverage::No => write!(f, "NO"),
            Coverage::Split => write!(f, "SPLIT"),
            Coverage::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Failure of an oracle implementation
///
/// These are transport-level failures, not undecided queries; the engine
/// re-raises them without touching any state (all engine values are
/// immutable, so a failed operation leaves nothing half-done).
#[derive(Debug)]
pub enum OracleError {
    /// The connection to the underlying decision procedure broke
    Transport(io::Error),
    /// The query cannot be expressed in the oracle's theory
    UnsupportedQuery(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Transport(err) => {
                write!(f, "transport failure in the decision procedure: {err}")
            }
            OracleError::UnsupportedQuery(what) => {
                write!(f, "query not expressible in the oracle theory: {what}")
            }
        }
    }
}

impl std::error::Error for OracleError {}

impl From<io::Error> for OracleError {
    fn from(err: io::Error) -> Self {
        OracleError::Transport(err)
    }
}

/// A decision procedure over linear real arithmetic
///
/// The theory fixes `x0 = 0`, all other clocks non-negative and all
/// parameters non-negative; implementations assert these axioms themselves.
///
/// The engine resolves constant-only comparisons internally, so
/// implementations only ever receive finite, genuinely parametric
/// constraints.
pub trait Oracle {
    /// Is the conjunction of `constraints` satisfiable?
    fn is_sat(&mut self, constraints: &ConstraintSet) -> Result<Satisfiability, OracleError>;

    /// How does `candidate` relate to the region described by `context`?
    fn check_coverage(
        &mut self,
        candidate: &ParameterConstraint,
        context: &ConstraintSet,
    ) -> Result<Coverage, OracleError>;

    /// Is the conjunction of `constraints` and the clock-difference
    /// `bounds` satisfiable?
    ///
    /// This is the emptiness query of a zone: `bounds` are the finite
    /// entries of a difference-bound matrix.
    fn is_zone_sat(
        &mut self,
        constraints: &ConstraintSet,
        bounds: &[AtomicGuard],
    ) -> Result<Satisfiability, OracleError>;
}
