//! A library for symbolic clock zones of parametric timed automata
//!
//! This crate implements the Parametric Difference-Bound Matrix (PDBM)
//! engine: an immutable representation of convex clock zones whose bounds
//! are linear expressions over symbolic parameters, together with the
//! operations a reachability analysis is built from:
//!
//! - [`zone::pdbm::Pdbm::add_guard`]: conjoin an atomic clock constraint
//! - [`zone::pdbm::Pdbm::canonical`]: tighten all bounds by symbolic
//!   all-pairs shortest paths
//! - [`zone::pdbm::Pdbm::delay`]: let time elapse
//! - [`zone::pdbm::Pdbm::reset`]: snap clocks to constant values
//! - [`zone::pdbm::Pdbm::is_empty`]: decide emptiness of the zone
//!
//! Because bounds contain parameters, comparisons between them may hold on
//! only part of the parameter space. Operations therefore produce *sets* of
//! [`zone::cpdbm::Cpdbm`] results, each pairing a refined
//! [`expressions::constraint::ConstraintSet`] with a matrix valid on that
//! sub-region.
//!
//! Every comparison is delegated to an [`oracle::Oracle`], a pluggable
//! decision procedure for linear real arithmetic. The engine itself never
//! approximates: all arithmetic is exact rational arithmetic via
//! [`expressions::rational::Rational`].

pub mod expressions;
pub mod oracle;
pub mod zone;

pub use expressions::rational::Rational;
pub use expressions::{Clock, Parameter, ParameterValuation, RelationType};
pub use expressions::{
    constraint::{ConstraintSet, ParameterConstraint},
    linear::LinearExpression,
};
pub use oracle::{Coverage, Oracle, OracleError, Satisfiability};
pub use zone::{
    AtomicGuard, ResetSet,
    cpdbm::Cpdbm,
    pdbm::Pdbm,
};
