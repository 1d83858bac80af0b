//! The SMT-backed implementation of the engine's oracle interface
//!
//! One [`SmtOracle`] owns one solver subprocess and the variable map for a
//! fixed set of clocks and parameters; the theory axioms are asserted once
//! at construction. Every query is bracketed by `push`/`pop`, so the
//! solver's assertion stack always returns to the axioms and queries stay
//! referentially transparent.
//!
//! Oracles are not shared: a concurrent analysis creates one oracle per
//! thread from a common [`SolverBuilder`]. Dropping the oracle ends the
//! solver subprocess.

use std::collections::BTreeSet;

use easy_smt::Response;
use log::trace;

use parda_pdbm::{
    AtomicGuard, Clock, ConstraintSet, Coverage, Oracle, OracleError, Parameter,
    ParameterConstraint, Satisfiability,
};

use crate::encoding::{EncodeToSmt, VariableMap};
use crate::{SmtExpr, SmtSolver, SolverBuilder};

/// A decision procedure for linear real arithmetic over a fixed set of
/// clocks and parameters
///
/// # Example
///
/// ```no_run
/// use parda_pdbm::{Clock, ConstraintSet, Oracle, Parameter};
/// use parda_smt_oracle::{SmtOracle, SolverBuilder};
///
/// let builder = SolverBuilder::automatic().unwrap();
/// let p = Parameter::fresh();
/// let c = Clock::fresh();
/// let mut oracle = SmtOracle::new(&builder, [p], [c]).unwrap();
/// let sat = oracle.is_sat(&ConstraintSet::top()).unwrap();
/// ```
pub struct SmtOracle {
    solver: SmtSolver,
    vars: VariableMap,
}

impl SmtOracle {
    /// Start a solver and declare all clocks and parameters of the
    /// analysis
    ///
    /// The zero clock is always declared, whether listed or not, and the
    /// theory axioms (`x0 = 0`, clocks and parameters non-negative) are
    /// asserted permanently.
    pub fn new(
        builder: &SolverBuilder,
        parameters: impl IntoIterator<Item = Parameter>,
        clocks: impl IntoIterator<Item = Clock>,
    ) -> Result<Self, OracleError> {
        let mut solver = builder.new_solver();

        let mut clocks: BTreeSet<Clock> = clocks.into_iter().collect();
        clocks.insert(Clock::ZERO);
        let parameters: BTreeSet<Parameter> = parameters.into_iter().collect();

        let vars = VariableMap::declare(&mut solver, parameters, clocks)?;
        vars.assert_axioms(&mut solver)?;

        Ok(SmtOracle { solver, vars })
    }

    /// Check satisfiability of one term on top of the axioms
    fn check_assuming(&mut self, expr: SmtExpr) -> Result<Satisfiability, OracleError> {
        self.solver.push()?;
        self.solver.assert(expr)?;
        let response = self.solver.check();
        let popped = self.solver.pop();
        let response = response?;
        popped?;

        trace!("solver answered {response:?}");
        Ok(match response {
            Response::Sat => Satisfiability::Sat,
            Response::Unsat => Satisfiability::Unsat,
            Response::Unknown => Satisfiability::Unknown,
        })
    }
}

impl Oracle for SmtOracle {
    fn is_sat(&mut self, constraints: &ConstraintSet) -> Result<Satisfiability, OracleError> {
        let expr = constraints.encode_to_smt(&self.solver, &self.vars)?;
        self.check_assuming(expr)
    }

    fn check_coverage(
        &mut self,
        candidate: &ParameterConstraint,
        context: &ConstraintSet,
    ) -> Result<Coverage, OracleError> {
        let context_expr = context.encode_to_smt(&self.solver, &self.vars)?;
        let candidate_expr = candidate.encode_to_smt(&self.solver, &self.vars)?;

        let with_candidate =
            self.check_assuming(self.solver.and(context_expr, candidate_expr))?;
        let with_negation = self.check_assuming(
            self.solver
                .and(context_expr, self.solver.not(candidate_expr)),
        )?;

        Ok(match (with_candidate, with_negation) {
            (Satisfiability::Unsat, _) => Coverage::No,
            (_, Satisfiability::Unsat) => Coverage::Yes,
            (Satisfiability::Sat, Satisfiability::Sat) => Coverage::Split,
            _ => Coverage::Unknown,
        })
    }

    fn is_zone_sat(
        &mut self,
        constraints: &ConstraintSet,
        bounds: &[AtomicGuard],
    ) -> Result<Satisfiability, OracleError> {
        let mut expr = constraints.encode_to_smt(&self.solver, &self.vars)?;
        for guard in bounds {
            expr = self
                .solver
                .and(expr, guard.encode_to_smt(&self.solver, &self.vars)?);
        }
        self.check_assuming(expr)
    }
}
