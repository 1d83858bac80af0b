//! Encoding of engine expressions into SMT-LIB2 terms
//!
//! Clocks and parameters become `Real` constants declared up front in a
//! [`VariableMap`]; rationals become exact `(/ p q)` terms, never decimal
//! approximations. The engine resolves every comparison involving `±∞` or
//! `NaN` before consulting the oracle, so non-finite values reaching the
//! encoder are rejected as [`OracleError::UnsupportedQuery`].

use std::collections::{BTreeSet, HashMap};

use num::BigInt;
use num::bigint::Sign;

use parda_pdbm::{
    AtomicGuard, Clock, ConstraintSet, LinearExpression, OracleError, Parameter,
    ParameterConstraint, Rational, RelationType,
};

use crate::{SmtExpr, SmtSolver};

/// Mapping from engine identities to their declared SMT constants
///
/// All clocks and parameters an oracle will ever be asked about must be
/// declared when the solver starts; queries about undeclared identities
/// are [`OracleError::UnsupportedQuery`] errors.
#[derive(Debug)]
pub struct VariableMap {
    parameters: HashMap<Parameter, SmtExpr>,
    clocks: HashMap<Clock, SmtExpr>,
}

impl VariableMap {
    /// Declare one `Real` constant per parameter and clock
    pub fn declare(
        solver: &mut SmtSolver,
        parameters: impl IntoIterator<Item = Parameter>,
        clocks: impl IntoIterator<Item = Clock>,
    ) -> Result<Self, OracleError> {
        let real = solver.atom("Real");

        let mut parameter_map = HashMap::new();
        for parameter in parameters.into_iter().collect::<BTreeSet<_>>() {
            let expr = solver.declare_const(parameter.to_string(), real)?;
            parameter_map.insert(parameter, expr);
        }

        let mut clock_map = HashMap::new();
        for clock in clocks.into_iter().collect::<BTreeSet<_>>() {
            let expr = solver.declare_const(clock.to_string(), real)?;
            clock_map.insert(clock, expr);
        }

        Ok(VariableMap {
            parameters: parameter_map,
            clocks: clock_map,
        })
    }

    /// The SMT constant of a parameter
    pub fn parameter_expr(&self, parameter: &Parameter) -> Result<SmtExpr, OracleError> {
        self.parameters.get(parameter).copied().ok_or_else(|| {
            OracleError::UnsupportedQuery(format!("undeclared parameter {parameter}"))
        })
    }

    /// The SMT constant of a clock
    pub fn clock_expr(&self, clock: &Clock) -> Result<SmtExpr, OracleError> {
        self.clocks
            .get(clock)
            .copied()
            .ok_or_else(|| OracleError::UnsupportedQuery(format!("undeclared clock {clock}")))
    }

    /// Assert the theory axioms: `x0 = 0`, other clocks and all parameters
    /// non-negative
    pub fn assert_axioms(&self, solver: &mut SmtSolver) -> Result<(), OracleError> {
        let zero = solver.numeral(0);
        for (clock, expr) in &self.clocks {
            if clock.is_zero_clock() {
                solver.assert(solver.eq(*expr, zero))?;
            } else {
                solver.assert(solver.gte(*expr, zero))?;
            }
        }
        for expr in self.parameters.values() {
            solver.assert(solver.gte(*expr, zero))?;
        }
        Ok(())
    }

    /// The declared clocks
    pub fn clocks(&self) -> impl Iterator<Item = &Clock> {
        self.clocks.keys()
    }

    /// The declared parameters
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.keys()
    }
}

/// Types that can be rendered as an SMT-LIB2 term
pub trait EncodeToSmt {
    /// Encode `self` using the solver's term arena and the declared
    /// variables
    fn encode_to_smt(
        &self,
        solver: &SmtSolver,
        vars: &VariableMap,
    ) -> Result<SmtExpr, OracleError>;
}

/// A (possibly negative) big integer as an SMT term
fn encode_bigint(solver: &SmtSolver, value: &BigInt) -> SmtExpr {
    if value.sign() == Sign::Minus {
        let magnitude = solver.atom((-value).to_string());
        solver.negate(magnitude)
    } else {
        solver.atom(value.to_string())
    }
}

impl EncodeToSmt for Rational {
    fn encode_to_smt(
        &self,
        solver: &SmtSolver,
        _vars: &VariableMap,
    ) -> Result<SmtExpr, OracleError> {
        match self {
            Rational::Finite(value) => {
                let numerator = encode_bigint(solver, value.numer());
                if value.is_integer() {
                    Ok(numerator)
                } else {
                    let denominator = solver.atom(value.denom().to_string());
                    Ok(solver.list(vec![solver.atom("/"), numerator, denominator]))
                }
            }
            other => Err(OracleError::UnsupportedQuery(format!(
                "non-finite value {other} in an arithmetic term"
            ))),
        }
    }
}

impl EncodeToSmt for LinearExpression {
    fn encode_to_smt(
        &self,
        solver: &SmtSolver,
        vars: &VariableMap,
    ) -> Result<SmtExpr, OracleError> {
        let mut expr = self.constant().encode_to_smt(solver, vars)?;
        for (parameter, coefficient) in self.coefficients() {
            let term = solver.times(
                coefficient.encode_to_smt(solver, vars)?,
                vars.parameter_expr(parameter)?,
            );
            expr = solver.plus(expr, term);
        }
        Ok(expr)
    }
}

impl EncodeToSmt for ParameterConstraint {
    fn encode_to_smt(
        &self,
        solver: &SmtSolver,
        vars: &VariableMap,
    ) -> Result<SmtExpr, OracleError> {
        let lhs = self.expr().encode_to_smt(solver, vars)?;
        let zero = solver.numeral(0);
        Ok(match self.relation() {
            RelationType::Lt => solver.lt(lhs, zero),
            RelationType::Le => solver.lte(lhs, zero),
            RelationType::Gt => solver.gt(lhs, zero),
            RelationType::Ge => solver.gte(lhs, zero),
        })
    }
}

impl EncodeToSmt for ConstraintSet {
    fn encode_to_smt(
        &self,
        solver: &SmtSolver,
        vars: &VariableMap,
    ) -> Result<SmtExpr, OracleError> {
        let mut expr = solver.true_();
        for constraint in self.iter() {
            expr = solver.and(expr, constraint.encode_to_smt(solver, vars)?);
        }
        Ok(expr)
    }
}

impl EncodeToSmt for AtomicGuard {
    fn encode_to_smt(
        &self,
        solver: &SmtSolver,
        vars: &VariableMap,
    ) -> Result<SmtExpr, OracleError> {
        let lhs = vars.clock_expr(&self.clock1())?;
        let rhs = vars.clock_expr(&self.clock2())?;
        let difference = solver.sub(lhs, rhs);
        let bound = self.bound().encode_to_smt(solver, vars)?;
        Ok(match self.relation() {
            RelationType::Lt => solver.lt(difference, bound),
            RelationType::Le => solver.lte(difference, bound),
            RelationType::Gt => solver.gt(difference, bound),
            RelationType::Ge => solver.gte(difference, bound),
        })
    }
}
