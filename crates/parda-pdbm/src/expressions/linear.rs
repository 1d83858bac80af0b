//! Affine expressions over parameters
//!
//! A [`LinearExpression`] is a form `c1*p1 + c2*p2 + ... + k` with exact
//! rational coefficients. These expressions are the bounds of a parametric
//! difference-bound matrix; their arithmetic (sum for path composition,
//! difference for bound comparison) drives the whole engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::trace;

use crate::expressions::rational::Rational;
use crate::expressions::{Parameter, ParameterValuation};

/// An affine expression `c1*p1 + ... + cn*pn + k` over parameters
///
/// Coefficients are always finite and nonzero; zero coefficients are
/// dropped at construction so equality and hashing are canonical. The
/// constant term may be `±∞` as a sentinel bound in an otherwise
/// coefficient-free expression.
///
/// # Example
///
/// ```
/// use parda_pdbm::{LinearExpression, Parameter, Rational};
///
/// let p = Parameter::fresh();
/// // 2*p + 1
/// let e = LinearExpression::of_param_coeff(p, Rational::from_int(2))
///     .add(&LinearExpression::of_const(Rational::one()));
/// // (2*p + 1) - 2*p = 1
/// let k = e.sub(&LinearExpression::of_param_coeff(p, Rational::from_int(2)));
/// assert!(k.is_constant());
/// assert_eq!(*k.constant(), Rational::one());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinearExpression {
    coefficients: BTreeMap<Parameter, Rational>,
    constant: Rational,
}

impl LinearExpression {
    /// Build an expression, dropping zero coefficients
    ///
    /// # Panics
    ///
    /// Panics when a coefficient is not finite. Infinities are only
    /// meaningful as sentinel constants, never as parameter weights.
    fn new(coefficients: BTreeMap<Parameter, Rational>, constant: Rational) -> Self {
        let coefficients: BTreeMap<Parameter, Rational> = coefficients
            .into_iter()
            .filter(|(parameter, coefficient)| {
                assert!(
                    coefficient.is_finite(),
                    "non-finite coefficient {coefficient} for {parameter}"
                );
                !coefficient.is_zero()
            })
            .collect();
        let expr = LinearExpression {
            coefficients,
            constant,
        };
        trace!("built linear expression {expr}");
        expr
    }

    /// The constant expression `k`
    pub fn of_const(constant: Rational) -> Self {
        LinearExpression::new(BTreeMap::new(), constant)
    }

    /// The expression `p` (coefficient 1, constant 0)
    pub fn of_param(parameter: Parameter) -> Self {
        Self::of_param_coeff(parameter, Rational::one())
    }

    /// The expression `coefficient * p` (constant 0)
    pub fn of_param_coeff(parameter: Parameter, coefficient: Rational) -> Self {
        LinearExpression::new(
            BTreeMap::from([(parameter, coefficient)]),
            Rational::zero(),
        )
    }

    /// An expression from coefficient terms and a constant
    pub fn of_terms(
        terms: impl IntoIterator<Item = (Parameter, Rational)>,
        constant: Rational,
    ) -> Self {
        LinearExpression::new(terms.into_iter().collect(), constant)
    }

    /// The sum of two expressions
    pub fn add(&self, other: &LinearExpression) -> LinearExpression {
        let mut coefficients = self.coefficients.clone();
        for (parameter, coefficient) in &other.coefficients {
            let entry = coefficients
                .entry(*parameter)
                .or_insert_with(Rational::zero);
            *entry = &*entry + coefficient;
        }
        LinearExpression::new(coefficients, &self.constant + &other.constant)
    }

    /// The difference of two expressions
    pub fn sub(&self, other: &LinearExpression) -> LinearExpression {
        self.add(&other.negate())
    }

    /// The expression multiplied by -1
    pub fn negate(&self) -> LinearExpression {
        let coefficients = self
            .coefficients
            .iter()
            .map(|(parameter, coefficient)| (*parameter, -coefficient))
            .collect();
        LinearExpression::new(coefficients, -&self.constant)
    }

    /// Evaluate the expression under a concrete parameter valuation
    ///
    /// # Example
    ///
    /// ```
    /// use parda_pdbm::{LinearExpression, Parameter, ParameterValuation, Rational};
    ///
    /// let p = Parameter::fresh();
    /// let e = LinearExpression::of_param_coeff(p, Rational::from_int(2))
    ///     .add(&LinearExpression::of_const(Rational::from_int(3)));
    /// let v = ParameterValuation::of([(p, Rational::from_ratio(1, 2))]);
    /// assert_eq!(e.evaluate(&v), Rational::from_int(4));
    /// ```
    pub fn evaluate(&self, valuation: &ParameterValuation) -> Rational {
        let mut result = self.constant.clone();
        for (parameter, coefficient) in &self.coefficients {
            result = &result + &(coefficient * &valuation.value_of(parameter));
        }
        result
    }

    /// Check whether the expression has no parameter terms
    pub fn is_constant(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// The constant term
    pub fn constant(&self) -> &Rational {
        &self.constant
    }

    /// The nonzero coefficient terms in parameter order
    pub fn coefficients(&self) -> impl Iterator<Item = (&Parameter, &Rational)> {
        self.coefficients.iter()
    }

    /// The coefficient of `parameter`, 0 when absent
    pub fn coefficient_of(&self, parameter: &Parameter) -> Rational {
        self.coefficients
            .get(parameter)
            .cloned()
            .unwrap_or_else(Rational::zero)
    }
}

impl std::ops::Add<&LinearExpression> for &LinearExpression {
    type Output = LinearExpression;
    fn add(self, rhs: &LinearExpression) -> LinearExpression {
        LinearExpression::add(self, rhs)
    }
}

impl std::ops::Sub<&LinearExpression> for &LinearExpression {
    type Output = LinearExpression;
    fn sub(self, rhs: &LinearExpression) -> LinearExpression {
        LinearExpression::sub(self, rhs)
    }
}

impl std::ops::Neg for &LinearExpression {
    type Output = LinearExpression;
    fn neg(self) -> LinearExpression {
        self.negate()
    }
}

impl PartialOrd for LinearExpression {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LinearExpression {
    /// Total order used for canonical hashing of constraint sets: constant
    /// term first, then coefficients parameter by parameter over the union
    /// of both key sets, absent coefficients counting as 0
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let cmp = self.constant.cmp(&other.constant);
        if cmp != std::cmp::Ordering::Equal {
            return cmp;
        }

        let parameters: BTreeSet<&Parameter> = self
            .coefficients
            .keys()
            .chain(other.coefficients.keys())
            .collect();
        for parameter in parameters {
            let cmp = self
                .coefficient_of(parameter)
                .cmp(&other.coefficient_of(parameter));
            if cmp != std::cmp::Ordering::Equal {
                return cmp;
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coefficients.is_empty() {
            return write!(f, "{}", self.constant);
        }

        for (i, (parameter, coefficient)) in self.coefficients.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{coefficient}*{parameter}")?;
        }
        if !self.constant.is_zero() {
            write!(f, " + {}", self.constant)?;
        }
        Ok(())
    }
}
