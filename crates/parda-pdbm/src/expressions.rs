//! Identities and comparison relations appearing in zone constraints
//!
//! This module contains the atomic building blocks of the engine:
//! - [`Clock`]s: real-valued variables growing uniformly with time,
//! - [`Parameter`]s: symbolic non-negative reals fixed per analysis,
//! - [`RelationType`]: the four comparison relations of difference bounds,
//! - [`ParameterValuation`]: concrete assignments used to evaluate
//!   parametric expressions.
//!
//! Clocks and parameters are opaque identities with a total order, handed
//! out by process-wide monotonic allocators. The distinguished *zero clock*
//! [`Clock::ZERO`] is fixed at value 0 and always occupies index 0 of a
//! matrix.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use log::trace;

use crate::expressions::rational::Rational;

pub mod constraint;
pub mod linear;
pub mod rational;

static NEXT_CLOCK_ID: AtomicU32 = AtomicU32::new(1);
static NEXT_PARAMETER_ID: AtomicU32 = AtomicU32::new(0);

/// A clock of a parametric timed automaton
///
/// Clocks are compared, hashed and ordered by their numeric identity. New
/// clocks are drawn from a process-wide counter, so two calls to
/// [`Clock::fresh`] never return the same clock. Id 0 is reserved for the
/// zero clock.
///
/// # Example
///
/// ```
/// use parda_pdbm::Clock;
///
/// let c1 = Clock::fresh();
/// let c2 = Clock::fresh();
/// assert!(c1 < c2);
/// assert!(Clock::ZERO < c1);
/// assert!(Clock::ZERO.is_zero_clock());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Clock(u32);

impl Clock {
    /// The zero clock `x0`, fixed at value 0
    pub const ZERO: Clock = Clock(0);

    /// Allocate a fresh clock with a process-wide unique identity
    pub fn fresh() -> Self {
        let id = NEXT_CLOCK_ID.fetch_add(1, Ordering::Relaxed);
        trace!("allocated clock x{id}");
        Clock(id)
    }

    /// Numeric identity of the clock
    pub fn id(&self) -> u32 {
        self.0
    }

    /// Check whether this is the zero clock
    pub fn is_zero_clock(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A parameter of a parametric timed automaton
///
/// Parameters are symbolic non-negative reals whose values are unknown at
/// analysis time. Like clocks they are identities drawn from a process-wide
/// counter.
///
/// # Example
///
/// ```
/// use parda_pdbm::Parameter;
///
/// let p = Parameter::fresh();
/// let q = Parameter::fresh();
/// assert!(p < q);
/// assert_ne!(p, q);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter(u32);

impl Parameter {
    /// Allocate a fresh parameter with a process-wide unique identity
    pub fn fresh() -> Self {
        let id = NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed);
        trace!("allocated parameter p{id}");
        Parameter(id)
    }

    /// Numeric identity of the parameter
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// The four comparison relations of difference bounds
///
/// Equality does not appear: a difference-bound matrix expresses `a = b` as
/// the conjunction of `a <= b` and `b <= a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationType {
    /// Strictly less than
    Lt,
    /// Less than or equal
    Le,
    /// Strictly greater than
    Gt,
    /// Greater than or equal
    Ge,
}

impl RelationType {
    /// The logical negation of the relation, e.g. `¬(a < b)` is `a >= b`
    ///
    /// # Example
    ///
    /// ```
    /// use parda_pdbm::RelationType;
    ///
    /// assert_eq!(RelationType::Lt.negated(), RelationType::Ge);
    /// assert_eq!(RelationType::Le.negated(), RelationType::Gt);
    /// assert_eq!(RelationType::Gt.negated(), RelationType::Le);
    /// assert_eq!(RelationType::Ge.negated(), RelationType::Lt);
    /// ```
    pub fn negated(&self) -> RelationType {
        match self {
            RelationType::Lt => RelationType::Ge,
            RelationType::Le => RelationType::Gt,
            RelationType::Gt => RelationType::Le,
            RelationType::Ge => RelationType::Lt,
        }
    }

    /// The equivalent relation after swapping operands and negating the
    /// bound, e.g. `a - b < e` becomes `b - a > -e`
    pub fn flipped(&self) -> RelationType {
        match self {
            RelationType::Lt => RelationType::Gt,
            RelationType::Le => RelationType::Ge,
            RelationType::Gt => RelationType::Lt,
            RelationType::Ge => RelationType::Le,
        }
    }

    /// Conjunction of two relations pointing in the same direction: the
    /// strict one wins
    ///
    /// # Panics
    ///
    /// Panics when the relations point in opposite directions. A matrix
    /// storing only upper bounds never produces such a pair; reaching this
    /// case means matrix construction is broken.
    pub fn and(&self, other: RelationType) -> RelationType {
        match (self.is_greater(), other.is_greater()) {
            (false, false) => {
                if self.is_strict() || other.is_strict() {
                    RelationType::Lt
                } else {
                    RelationType::Le
                }
            }
            (true, true) => {
                if self.is_strict() || other.is_strict() {
                    RelationType::Gt
                } else {
                    RelationType::Ge
                }
            }
            _ => panic!("conjunction of opposing relations {self} and {other}"),
        }
    }

    /// Check whether the relation is strict (`<` or `>`)
    pub fn is_strict(&self) -> bool {
        matches!(self, RelationType::Lt | RelationType::Gt)
    }

    /// Check whether the relation points in the greater direction (`>` or `>=`)
    pub fn is_greater(&self) -> bool {
        matches!(self, RelationType::Gt | RelationType::Ge)
    }

    /// The relation as its usual mathematical symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            RelationType::Lt => "<",
            RelationType::Le => "<=",
            RelationType::Gt => ">",
            RelationType::Ge => ">=",
        }
    }

    /// Check whether `value ⋈ 0` holds for a constant `value`
    ///
    /// Infinite constants are compared through the total order on
    /// [`Rational`], so `∞ < 0` is false and `-∞ <= 0` is true.
    pub(crate) fn holds_against_zero(&self, value: &Rational) -> bool {
        let zero = Rational::zero();
        match self {
            RelationType::Lt => *value < zero,
            RelationType::Le => *value <= zero,
            RelationType::Gt => *value > zero,
            RelationType::Ge => *value >= zero,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A concrete assignment of rational values to parameters
///
/// Used to evaluate a [`linear::LinearExpression`] to a number. Parameters
/// absent from the valuation evaluate to 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterValuation {
    values: BTreeMap<Parameter, Rational>,
}

impl ParameterValuation {
    /// Create a valuation from parameter/value pairs
    pub fn of(values: impl IntoIterator<Item = (Parameter, Rational)>) -> Self {
        ParameterValuation {
            values: values.into_iter().collect(),
        }
    }

    /// The value assigned to `parameter`, or 0 if unassigned
    pub fn value_of(&self, parameter: &Parameter) -> Rational {
        self.values
            .get(parameter)
            .cloned()
            .unwrap_or_else(Rational::zero)
    }
}

impl fmt::Display for ParameterValuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .values
            .iter()
            .map(|(p, v)| format!("{p}={v}"))
            .collect::<Vec<_>>();
        write!(f, "{{{}}}", parda_display_utils::join_iterator(entries, ", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_clocks_are_distinct_and_ordered() {
        let a = Clock::fresh();
        let b = Clock::fresh();
        assert!(a < b);
        assert!(a.id() < b.id());
        assert!(!a.is_zero_clock());
    }

    #[test]
    fn test_zero_clock() {
        assert_eq!(Clock::ZERO.id(), 0);
        assert!(Clock::ZERO.is_zero_clock());
        assert_eq!(Clock::ZERO.to_string(), "x0");
    }

    #[test]
    fn test_fresh_parameters_are_distinct() {
        let p = Parameter::fresh();
        let q = Parameter::fresh();
        assert_ne!(p, q);
        assert!(p < q);
        assert_eq!(p.to_string(), format!("p{}", p.id()));
    }

    #[test]
    fn test_relation_negated_is_involution() {
        for rel in [
            RelationType::Lt,
            RelationType::Le,
            RelationType::Gt,
            RelationType::Ge,
        ] {
            assert_eq!(rel.negated().negated(), rel);
            assert_eq!(rel.flipped().flipped(), rel);
        }
    }

    #[test]
    fn test_relation_and_same_direction() {
        assert_eq!(RelationType::Lt.and(RelationType::Le), RelationType::Lt);
        assert_eq!(RelationType::Le.and(RelationType::Le), RelationType::Le);
        assert_eq!(RelationType::Le.and(RelationType::Lt), RelationType::Lt);
        assert_eq!(RelationType::Ge.and(RelationType::Gt), RelationType::Gt);
        assert_eq!(RelationType::Ge.and(RelationType::Ge), RelationType::Ge);
    }

    #[test]
    #[should_panic(expected = "opposing relations")]
    fn test_relation_and_opposing_directions_panics() {
        let _ = RelationType::Lt.and(RelationType::Ge);
    }

    #[test]
    fn test_relation_display() {
        assert_eq!(RelationType::Lt.to_string(), "<");
        assert_eq!(RelationType::Le.to_string(), "<=");
        assert_eq!(RelationType::Gt.to_string(), ">");
        assert_eq!(RelationType::Ge.to_string(), ">=");
    }

    #[test]
    fn test_holds_against_zero_with_infinities() {
        assert!(!RelationType::Lt.holds_against_zero(&Rational::infinity()));
        assert!(RelationType::Gt.holds_against_zero(&Rational::infinity()));
        assert!(RelationType::Le.holds_against_zero(&Rational::neg_infinity()));
        assert!(RelationType::Ge.holds_against_zero(&Rational::zero()));
        assert!(!RelationType::Gt.holds_against_zero(&Rational::zero()));
    }

    #[test]
    fn test_parameter_valuation_defaults_to_zero() {
        let p = Parameter::fresh();
        let q = Parameter::fresh();
        let valuation = ParameterValuation::of([(p, Rational::from_int(3))]);
        assert_eq!(valuation.value_of(&p), Rational::from_int(3));
        assert_eq!(valuation.value_of(&q), Rational::zero());
    }
}
