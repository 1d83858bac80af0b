//! Atomic clock constraints and the symbolic zone types built from them
//!
//! The building block of a zone is the [`AtomicGuard`], a single difference
//! constraint `c1 - c2 ⋈ E` whose bound `E` is a linear expression over
//! parameters. Guards are canonicalised at construction so that structurally
//! equal constraints compare equal regardless of how they were written down.
//!
//! [`ResetSet`] describes the clock resets of a transition. The matrix
//! types live in the [`pdbm`] and [`cpdbm`] submodules.

use std::collections::BTreeMap;
use std::fmt;

use log::{trace, warn};
use parda_display_utils::join_iterator;

use crate::expressions::linear::LinearExpression;
use crate::expressions::rational::Rational;
use crate::expressions::{Clock, RelationType};

pub mod cpdbm;
pub mod pdbm;

/// An atomic clock difference constraint `c1 - c2 ⋈ E`
///
/// Guards are canonicalised on construction: when `id(c1) > id(c2)` the
/// operands are swapped, the bound negated and the relation flipped, so
/// `x2 - x1 < 5` and `x1 - x2 > -5` are the same guard. The logical meaning
/// is unchanged by the swap.
///
/// A guard against a single clock is expressed with the zero clock as the
/// second operand: `x1 < 5` is `x1 - x0 < 5`.
///
/// # Example
///
/// ```
/// use parda_pdbm::{AtomicGuard, Clock, LinearExpression, Rational, RelationType};
///
/// let c1 = Clock::fresh();
/// let c2 = Clock::fresh();
/// let bound = LinearExpression::of_const(Rational::from_int(5));
///
/// let a = AtomicGuard::of(c1, c2, bound.clone(), RelationType::Lt);
/// let b = AtomicGuard::of(c2, c1, bound.negate(), RelationType::Gt);
/// assert_eq!(a, b);
/// assert!(a.clock1().id() <= a.clock2().id());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomicGuard {
    clock1: Clock,
    clock2: Clock,
    bound: LinearExpression,
    relation: RelationType,
}

impl AtomicGuard {
    /// Build the guard `c1 - c2 ⋈ bound`, canonicalising the operand order
    ///
    /// # Panics
    ///
    /// Panics when the guard is a self-difference `x - x ⋈ k` with a
    /// constant `k` refuting `0 ⋈ k` (for example `x - x < 0`), or when
    /// the bound's constant term is NaN. Tautological self-guards such as
    /// `x - x <= 0` are permitted; they are the diagonal entries of a
    /// matrix. Parametric self-guards cannot be checked at construction
    /// and are admitted with a warning.
    pub fn of(c1: Clock, c2: Clock, bound: LinearExpression, relation: RelationType) -> Self {
        assert!(
            !bound.constant().is_nan(),
            "NaN bound in guard {c1} - {c2} {relation} {bound}"
        );

        let guard = if c1.id() > c2.id() {
            AtomicGuard {
                clock1: c2,
                clock2: c1,
                bound: bound.negate(),
                relation: relation.flipped(),
            }
        } else {
            AtomicGuard {
                clock1: c1,
                clock2: c2,
                bound,
                relation,
            }
        };

        if guard.clock1 == guard.clock2 {
            if !guard.bound.is_constant() {
                warn!(
                    "self-guard {guard} has a parametric bound, \
                     contradiction can only be detected by the oracle"
                );
            } else {
                // `x - x ⋈ k` holds iff `0 ⋈ k`, i.e. `k ⋈-flipped 0`
                assert!(
                    guard
                        .relation
                        .flipped()
                        .holds_against_zero(guard.bound.constant()),
                    "self-contradictory guard {guard}"
                );
            }
        }
        trace!("built guard {guard}");
        guard
    }

    /// The guard `c < value`
    pub fn less_than(c: Clock, value: Rational) -> Self {
        Self::of(
            c,
            Clock::ZERO,
            LinearExpression::of_const(value),
            RelationType::Lt,
        )
    }

    /// The guard `c <= value`
    pub fn less_equal(c: Clock, value: Rational) -> Self {
        Self::of(
            c,
            Clock::ZERO,
            LinearExpression::of_const(value),
            RelationType::Le,
        )
    }

    /// The guard `c > value`
    pub fn greater_than(c: Clock, value: Rational) -> Self {
        Self::of(
            c,
            Clock::ZERO,
            LinearExpression::of_const(value),
            RelationType::Gt,
        )
    }

    /// The guard `c >= value`
    pub fn greater_equal(c: Clock, value: Rational) -> Self {
        Self::of(
            c,
            Clock::ZERO,
            LinearExpression::of_const(value),
            RelationType::Ge,
        )
    }

    /// The logical negation of the guard
    ///
    /// # Panics
    ///
    /// Panics when negating a tautological constant self-guard, because
    /// the negation is self-contradictory.
    pub fn negate(&self) -> AtomicGuard {
        AtomicGuard::of(
            self.clock1,
            self.clock2,
            self.bound.clone(),
            self.relation.negated(),
        )
    }

    /// First clock of the canonical form
    pub fn clock1(&self) -> Clock {
        self.clock1
    }

    /// Second clock of the canonical form
    pub fn clock2(&self) -> Clock {
        self.clock2
    }

    /// Bound of the canonical form
    pub fn bound(&self) -> &LinearExpression {
        &self.bound
    }

    /// Relation of the canonical form
    pub fn relation(&self) -> RelationType {
        self.relation
    }

    /// Clocks of the upper-bound view, as `(lhs, rhs)` of `lhs - rhs ≺ E`
    ///
    /// A guard whose canonical relation points in the greater direction is
    /// read backwards: `c1 - c2 >= E` is the upper bound `c2 - c1 <= -E`.
    pub fn upper_clocks(&self) -> (Clock, Clock) {
        if self.relation.is_greater() {
            (self.clock2, self.clock1)
        } else {
            (self.clock1, self.clock2)
        }
    }

    /// Bound of the upper-bound view
    pub fn upper_bound(&self) -> LinearExpression {
        if self.relation.is_greater() {
            self.bound.negate()
        } else {
            self.bound.clone()
        }
    }

    /// Relation of the upper-bound view, always `<` or `<=`
    pub fn upper_bound_relation(&self) -> RelationType {
        if self.relation.is_greater() {
            self.relation.flipped()
        } else {
            self.relation
        }
    }
}

impl fmt::Display for AtomicGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clock2.is_zero_clock() && self.clock1 != self.clock2 {
            write!(f, "{} {} {}", self.clock1, self.relation, self.bound)
        } else {
            write!(
                f,
                "{} - {} {} {}",
                self.clock1, self.clock2, self.relation, self.bound
            )
        }
    }
}

/// An immutable set of clock resets `c := v`
///
/// # Panics
///
/// Construction panics on structural misuse: resetting the zero clock, or
/// resetting to a negative or non-finite value.
///
/// # Example
///
/// ```
/// use parda_pdbm::{Clock, Rational, ResetSet};
///
/// let c = Clock::fresh();
/// let resets = ResetSet::new([(c, Rational::from_int(5))]);
/// assert_eq!(resets.iter().count(), 1);
///
/// let zeroed = ResetSet::to_zero([c]);
/// assert_eq!(zeroed.iter().next(), Some((&c, &Rational::zero())));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ResetSet {
    resets: BTreeMap<Clock, Rational>,
}

impl ResetSet {
    /// Build a reset set from clock/value pairs
    pub fn new(resets: impl IntoIterator<Item = (Clock, Rational)>) -> Self {
        let resets: BTreeMap<Clock, Rational> = resets
            .into_iter()
            .inspect(|(clock, value)| {
                assert!(!clock.is_zero_clock(), "cannot reset the zero clock");
                assert!(
                    value.is_finite() && value.signum() >= 0,
                    "reset value {value} for {clock} must be finite and non-negative"
                );
            })
            .collect();
        ResetSet { resets }
    }

    /// Reset all given clocks to 0
    pub fn to_zero(clocks: impl IntoIterator<Item = Clock>) -> Self {
        Self::new(clocks.into_iter().map(|c| (c, Rational::zero())))
    }

    /// Iterate over the resets in clock order
    pub fn iter(&self) -> impl Iterator<Item = (&Clock, &Rational)> {
        self.resets.iter()
    }

    /// Check whether the set resets nothing
    pub fn is_empty(&self) -> bool {
        self.resets.is_empty()
    }
}

impl fmt::Display for ResetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .resets
            .iter()
            .map(|(c, v)| format!("{c}:={v}"))
            .collect::<Vec<_>>();
        write!(f, "{{{}}}", join_iterator(entries, ", "))
    }
}
