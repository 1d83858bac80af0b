//! Constraints over parameters and conjunctions thereof
//!
//! A [`ParameterConstraint`] is a single linear inequality over parameters,
//! normalised to the form `E ⋈ 0`. A [`ConstraintSet`] is an ordered
//! conjunction of such inequalities and describes a convex polyhedron in
//! parameter space. Constraint sets are the `C` of every `(C, D)` pair the
//! engine produces: each split of the parameter space refines them by one
//! constraint.

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, warn};
use parda_display_utils::join_iterator;

use crate::expressions::RelationType;
use crate::expressions::linear::LinearExpression;

/// A linear inequality over parameters, normalised to `E ⋈ 0`
///
/// Constructed from two expressions `left ⋈ right` by moving everything to
/// the left-hand side. Equality and ordering are on the normalised form, so
/// `p < 5` and `p - 5 < 0` are the same constraint.
///
/// # Example
///
/// ```
/// use parda_pdbm::{LinearExpression, Parameter, ParameterConstraint, Rational, RelationType};
///
/// let p = Parameter::fresh();
/// let a = ParameterConstraint::of(
///     LinearExpression::of_param(p),
///     LinearExpression::of_const(Rational::from_int(5)),
///     RelationType::Lt,
/// );
/// let b = ParameterConstraint::of(
///     LinearExpression::of_param(p).sub(&LinearExpression::of_const(Rational::from_int(5))),
///     LinearExpression::of_const(Rational::zero()),
///     RelationType::Lt,
/// );
/// assert_eq!(a, b);
/// assert_eq!(a.negate().relation(), RelationType::Ge);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterConstraint {
    expr: LinearExpression,
    relation: RelationType,
}

impl ParameterConstraint {
    /// Build the constraint `left ⋈ right`, normalised to `left - right ⋈ 0`
    pub fn of(
        left: LinearExpression,
        right: LinearExpression,
        relation: RelationType,
    ) -> Self {
        let constraint = ParameterConstraint {
            expr: left.sub(&right),
            relation,
        };
        if constraint.is_trivially_false() {
            warn!("constructed a trivially false constraint {constraint}");
        } else if constraint.is_trivially_true() {
            debug!("constructed a trivially true constraint {constraint}");
        }
        constraint
    }

    /// The logical negation: `¬(E ⋈ 0)` is `E ⋈' 0` with the negated relation
    pub fn negate(&self) -> ParameterConstraint {
        ParameterConstraint {
            expr: self.expr.clone(),
            relation: self.relation.negated(),
        }
    }

    /// The normalised left-hand expression `E`
    pub fn expr(&self) -> &LinearExpression {
        &self.expr
    }

    /// The relation `⋈`
    pub fn relation(&self) -> RelationType {
        self.relation
    }

    /// Check whether the constraint holds for every parameter valuation
    ///
    /// True when `E` is a constant `k` with `k ⋈ 0`, and also when the
    /// constant term of `E` is infinite: an infinite term dominates any
    /// finite parameter contribution, so the constraint is decided
    /// regardless of the coefficients.
    pub fn is_trivially_true(&self) -> bool {
        if !self.expr.constant().is_finite() {
            return self.relation.holds_against_zero(self.expr.constant());
        }
        self.expr.is_constant() && self.relation.holds_against_zero(self.expr.constant())
    }

    /// Check whether the constraint holds for no parameter valuation
    pub fn is_trivially_false(&self) -> bool {
        if !self.expr.constant().is_finite() {
            return !self.relation.holds_against_zero(self.expr.constant());
        }
        self.expr.is_constant() && !self.relation.holds_against_zero(self.expr.constant())
    }
}

impl fmt::Display for ParameterConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0", self.expr, self.relation)
    }
}

/// An ordered conjunction of [`ParameterConstraint`]s
///
/// The empty set is `⊤` (no restriction). There is no syntactic `⊥`:
/// unsatisfiable sets are discovered by the oracle, never by construction.
/// Conjoining drops trivially true constraints; everything else is kept
/// verbatim without syntactic subsumption.
///
/// # Example
///
/// ```
/// use parda_pdbm::{ConstraintSet, LinearExpression, Parameter, ParameterConstraint, Rational, RelationType};
///
/// let p = Parameter::fresh();
/// let c = ParameterConstraint::of(
///     LinearExpression::of_param(p),
///     LinearExpression::of_const(Rational::from_int(10)),
///     RelationType::Le,
/// );
///
/// let top = ConstraintSet::top();
/// assert!(top.is_top());
/// let refined = top.and_constraint(&c);
/// assert_eq!(refined.iter().count(), 1);
/// // conjoining the same constraint twice keeps the set canonical
/// assert_eq!(refined.and_constraint(&c), refined);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ConstraintSet {
    constraints: BTreeSet<ParameterConstraint>,
}

impl ConstraintSet {
    /// The unrestricted set `⊤`
    pub fn top() -> Self {
        ConstraintSet::default()
    }

    /// A set holding a single constraint
    pub fn of(constraint: ParameterConstraint) -> Self {
        ConstraintSet::top().and_constraint(&constraint)
    }

    /// A set from a collection of constraints
    pub fn from_constraints(
        constraints: impl IntoIterator<Item = ParameterConstraint>,
    ) -> Self {
        let mut set = ConstraintSet::top();
        for constraint in constraints {
            set = set.and_constraint(&constraint);
        }
        set
    }

    /// Conjoin a single constraint
    ///
    /// Trivially true constraints are dropped, keeping `⊤ ∧ κ = ⊤` exact
    /// for tautological `κ`.
    pub fn and_constraint(&self, constraint: &ParameterConstraint) -> ConstraintSet {
        if constraint.is_trivially_true() {
            return self.clone();
        }
        let mut constraints = self.constraints.clone();
        constraints.insert(constraint.clone());
        ConstraintSet { constraints }
    }

    /// Conjoin another constraint set
    pub fn and(&self, other: &ConstraintSet) -> ConstraintSet {
        let mut result = self.clone();
        for constraint in &other.constraints {
            result = result.and_constraint(constraint);
        }
        result
    }

    /// Check whether the set is `⊤` (contains no constraints)
    pub fn is_top(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterate over the constraints in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &ParameterConstraint> {
        self.constraints.iter()
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return write!(f, "TRUE");
        }
        write!(f, "({})", join_iterator(self.constraints.iter(), " /\\ "))
    }
}
