//! A deterministic test oracle for the single-parameter fragment
//!
//! The engine treats the oracle as a pluggable decision procedure, so the
//! behavioural tests do not need a real SMT solver: this oracle decides
//! the fragment where every parameter constraint mentions at most one
//! parameter (`a*p + k ⋈ 0`) exactly, by interval arithmetic over the
//! parameters and negative-cycle detection over evaluated clock bounds.
//!
//! Queries outside the fragment panic, which is what a test wants.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parda_pdbm::{
    AtomicGuard, Clock, ConstraintSet, Coverage, LinearExpression, Oracle, OracleError,
    Parameter, ParameterConstraint, ParameterValuation, Rational, RelationType, Satisfiability,
};

/// A bound endpoint: value plus strictness
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    value: Rational,
    strict: bool,
}

/// Interval of admissible values for one parameter
#[derive(Debug, Clone)]
struct Interval {
    lower: Endpoint,
    upper: Endpoint,
}

impl Interval {
    /// Parameters are non-negative reals: `[0, ∞)`
    fn unconstrained() -> Self {
        Interval {
            lower: Endpoint {
                value: Rational::zero(),
                strict: false,
            },
            upper: Endpoint {
                value: Rational::infinity(),
                strict: true,
            },
        }
    }

    fn tighten_lower(&mut self, value: Rational, strict: bool) {
        if value > self.lower.value || (value == self.lower.value && strict) {
            self.lower = Endpoint { value, strict };
        }
    }

    fn tighten_upper(&mut self, value: Rational, strict: bool) {
        if value < self.upper.value || (value == self.upper.value && strict) {
            self.upper = Endpoint { value, strict };
        }
    }

    fn is_empty(&self) -> bool {
        self.lower.value > self.upper.value
            || (self.lower.value == self.upper.value && (self.lower.strict || self.upper.strict))
    }

    /// Representative values covering the endpoints and the inside
    fn witnesses(&self) -> Vec<Rational> {
        let mut values = Vec::new();
        if !self.lower.strict {
            values.push(self.lower.value.clone());
        }
        if self.upper.value.is_finite() {
            if !self.upper.strict {
                values.push(self.upper.value.clone());
            }
            if self.lower.value < self.upper.value {
                let two = Rational::from_int(2);
                values.push(&(&self.lower.value + &self.upper.value) / &two);
            }
        } else {
            values.push(&self.lower.value + &Rational::one());
        }
        values.dedup();
        values
    }
}

/// Per-parameter intervals denoting a conjunction of constraints, or
/// `None` when a constant constraint already refuted the set
fn intervals_of(constraints: &ConstraintSet) -> Option<BTreeMap<Parameter, Interval>> {
    let mut intervals: BTreeMap<Parameter, Interval> = BTreeMap::new();
    for constraint in constraints.iter() {
        if !apply(constraint, &mut intervals) {
            return None;
        }
    }
    if intervals.values().any(Interval::is_empty) {
        return None;
    }
    Some(intervals)
}

/// Fold one constraint `a*p + k ⋈ 0` into the interval map; false means
/// the constraint is constant and refuted
fn apply(constraint: &ParameterConstraint, intervals: &mut BTreeMap<Parameter, Interval>) -> bool {
    let expr = constraint.expr();
    let relation = constraint.relation();
    let terms: Vec<(&Parameter, &Rational)> = expr.coefficients().collect();
    match terms.len() {
        0 => {
            // constant constraint k ⋈ 0
            let holds = match relation {
                RelationType::Lt => *expr.constant() < Rational::zero(),
                RelationType::Le => *expr.constant() <= Rational::zero(),
                RelationType::Gt => *expr.constant() > Rational::zero(),
                RelationType::Ge => *expr.constant() >= Rational::zero(),
            };
            holds
        }
        1 => {
            let (parameter, coefficient) = terms[0];
            // a*p + k ⋈ 0  <=>  p ⋈' -k/a, direction flipped for a < 0
            let threshold = &(-expr.constant()) / coefficient;
            let relation = if coefficient.signum() > 0 {
                relation
            } else {
                relation.flipped()
            };
            let interval = intervals
                .entry(*parameter)
                .or_insert_with(Interval::unconstrained);
            match relation {
                RelationType::Lt => interval.tighten_upper(threshold, true),
                RelationType::Le => interval.tighten_upper(threshold, false),
                RelationType::Gt => interval.tighten_lower(threshold, true),
                RelationType::Ge => interval.tighten_lower(threshold, false),
            }
            true
        }
        _ => panic!(
            "test oracle only decides single-parameter constraints, got {constraint}"
        ),
    }
}

fn is_sat_set(constraints: &ConstraintSet) -> bool {
    intervals_of(constraints).is_some()
}

/// All witness valuations of a constraint set (cartesian over parameters)
fn witness_valuations(intervals: &BTreeMap<Parameter, Interval>) -> Vec<ParameterValuation> {
    let mut assignments: Vec<Vec<(Parameter, Rational)>> = vec![Vec::new()];
    for (parameter, interval) in intervals {
        let mut extended = Vec::new();
        for assignment in &assignments {
            for value in interval.witnesses() {
                let mut next = assignment.clone();
                next.push((*parameter, value));
                extended.push(next);
            }
        }
        assignments = extended;
    }
    assignments
        .into_iter()
        .map(ParameterValuation::of)
        .collect()
}

/// Negative-cycle check over the evaluated clock bounds
fn clock_bounds_consistent(bounds: &[AtomicGuard], valuation: &ParameterValuation) -> bool {
    let mut clocks: BTreeSet<Clock> = BTreeSet::new();
    clocks.insert(Clock::ZERO);
    for guard in bounds {
        let (lhs, rhs) = guard.upper_clocks();
        clocks.insert(lhs);
        clocks.insert(rhs);
    }
    let clocks: Vec<Clock> = clocks.into_iter().collect();
    let index: HashMap<Clock, usize> = clocks.iter().enumerate().map(|(i, c)| (*c, i)).collect();
    let n = clocks.len();

    let mut weights: Vec<Endpoint> = vec![
        Endpoint {
            value: Rational::infinity(),
            strict: true,
        };
        n * n
    ];
    for i in 0..n {
        weights[i * n + i] = Endpoint {
            value: Rational::zero(),
            strict: false,
        };
    }
    for guard in bounds {
        let (lhs, rhs) = guard.upper_clocks();
        let (i, j) = (index[&lhs], index[&rhs]);
        let value = guard.upper_bound().evaluate(valuation);
        let strict = guard.upper_bound_relation() == RelationType::Lt;
        let candidate = Endpoint { value, strict };
        if tighter(&candidate, &weights[i * n + j]) {
            weights[i * n + j] = candidate;
        }
    }

    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if !weights[i * n + k].value.is_finite() || !weights[k * n + j].value.is_finite() {
                    continue;
                }
                let candidate = Endpoint {
                    value: &weights[i * n + k].value + &weights[k * n + j].value,
                    strict: weights[i * n + k].strict || weights[k * n + j].strict,
                };
                if tighter(&candidate, &weights[i * n + j]) {
                    weights[i * n + j] = candidate;
                }
            }
        }
    }

    (0..n).all(|i| {
        let diagonal = &weights[i * n + i];
        diagonal.value > Rational::zero()
            || (diagonal.value == Rational::zero() && !diagonal.strict)
    })
}

fn tighter(a: &Endpoint, b: &Endpoint) -> bool {
    a.value < b.value || (a.value == b.value && a.strict && !b.strict)
}

/// The oracle handed to engine tests
#[derive(Debug, Default)]
pub struct IntervalOracle;

impl IntervalOracle {
    pub fn new() -> Self {
        IntervalOracle
    }
}

impl Oracle for IntervalOracle {
    fn is_sat(&mut self, constraints: &ConstraintSet) -> Result<Satisfiability, OracleError> {
        Ok(if is_sat_set(constraints) {
            Satisfiability::Sat
        } else {
            Satisfiability::Unsat
        })
    }

    fn check_coverage(
        &mut self,
        candidate: &ParameterConstraint,
        context: &ConstraintSet,
    ) -> Result<Coverage, OracleError> {
        let with_candidate = is_sat_set(&context.and_constraint(candidate));
        let with_negation = is_sat_set(&context.and_constraint(&candidate.negate()));
        Ok(match (with_candidate, with_negation) {
            (false, _) => Coverage::No,
            (true, false) => Coverage::Yes,
            (true, true) => Coverage::Split,
        })
    }

    fn is_zone_sat(
        &mut self,
        constraints: &ConstraintSet,
        bounds: &[AtomicGuard],
    ) -> Result<Satisfiability, OracleError> {
        let Some(intervals) = intervals_of(constraints) else {
            return Ok(Satisfiability::Unsat);
        };
        let sat = witness_valuations(&intervals)
            .iter()
            .any(|valuation| clock_bounds_consistent(bounds, valuation));
        Ok(if sat {
            Satisfiability::Sat
        } else {
            Satisfiability::Unsat
        })
    }
}

/// Shorthand used across the integration tests
pub fn constant(value: i64) -> LinearExpression {
    LinearExpression::of_const(Rational::from_int(value))
}

/// The constraint `p ⋈ value`
pub fn param_constraint(
    parameter: Parameter,
    relation: RelationType,
    value: i64,
) -> ParameterConstraint {
    ParameterConstraint::of(LinearExpression::of_param(parameter), constant(value), relation)
}
