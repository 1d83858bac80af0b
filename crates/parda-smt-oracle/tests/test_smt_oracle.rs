//! Tests against a real SMT solver
//!
//! These tests drive whichever of Z3/cvc5 is installed and return early
//! when neither is, so the suite stays green on machines without a solver.

use parda_pdbm::{
    AtomicGuard, Clock, ConstraintSet, Coverage, Cpdbm, LinearExpression, Oracle, Parameter,
    ParameterConstraint, Rational, RelationType, Satisfiability,
};
use parda_smt_oracle::{SmtOracle, SolverBuilder};

fn try_oracle(
    parameters: impl IntoIterator<Item = Parameter>,
    clocks: impl IntoIterator<Item = Clock>,
) -> Option<SmtOracle> {
    let builder = SolverBuilder::automatic().ok()?;
    Some(SmtOracle::new(&builder, parameters, clocks).expect("failed to start oracle"))
}

fn constant(value: i64) -> LinearExpression {
    LinearExpression::of_const(Rational::from_int(value))
}

#[test]
fn empty_constraint_set_is_satisfiable() {
    let Some(mut oracle) = try_oracle([], []) else {
        return;
    };
    assert_eq!(
        oracle.is_sat(&ConstraintSet::top()).unwrap(),
        Satisfiability::Sat
    );
}

#[test]
fn parameters_are_non_negative() {
    let p = Parameter::fresh();
    let Some(mut oracle) = try_oracle([p], []) else {
        return;
    };

    // p < 0 contradicts the axioms
    let refuted = ConstraintSet::of(ParameterConstraint::of(
        LinearExpression::of_param(p),
        constant(0),
        RelationType::Lt,
    ));
    assert_eq!(oracle.is_sat(&refuted).unwrap(), Satisfiability::Unsat);

    // p >= 0 is implied
    let covered = ParameterConstraint::of(
        LinearExpression::of_param(p),
        constant(0),
        RelationType::Ge,
    );
    assert_eq!(
        oracle
            .check_coverage(&covered, &ConstraintSet::top())
            .unwrap(),
        Coverage::Yes
    );
}

#[test]
fn coverage_distinguishes_yes_no_and_split() {
    let p = Parameter::fresh();
    let Some(mut oracle) = try_oracle([p], []) else {
        return;
    };

    let p_le_10 = ParameterConstraint::of(
        LinearExpression::of_param(p),
        constant(10),
        RelationType::Le,
    );
    let p_lt_5 = ParameterConstraint::of(
        LinearExpression::of_param(p),
        constant(5),
        RelationType::Lt,
    );

    // unconstrained: p <= 10 cuts the parameter space in two
    assert_eq!(
        oracle
            .check_coverage(&p_le_10, &ConstraintSet::top())
            .unwrap(),
        Coverage::Split
    );

    // under p < 5, p <= 10 is entailed
    let below_five = ConstraintSet::of(p_lt_5.clone());
    assert_eq!(
        oracle.check_coverage(&p_le_10, &below_five).unwrap(),
        Coverage::Yes
    );

    // under p > 10 the candidate p < 5 is refuted
    let above_ten = ConstraintSet::of(p_le_10.negate());
    assert_eq!(
        oracle.check_coverage(&p_lt_5, &above_ten).unwrap(),
        Coverage::No
    );
}

#[test]
fn zone_satisfiability_respects_clock_axioms() {
    let c1 = Clock::fresh();
    let Some(mut oracle) = try_oracle([], [c1]) else {
        return;
    };
    let top = ConstraintSet::top();

    // c1 <= 5 is consistent with c1 >= 0
    let fine = [AtomicGuard::less_equal(c1, Rational::from_int(5))];
    assert_eq!(
        oracle.is_zone_sat(&top, &fine).unwrap(),
        Satisfiability::Sat
    );

    // c1 < -1 is not
    let broken = [AtomicGuard::less_than(c1, Rational::from_int(-1))];
    assert_eq!(
        oracle.is_zone_sat(&top, &broken).unwrap(),
        Satisfiability::Unsat
    );
}

#[test]
fn zone_satisfiability_handles_exact_fractions() {
    let c1 = Clock::fresh();
    let Some(mut oracle) = try_oracle([], [c1]) else {
        return;
    };
    let top = ConstraintSet::top();

    // 1/3 <= c1 <= 2/3 has solutions; 2/3 <= c1 <= 1/3 does not
    let fine = [
        AtomicGuard::greater_equal(c1, Rational::from_ratio(1, 3)),
        AtomicGuard::less_equal(c1, Rational::from_ratio(2, 3)),
    ];
    assert_eq!(
        oracle.is_zone_sat(&top, &fine).unwrap(),
        Satisfiability::Sat
    );

    let broken = [
        AtomicGuard::greater_equal(c1, Rational::from_ratio(2, 3)),
        AtomicGuard::less_than(c1, Rational::from_ratio(1, 3)),
    ];
    assert_eq!(
        oracle.is_zone_sat(&top, &broken).unwrap(),
        Satisfiability::Unsat
    );
}

#[test]
fn engine_splits_through_the_smt_oracle() {
    let c1 = Clock::fresh();
    let c2 = Clock::fresh();
    let p = Parameter::fresh();
    let Some(mut oracle) = try_oracle([p], [c1, c2]) else {
        return;
    };

    // under p >= 1: add c1 - c2 < p, then c1 - c2 < 10; the second
    // comparison splits on p
    let at_least_one = ConstraintSet::of(ParameterConstraint::of(
        LinearExpression::of_param(p),
        constant(1),
        RelationType::Ge,
    ));
    let zone = Cpdbm::create_initial([c1, c2], at_least_one, &mut oracle)
        .unwrap()
        .pop()
        .expect("initial zone must not be empty");
    let zone = zone
        .add_guard_and_canonical(
            &AtomicGuard::of(c1, c2, LinearExpression::of_param(p), RelationType::Lt),
            &mut oracle,
        )
        .unwrap()
        .pop()
        .expect("parametric guard keeps the zone inhabited");

    let zones = zone
        .add_guard_and_canonical(
            &AtomicGuard::of(c1, c2, constant(10), RelationType::Lt),
            &mut oracle,
        )
        .unwrap();

    assert!(zones.len() >= 2, "expected a parametric split");
    let i = zones[0].pdbm().index_of(&c1).unwrap();
    let j = zones[0].pdbm().index_of(&c2).unwrap();
    assert!(
        zones
            .iter()
            .any(|z| z.pdbm().get(i, j).upper_bound() == LinearExpression::of_param(p))
    );
    assert!(
        zones
            .iter()
            .any(|z| z.pdbm().get(i, j).upper_bound() == constant(10))
    );
    for zone in &zones {
        assert!(!zone.is_empty(&mut oracle).unwrap());
    }
}
