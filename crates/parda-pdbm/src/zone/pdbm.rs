//! The parametric difference-bound matrix
//!
//! A [`Pdbm`] is a dense `n x n` matrix over the clocks of a zone (index 0
//! is always the zero clock). Cell `(i, j)` holds the tightest known upper
//! bound on `c_i - c_j`, a linear expression over parameters together with
//! a `<` or `<=` relation. Absence of a bound is encoded as `<= +∞`;
//! diagonal cells are `0 <= 0`.
//!
//! All operations are pure: they return new matrices and never mutate their
//! input. Operations that compare parametric bounds consult the
//! [`Oracle`] and may *split*, returning one `(C, D)` pair per sub-region
//! of the parameter space on which the comparison resolves differently.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};

use log::{debug, trace, warn};
use parda_display_utils::aligned_columns;

use crate::expressions::constraint::{ConstraintSet, ParameterConstraint};
use crate::expressions::linear::LinearExpression;
use crate::expressions::rational::Rational;
use crate::expressions::{Clock, RelationType};
use crate::oracle::{Coverage, Oracle, OracleError, Satisfiability};
use crate::zone::{AtomicGuard, ResetSet};

/// Queue length at which `canonical` starts complaining about runaway splits
const WORK_QUEUE_WARN_THRESHOLD: usize = 256;

/// An immutable parametric difference-bound matrix
///
/// # Example
///
/// ```
/// use parda_pdbm::{Clock, Pdbm};
///
/// let c1 = Clock::fresh();
/// let c2 = Clock::fresh();
/// let zone = Pdbm::initial([c1, c2]);
///
/// // the zero clock always sits at index 0
/// assert_eq!(zone.size(), 3);
/// assert_eq!(zone.clocks()[0], Clock::ZERO);
/// assert_eq!(zone.index_of(&c1), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Pdbm {
    /// Clocks in index order, zero clock first
    clocks: Vec<Clock>,
    /// Clock to matrix index
    index: HashMap<Clock, usize>,
    /// Row-major cells; cell `(i, j)` bounds `c_i - c_j` from above
    cells: Vec<AtomicGuard>,
}

/// Upper-bound view of a cell
fn upper_of(guard: &AtomicGuard) -> (LinearExpression, RelationType) {
    (guard.upper_bound(), guard.upper_bound_relation())
}

/// Resolve a coverage constraint, short-circuiting constant-only cases
///
/// Comparisons whose outcome does not depend on the parameters (including
/// those decided by an infinite sentinel bound) never reach the oracle, so
/// oracle implementations only see finite parametric arithmetic.
fn decide_coverage(
    kappa: &ParameterConstraint,
    context: &ConstraintSet,
    oracle: &mut dyn Oracle,
) -> Result<Coverage, OracleError> {
    if kappa.is_trivially_true() {
        return Ok(Coverage::Yes);
    }
    if kappa.is_trivially_false() {
        return Ok(Coverage::No);
    }
    oracle.check_coverage(kappa, context)
}

/// Outcome of running one work pair to its Floyd-Warshall fixpoint
enum Tightened {
    /// No further tightening possible under this constraint set
    Canonical(Pdbm),
    /// A comparison split the parameter space; both children must be queued
    Split([(ConstraintSet, Pdbm); 2]),
    /// The oracle could not decide a comparison; the pair is pruned
    Abandoned,
}

impl Pdbm {
    fn from_parts(clocks: Vec<Clock>, cells: Vec<AtomicGuard>) -> Self {
        debug_assert_eq!(cells.len(), clocks.len() * clocks.len());
        let index = clocks.iter().enumerate().map(|(i, c)| (*c, i)).collect();
        Pdbm {
            clocks,
            index,
            cells,
        }
    }

    /// The initial zone `∀c. c >= 0` over the given clocks
    ///
    /// The zero clock is added if absent and always placed at index 0; the
    /// remaining clocks are ordered by identity. Row 0 encodes clock
    /// non-negativity (`x0 - c_i <= 0`), all other off-diagonal cells are
    /// unbounded.
    pub fn initial(clocks: impl IntoIterator<Item = Clock>) -> Self {
        let mut ordered: BTreeSet<Clock> = clocks.into_iter().collect();
        ordered.insert(Clock::ZERO);
        let clocks: Vec<Clock> = ordered.into_iter().collect();

        let n = clocks.len();
        let zero = || LinearExpression::of_const(Rational::zero());
        let mut cells = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let cell = if i == j {
                    AtomicGuard::of(clocks[i], clocks[i], zero(), RelationType::Le)
                } else if i == 0 {
                    AtomicGuard::of(Clock::ZERO, clocks[j], zero(), RelationType::Le)
                } else {
                    AtomicGuard::of(
                        clocks[i],
                        clocks[j],
                        LinearExpression::of_const(Rational::infinity()),
                        RelationType::Le,
                    )
                };
                cells.push(cell);
            }
        }
        Pdbm::from_parts(clocks, cells)
    }

    /// Number of clocks of the zone, including the zero clock
    pub fn size(&self) -> usize {
        self.clocks.len()
    }

    /// The clocks of the zone in index order
    pub fn clocks(&self) -> &[Clock] {
        &self.clocks
    }

    /// The matrix index of a clock, if it belongs to this zone
    pub fn index_of(&self, clock: &Clock) -> Option<usize> {
        self.index.get(clock).copied()
    }

    /// The guard stored at cell `(i, j)`
    ///
    /// # Panics
    ///
    /// Panics when an index is out of range.
    pub fn get(&self, i: usize, j: usize) -> &AtomicGuard {
        let n = self.size();
        assert!(
            i < n && j < n,
            "matrix index ({i}, {j}) out of range for size {n}"
        );
        &self.cells[i * n + j]
    }

    fn with_cell(&self, i: usize, j: usize, guard: AtomicGuard) -> Pdbm {
        let mut cells = self.cells.clone();
        cells[i * self.size() + j] = guard;
        Pdbm::from_parts(self.clocks.clone(), cells)
    }

    /// Conjoin an atomic guard onto the zone
    ///
    /// Compares the guard's bound against the current cell through the
    /// oracle and returns one or two `(C, D)` pairs:
    /// - `YES` (current bound already at least as tight): the input pair,
    /// - `NO` (new bound strictly tighter): the updated matrix,
    /// - `SPLIT`: both, with the constraint set refined either way,
    /// - `UNKNOWN`: nothing, the branch is pruned.
    ///
    /// A guard mentioning a clock outside the zone is vacuous and returns
    /// the input pair unchanged. Canonicity is not restored here; callers
    /// follow up with [`Pdbm::canonical`].
    pub fn add_guard(
        &self,
        guard: &AtomicGuard,
        constraints: &ConstraintSet,
        oracle: &mut dyn Oracle,
    ) -> Result<Vec<(ConstraintSet, Pdbm)>, OracleError> {
        debug!("add_guard: {guard} under {constraints}");

        let (lhs, rhs) = guard.upper_clocks();
        let (Some(i), Some(j)) = (self.index_of(&lhs), self.index_of(&rhs)) else {
            debug!("add_guard: {guard} mentions a clock outside the zone, vacuous");
            return Ok(vec![(constraints.clone(), self.clone())]);
        };

        let new_bound = guard.upper_bound();
        let new_relation = guard.upper_bound_relation();

        if i == j {
            // a self-difference never touches the matrix; a parametric one
            // constrains only the parameters: 0 ≺ E, i.e. -E ≺ 0
            if new_bound.is_constant() {
                return Ok(vec![(constraints.clone(), self.clone())]);
            }
            let kappa = ParameterConstraint::of(
                new_bound.negate(),
                LinearExpression::of_const(Rational::zero()),
                new_relation,
            );
            return Ok(match decide_coverage(&kappa, constraints, oracle)? {
                Coverage::Yes => vec![(constraints.clone(), self.clone())],
                Coverage::No => vec![],
                Coverage::Split => vec![(constraints.and_constraint(&kappa), self.clone())],
                Coverage::Unknown => {
                    warn!("add_guard: oracle could not decide {kappa}, pruning branch");
                    vec![]
                }
            });
        }

        // an infinite candidate imposes no bound
        if *new_bound.constant() == Rational::infinity() {
            return Ok(vec![(constraints.clone(), self.clone())]);
        }

        let current = self.get(i, j);
        let (cur_bound, cur_relation) = upper_of(current);
        let kappa = ParameterConstraint::of(
            cur_bound,
            new_bound.clone(),
            cur_relation.and(new_relation),
        );

        let updated = || {
            self.with_cell(
                i,
                j,
                AtomicGuard::of(self.clocks[i], self.clocks[j], new_bound.clone(), new_relation),
            )
        };

        let result = match decide_coverage(&kappa, constraints, oracle)? {
            Coverage::Yes => vec![(constraints.clone(), self.clone())],
            Coverage::No => vec![(constraints.clone(), updated())],
            Coverage::Split => vec![
                (constraints.and_constraint(&kappa), self.clone()),
                (constraints.and_constraint(&kappa.negate()), updated()),
            ],
            Coverage::Unknown => {
                warn!("add_guard: oracle could not decide {kappa}, pruning branch");
                vec![]
            }
        };
        debug!("add_guard: {} result pair(s)", result.len());
        Ok(result)
    }

    /// Bring the zone into symbolic canonical form
    ///
    /// Runs a symbolic Floyd-Warshall over a FIFO worklist of `(C, D)`
    /// pairs. Comparisons that depend on the parameters fork the work pair;
    /// children are processed breadth-first and deduplicated by structural
    /// equality. Pairs whose zone is empty, and pairs on which the oracle
    /// answers `UNKNOWN`, are dropped.
    ///
    /// The result is a set of canonical pairs partitioning the satisfiable
    /// part of the input constraint set.
    pub fn canonical(
        &self,
        constraints: &ConstraintSet,
        oracle: &mut dyn Oracle,
    ) -> Result<Vec<(ConstraintSet, Pdbm)>, OracleError> {
        debug!("canonical: start under {constraints}");

        let mut queue: VecDeque<(ConstraintSet, Pdbm)> = VecDeque::new();
        let mut enqueued: HashSet<(ConstraintSet, Pdbm)> = HashSet::new();
        let seed = (constraints.clone(), self.clone());
        enqueued.insert(seed.clone());
        queue.push_back(seed);

        let mut results: Vec<(ConstraintSet, Pdbm)> = Vec::new();

        while let Some((context, matrix)) = queue.pop_front() {
            if matrix.is_empty(&context, oracle)? {
                debug!("canonical: dropping empty work pair under {context}");
                continue;
            }

            match matrix.tightened(&context, oracle)? {
                Tightened::Canonical(done) => {
                    let pair = (context, done);
                    if !results.contains(&pair) {
                        results.push(pair);
                    }
                }
                Tightened::Split(children) => {
                    for child in children {
                        if enqueued.insert(child.clone()) {
                            queue.push_back(child);
                        } else {
                            trace!("canonical: dropping duplicate work pair");
                        }
                    }
                    if queue.len() >= WORK_QUEUE_WARN_THRESHOLD {
                        warn!(
                            "canonical: {} pending work pairs, parameter space is splintering",
                            queue.len()
                        );
                    }
                }
                Tightened::Abandoned => {}
            }
        }

        debug!("canonical: {} canonical pair(s)", results.len());
        Ok(results)
    }

    /// Run the `k, i, j` tightening loop on one work pair until either a
    /// full pass changes nothing, a comparison splits, or the oracle gives
    /// up
    fn tightened(
        &self,
        context: &ConstraintSet,
        oracle: &mut dyn Oracle,
    ) -> Result<Tightened, OracleError> {
        let n = self.size();
        let mut cells = self.cells.clone();

        loop {
            let mut changed = false;
            for k in 0..n {
                for i in 0..n {
                    if i == k {
                        continue;
                    }
                    for j in 0..n {
                        // paths through an endpoint are identities
                        if i == j || j == k {
                            continue;
                        }

                        let (e_ik, r_ik) = upper_of(&cells[i * n + k]);
                        let (e_kj, r_kj) = upper_of(&cells[k * n + j]);
                        let via_bound = e_ik.add(&e_kj);
                        if *via_bound.constant() == Rational::infinity() {
                            continue;
                        }
                        let via_relation = r_ik.and(r_kj);

                        let (e_ij, r_ij) = upper_of(&cells[i * n + j]);
                        let kappa = ParameterConstraint::of(
                            e_ij,
                            via_bound.clone(),
                            r_ij.and(via_relation),
                        );

                        match decide_coverage(&kappa, context, oracle)? {
                            Coverage::Yes => {}
                            Coverage::No => {
                                let tightened = AtomicGuard::of(
                                    self.clocks[i],
                                    self.clocks[j],
                                    via_bound,
                                    via_relation,
                                );
                                // an equal rewrite must not count as progress
                                if tightened != cells[i * n + j] {
                                    trace!(
                                        "canonical: tightening ({i}, {j}) to {tightened} via {k}"
                                    );
                                    cells[i * n + j] = tightened;
                                    changed = true;
                                }
                            }
                            Coverage::Split => {
                                debug!("canonical: split on {kappa} under {context}");
                                let unchanged =
                                    Pdbm::from_parts(self.clocks.clone(), cells.clone());
                                let mut tightened_cells = cells;
                                tightened_cells[i * n + j] = AtomicGuard::of(
                                    self.clocks[i],
                                    self.clocks[j],
                                    via_bound,
                                    via_relation,
                                );
                                let tightened =
                                    Pdbm::from_parts(self.clocks.clone(), tightened_cells);
                                return Ok(Tightened::Split([
                                    (context.and_constraint(&kappa), unchanged),
                                    (context.and_constraint(&kappa.negate()), tightened),
                                ]));
                            }
                            Coverage::Unknown => {
                                warn!(
                                    "canonical: oracle could not decide {kappa} under {context}, \
                                     abandoning work pair"
                                );
                                return Ok(Tightened::Abandoned);
                            }
                        }
                    }
                }
            }
            if !changed {
                return Ok(Tightened::Canonical(Pdbm::from_parts(
                    self.clocks.clone(),
                    cells,
                )));
            }
        }
    }

    /// Let time elapse: remove the individual upper bound of every clock
    ///
    /// Replaces cell `(i, 0)` with `< +∞` for every non-zero clock.
    /// Differences between clocks are unaffected because time raises all
    /// clocks uniformly. The result is not canonical; callers follow up
    /// with [`Pdbm::canonical`].
    pub fn delay(&self) -> Pdbm {
        let n = self.size();
        let mut cells = self.cells.clone();
        for i in 1..n {
            cells[i * n] = AtomicGuard::of(
                self.clocks[i],
                Clock::ZERO,
                LinearExpression::of_const(Rational::infinity()),
                RelationType::Lt,
            );
        }
        Pdbm::from_parts(self.clocks.clone(), cells)
    }

    /// Snap the given clocks to constant values
    ///
    /// After `c_r := v`, the difference `c_r - c_j` equals `v - c_j`, so
    /// its bound derives from the current bound on `x0 - c_j` shifted by
    /// `v` (and symmetrically for the column). Resets are applied in clock
    /// order, so resetting several clocks composes. The result is not
    /// canonical.
    ///
    /// # Panics
    ///
    /// Panics when a reset clock is not part of the zone.
    pub fn reset(&self, resets: &ResetSet) -> Pdbm {
        let n = self.size();
        let mut cells = self.cells.clone();

        for (clock, value) in resets.iter() {
            let r = self
                .index_of(clock)
                .unwrap_or_else(|| panic!("reset clock {clock} is not in the zone"));
            let value_expr = LinearExpression::of_const(value.clone());

            for j in 0..n {
                if j == r {
                    continue;
                }
                let (e_0j, rel_0j) = upper_of(&cells[j]);
                cells[r * n + j] = AtomicGuard::of(
                    self.clocks[r],
                    self.clocks[j],
                    value_expr.add(&e_0j),
                    rel_0j,
                );

                let (e_j0, rel_j0) = upper_of(&cells[j * n]);
                cells[j * n + r] = AtomicGuard::of(
                    self.clocks[j],
                    self.clocks[r],
                    e_j0.sub(&value_expr),
                    rel_j0,
                );
            }
            cells[r * n + r] = AtomicGuard::of(
                self.clocks[r],
                self.clocks[r],
                LinearExpression::of_const(Rational::zero()),
                RelationType::Le,
            );
        }
        Pdbm::from_parts(self.clocks.clone(), cells)
    }

    /// Decide whether the zone is empty under the given constraint set
    ///
    /// Builds the conjunction of the constraint set and every finite matrix
    /// entry and asks the oracle for satisfiability. An undecided query is
    /// conservatively treated as non-empty.
    pub fn is_empty(
        &self,
        constraints: &ConstraintSet,
        oracle: &mut dyn Oracle,
    ) -> Result<bool, OracleError> {
        let n = self.size();
        let mut bounds = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let cell = &self.cells[i * n + j];
                let constant = cell.upper_bound().constant().clone();
                if constant == Rational::infinity() {
                    continue;
                }
                if constant == Rational::neg_infinity() {
                    debug!("is_empty: cell ({i}, {j}) has bound -∞, zone is empty");
                    return Ok(true);
                }
                bounds.push(cell.clone());
            }
        }

        match oracle.is_zone_sat(constraints, &bounds)? {
            Satisfiability::Unsat => Ok(true),
            Satisfiability::Sat => Ok(false),
            Satisfiability::Unknown => {
                warn!("is_empty: undecided, conservatively treating zone as non-empty");
                Ok(false)
            }
        }
    }
}

impl PartialEq for Pdbm {
    fn eq(&self, other: &Self) -> bool {
        self.clocks == other.clocks && self.cells == other.cells
    }
}

impl Eq for Pdbm {}

impl Hash for Pdbm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.clocks.hash(state);
        self.cells.hash(state);
    }
}

impl PartialOrd for Pdbm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pdbm {
    fn cmp(&self, other: &Self) -> Ordering {
        self.clocks
            .cmp(&other.clocks)
            .then_with(|| self.cells.cmp(&other.cells))
    }
}

impl fmt::Display for Pdbm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();
        let mut rows = Vec::with_capacity(n + 1);

        let mut header = vec![String::new()];
        header.extend(self.clocks.iter().map(|c| c.to_string()));
        rows.push(header);

        for i in 0..n {
            let mut row = vec![self.clocks[i].to_string()];
            for j in 0..n {
                let (bound, relation) = upper_of(&self.cells[i * n + j]);
                row.push(format!("{} {}", relation.symbol(), bound));
            }
            rows.push(row);
        }
        write!(f, "{}", aligned_columns(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i64) -> LinearExpression {
        LinearExpression::of_const(Rational::from_int(value))
    }

    fn infinity() -> LinearExpression {
        LinearExpression::of_const(Rational::infinity())
    }

    /// Fresh clocks plus a zone shaped like `Pdbm::initial` but fully
    /// unbounded off the diagonal, mirroring how tests set up custom zones
    fn unconstrained(clocks: &[Clock]) -> Pdbm {
        let mut all: Vec<Clock> = vec![Clock::ZERO];
        all.extend_from_slice(clocks);
        let n = all.len();
        let mut cells = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let cell = if i == j {
                    AtomicGuard::of(all[i], all[i], constant(0), RelationType::Le)
                } else {
                    AtomicGuard::of(all[i], all[j], infinity(), RelationType::Lt)
                };
                cells.push(cell);
            }
        }
        Pdbm::from_parts(all, cells)
    }

    #[test]
    fn test_initial_layout() {
        let c1 = Clock::fresh();
        let c2 = Clock::fresh();
        let zone = Pdbm::initial([c2, c1]);

        assert_eq!(zone.size(), 3);
        assert_eq!(zone.clocks()[0], Clock::ZERO);
        // non-zero clocks in identity order regardless of input order
        assert_eq!(zone.clocks()[1], c1);
        assert_eq!(zone.clocks()[2], c2);

        for i in 0..3 {
            for j in 0..3 {
                let (bound, relation) = upper_of(zone.get(i, j));
                if i == j {
                    assert_eq!(bound, constant(0));
                    assert_eq!(relation, RelationType::Le);
                } else if i == 0 {
                    // x0 - c_j <= 0, i.e. c_j >= 0
                    assert_eq!(bound, constant(0));
                    assert_eq!(relation, RelationType::Le);
                } else {
                    assert_eq!(bound, infinity());
                    assert_eq!(relation, RelationType::Le);
                }
            }
        }
    }

    #[test]
    fn test_initial_includes_zero_clock_implicitly() {
        let c1 = Clock::fresh();
        let zone = Pdbm::initial([c1]);
        assert_eq!(zone.size(), 2);
        assert_eq!(zone.index_of(&Clock::ZERO), Some(0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let zone = Pdbm::initial([Clock::fresh()]);
        let _ = zone.get(0, 2);
    }

    #[test]
    fn test_delay_unbounds_clock_rows_only() {
        let c1 = Clock::fresh();
        let c2 = Clock::fresh();
        let mut zone = unconstrained(&[c1, c2]);
        let i1 = zone.index_of(&c1).unwrap();
        let i2 = zone.index_of(&c2).unwrap();
        zone = zone
            .with_cell(
                i1,
                0,
                AtomicGuard::of(c1, Clock::ZERO, constant(10), RelationType::Lt),
            )
            .with_cell(
                i1,
                i2,
                AtomicGuard::of(c1, c2, constant(5), RelationType::Lt),
            );

        let delayed = zone.delay();

        for i in 1..delayed.size() {
            let (bound, relation) = upper_of(delayed.get(i, 0));
            assert_eq!(bound, infinity());
            assert_eq!(relation, RelationType::Lt);
        }
        // inter-clock and row-0 bounds survive
        assert_eq!(delayed.get(i1, i2), zone.get(i1, i2));
        assert_eq!(delayed.get(0, i1), zone.get(0, i1));
        assert_eq!(delayed.get(0, 0), zone.get(0, 0));
    }

    #[test]
    fn test_reset_translates_zero_row_bounds() {
        let c1 = Clock::fresh();
        let c2 = Clock::fresh();
        // 15 < c2 < 20
        let mut zone = unconstrained(&[c1, c2]);
        let i1 = zone.index_of(&c1).unwrap();
        let i2 = zone.index_of(&c2).unwrap();
        zone = zone
            .with_cell(
                i2,
                0,
                AtomicGuard::of(c2, Clock::ZERO, constant(20), RelationType::Lt),
            )
            .with_cell(
                0,
                i2,
                AtomicGuard::of(Clock::ZERO, c2, constant(-15), RelationType::Lt),
            );

        let reset = zone.reset(&ResetSet::new([(c1, Rational::from_int(5))]));

        // c1 - c2 < 5 + (-15) = -10, relation copied from (x0, c2)
        let (bound, relation) = upper_of(reset.get(i1, i2));
        assert_eq!(bound, constant(-10));
        assert_eq!(relation, RelationType::Lt);

        // c2 - c1 < 20 - 5 = 15, relation copied from (c2, x0)
        let (bound, relation) = upper_of(reset.get(i2, i1));
        assert_eq!(bound, constant(15));
        assert_eq!(relation, RelationType::Lt);

        // c1 - x0 <= 5 and x0 - c1 <= -5, relations copied from the diagonal
        let (bound, relation) = upper_of(reset.get(i1, 0));
        assert_eq!(bound, constant(5));
        assert_eq!(relation, RelationType::Le);
        let (bound, relation) = upper_of(reset.get(0, i1));
        assert_eq!(bound, constant(-5));
        assert_eq!(relation, RelationType::Le);

        // bounds of clocks that were not reset survive
        assert_eq!(reset.get(i2, 0), zone.get(i2, 0));
        assert_eq!(reset.get(0, i2), zone.get(0, i2));
        // diagonal of the reset clock stays 0 <= 0
        let (bound, relation) = upper_of(reset.get(i1, i1));
        assert_eq!(bound, constant(0));
        assert_eq!(relation, RelationType::Le);
    }

    #[test]
    fn test_reset_to_zero_twice_is_idempotent() {
        let c1 = Clock::fresh();
        let c2 = Clock::fresh();
        let mut zone = unconstrained(&[c1, c2]);
        let i2 = zone.index_of(&c2).unwrap();
        zone = zone.with_cell(
            i2,
            0,
            AtomicGuard::of(c2, Clock::ZERO, constant(7), RelationType::Le),
        );

        let resets = ResetSet::to_zero([c1]);
        let once = zone.reset(&resets);
        let twice = once.reset(&resets);
        assert_eq!(once, twice);
    }

    #[test]
    #[should_panic(expected = "is not in the zone")]
    fn test_reset_of_foreign_clock_panics() {
        let c1 = Clock::fresh();
        let stranger = Clock::fresh();
        let zone = Pdbm::initial([c1]);
        let _ = zone.reset(&ResetSet::to_zero([stranger]));
    }

    #[test]
    fn test_equality_and_hashing_ignore_index_map() {
        let c1 = Clock::fresh();
        let zone1 = Pdbm::initial([c1]);
        let zone2 = Pdbm::initial([c1]);
        assert_eq!(zone1, zone2);

        let mut set = HashSet::new();
        set.insert(zone1);
        assert!(set.contains(&zone2));
    }

    #[test]
    fn test_display_mentions_all_clocks() {
        let c1 = Clock::fresh();
        let zone = Pdbm::initial([c1]);
        let rendered = zone.to_string();
        assert!(rendered.contains("x0"));
        assert!(rendered.contains(&c1.to_string()));
        assert!(rendered.contains("<= ∞"));
    }
}
