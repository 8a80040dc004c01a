//! Solver adapter (spec section 4.C): turns an [`LpProblem`] into a
//! [`MorphingMatrix`] via the `good_lp` modeling layer, using Clarabel
//! (a pure-Rust interior-point solver, so no external binary or license
//! is ever required) as the backend.

use crate::model::LpProblem;
use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable};
use morph_error::{MorphError, MorphResult, LP_EQUALITY_TOLERANCE, SOLVER_ZERO_CLAMP};
use morph_matrix::MorphingMatrix;
use std::time::Instant;

/// Abstracts over LP solver backends so `morph-lp` (and its tests) are
/// not hard-wired to Clarabel; a `StubBackend` with closed-form answers
/// lives under `#[cfg(test)]` for scenarios where the exact optimum is
/// known analytically.
pub trait LpBackend {
    /// Solve `problem`. If `deadline` has already passed, the sub-LP is
    /// abandoned without calling into the solver (spec section 5:
    /// "on deadline expiry the current sub-LP is abandoned and the
    /// operation fails").
    fn solve(&self, problem: &LpProblem, deadline: Option<Instant>) -> MorphResult<MorphingMatrix>;
}

/// Pure-Rust interior-point solver backend. Always available: no system
/// package, license, or network fetch needed at solve time.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClarabelBackend;

impl LpBackend for ClarabelBackend {
    fn solve(&self, problem: &LpProblem, deadline: Option<Instant>) -> MorphResult<MorphingMatrix> {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(MorphError::SolverError(
                    "deadline exceeded before sub-LP solve started".into(),
                ));
            }
        }

        let n = problem.n();
        let mut vars = variables!();
        let m: Vec<Vec<Variable>> = (0..n)
            .map(|_| (0..n).map(|_| vars.add(variable().min(0.0))).collect())
            .collect();

        let mut cost_expr = Expression::from(0.0);
        for j in 0..n {
            let s_j = problem.source()[j];
            if s_j <= 0.0 {
                continue;
            }
            for i in 0..n {
                let weight = s_j * LpProblem::cost(i, j);
                if weight > 0.0 {
                    cost_expr += weight * m[i][j];
                }
            }
        }

        let mut model = vars.minimise(cost_expr).using(clarabel);

        // Every column is a conditional PMF over target lengths.
        for j in 0..n {
            let col_sum: Expression = (0..n)
                .map(|i| Expression::from(m[i][j]))
                .fold(Expression::from(0.0), |acc, term| acc + term);
            model = model.with(constraint!(col_sum == 1.0));
        }

        // M . source == target, row by row.
        for i in 0..n {
            let row: Expression = (0..n)
                .map(|j| problem.source()[j] * m[i][j])
                .fold(Expression::from(0.0), |acc, term| acc + term);
            model = model.with(constraint!(row == problem.target()[i]));
        }

        let solution = model.solve().map_err(classify_resolution_error)?;

        let mut triples = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let v = solution.value(m[i][j]);
                if v.abs() >= SOLVER_ZERO_CLAMP {
                    triples.push((i + 1, j + 1, v.max(0.0)));
                }
            }
        }

        let matrix = MorphingMatrix::from_coo(n, triples)?;
        verify_target_production(&matrix, problem)?;
        Ok(matrix)
    }
}

/// Solve `problem` via `backend`, retrying once if the first attempt
/// fails with a transient `SolverError` (spec section 7: "the solver
/// wrapper retries once on a transient backend failure; a second failure
/// surfaces"). `Infeasible` and `InvalidArgument` are never retried --
/// they are properties of the problem, not the backend, so a second
/// attempt would fail identically. A `SolverError` caused by the deadline
/// having already passed is likewise not retried: the retry could not
/// possibly finish sooner than the attempt that just missed it.
pub fn solve_with_retry(
    problem: &LpProblem,
    backend: &dyn LpBackend,
    deadline: Option<Instant>,
) -> MorphResult<MorphingMatrix> {
    match backend.solve(problem, deadline) {
        Ok(matrix) => Ok(matrix),
        Err(MorphError::SolverError(msg)) if !deadline_has_passed(deadline) => {
            tracing::warn!(error = %msg, "transient solver failure, retrying once");
            backend.solve(problem, deadline)
        }
        Err(other) => Err(other),
    }
}

fn deadline_has_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn classify_resolution_error(err: ResolutionError) -> MorphError {
    match err {
        ResolutionError::Infeasible => MorphError::Infeasible,
        ResolutionError::Unbounded => MorphError::SolverError("LP reported unbounded".into()),
        other => MorphError::SolverError(format!("{other:?}")),
    }
}

/// Sanity-check the solved matrix against `M . source == target` beyond
/// what the solver itself already enforced, guarding against a Clarabel
/// return that is merely "close enough" by its own tolerance but drifts
/// outside ours once zero-clamping and COO reassembly round the values.
fn verify_target_production(matrix: &MorphingMatrix, problem: &LpProblem) -> MorphResult<()> {
    let n = problem.n();
    let mut produced = vec![0.0; n];
    for j in 1..=n {
        for (i, p) in matrix.potential(j)? {
            produced[i - 1] += p * problem.source()[j - 1];
        }
    }
    for i in 0..n {
        if (produced[i] - problem.target()[i]).abs() > LP_EQUALITY_TOLERANCE * 10.0 {
            return Err(MorphError::SolverError(format!(
                "target production mismatch at index {}: expected {}, got {}",
                i + 1,
                problem.target()[i],
                produced[i]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_dist::Distribution;

    /// A backend with closed-form answers for the identity and shift
    /// scenarios, used by tests that don't need (or want) to pay for an
    /// actual Clarabel solve.
    pub struct StubIdentityBackend;

    impl LpBackend for StubIdentityBackend {
        fn solve(&self, problem: &LpProblem, _deadline: Option<Instant>) -> MorphResult<MorphingMatrix> {
            let n = problem.n();
            let triples = (1..=n).map(|i| (i, i, 1.0)).collect();
            MorphingMatrix::from_coo(n, triples)
        }
    }

    #[test]
    fn stub_identity_round_trips() {
        let d = Distribution::uniform(4).unwrap();
        let problem = LpProblem::new(&d, &d).unwrap();
        let matrix = StubIdentityBackend.solve(&problem, None).unwrap();
        for i in 1..=4 {
            assert_eq!(matrix.potential(i).unwrap(), vec![(i, 1.0)]);
        }
    }

    #[test]
    fn deadline_already_passed_is_rejected() {
        let d = Distribution::uniform(4).unwrap();
        let problem = LpProblem::new(&d, &d).unwrap();
        let past = Instant::now() - std::time::Duration::from_secs(1);
        let err = ClarabelBackend.solve(&problem, Some(past)).unwrap_err();
        assert!(matches!(err, MorphError::SolverError(_)));
    }

    /// Fails with `SolverError` on its first `attempts_before_success`
    /// calls, then defers to `StubIdentityBackend`. Used to exercise
    /// `solve_with_retry`'s "retry once on a transient failure" contract
    /// without needing a real Clarabel failure to provoke.
    struct FlakyBackend {
        attempts: std::cell::Cell<usize>,
        attempts_before_success: usize,
    }

    impl FlakyBackend {
        fn new(attempts_before_success: usize) -> Self {
            Self { attempts: std::cell::Cell::new(0), attempts_before_success }
        }
    }

    impl LpBackend for FlakyBackend {
        fn solve(&self, problem: &LpProblem, deadline: Option<Instant>) -> MorphResult<MorphingMatrix> {
            let attempt = self.attempts.get();
            self.attempts.set(attempt + 1);
            if attempt < self.attempts_before_success {
                return Err(MorphError::SolverError("transient backend hiccup".into()));
            }
            StubIdentityBackend.solve(problem, deadline)
        }
    }

    #[test]
    fn retries_once_and_succeeds_on_a_transient_failure() {
        let d = Distribution::uniform(4).unwrap();
        let problem = LpProblem::new(&d, &d).unwrap();
        let backend = FlakyBackend::new(1);

        let matrix = solve_with_retry(&problem, &backend, None).unwrap();
        assert_eq!(backend.attempts.get(), 2);
        assert_eq!(matrix.potential(1).unwrap(), vec![(1, 1.0)]);
    }

    #[test]
    fn a_second_transient_failure_surfaces() {
        let d = Distribution::uniform(4).unwrap();
        let problem = LpProblem::new(&d, &d).unwrap();
        let backend = FlakyBackend::new(2);

        let err = solve_with_retry(&problem, &backend, None).unwrap_err();
        assert_eq!(backend.attempts.get(), 2);
        assert!(matches!(err, MorphError::SolverError(_)));
    }

    #[test]
    fn infeasible_is_never_retried() {
        struct AlwaysInfeasible(std::cell::Cell<usize>);
        impl LpBackend for AlwaysInfeasible {
            fn solve(&self, _problem: &LpProblem, _deadline: Option<Instant>) -> MorphResult<MorphingMatrix> {
                self.0.set(self.0.get() + 1);
                Err(MorphError::Infeasible)
            }
        }

        let d = Distribution::uniform(4).unwrap();
        let problem = LpProblem::new(&d, &d).unwrap();
        let backend = AlwaysInfeasible(std::cell::Cell::new(0));

        let err = solve_with_retry(&problem, &backend, None).unwrap_err();
        assert_eq!(backend.0.get(), 1);
        assert!(matches!(err, MorphError::Infeasible));
    }

    #[test]
    fn a_failure_after_the_deadline_has_passed_is_not_retried() {
        let d = Distribution::uniform(4).unwrap();
        let problem = LpProblem::new(&d, &d).unwrap();
        let past = Instant::now() - std::time::Duration::from_secs(1);
        let backend = FlakyBackend::new(usize::MAX);

        let err = solve_with_retry(&problem, &backend, Some(past)).unwrap_err();
        assert_eq!(backend.attempts.get(), 1);
        assert!(matches!(err, MorphError::SolverError(_)));
    }

    /// A random normalized distribution over `n` lengths, all strictly
    /// positive so every column of the solved matrix is expected to be
    /// stochastic (no "this length never occurs" exemption to account for).
    fn random_distribution(rng: &mut impl rand::Rng, n: usize) -> Distribution {
        use rand::Rng;
        let raw: Vec<f64> = (0..n).map(|_| rng.gen_range(0.01..1.0)).collect();
        let sum: f64 = raw.iter().sum();
        Distribution::from_vec(raw.iter().map(|v| v / sum).collect()).unwrap()
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(16))]

        /// P1: every column of a solved matrix sums to 1, over randomly
        /// generated (source, target) pairs actually run through
        /// `ClarabelBackend`, not just the incidental check inside
        /// `MorphingMatrix::from_coo`.
        #[test]
        fn p1_every_column_of_a_solved_matrix_is_stochastic(seed in 0u64..10_000, n in 2usize..6) {
            use rand::{rngs::StdRng, SeedableRng};
            let mut rng = StdRng::seed_from_u64(seed);
            let source = random_distribution(&mut rng, n);
            let target = random_distribution(&mut rng, n);
            let problem = LpProblem::new(&source, &target).unwrap();
            let matrix = solve_with_retry(&problem, &ClarabelBackend, None).unwrap();

            for j in 1..=n {
                let col_sum: f64 = matrix.column(j).unwrap().iter().sum();
                prop_assert!((col_sum - 1.0).abs() < 1e-4, "column {} sums to {}", j, col_sum);
            }
        }

        /// P2: the solved matrix reproduces the target distribution,
        /// `||M . source - target||_inf < 1e-5`, over randomly generated
        /// (source, target) pairs.
        #[test]
        fn p2_solved_matrix_reproduces_the_target_distribution(seed in 0u64..10_000, n in 2usize..6) {
            use rand::{rngs::StdRng, SeedableRng};
            let mut rng = StdRng::seed_from_u64(seed);
            let source = random_distribution(&mut rng, n);
            let target = random_distribution(&mut rng, n);
            let problem = LpProblem::new(&source, &target).unwrap();
            let matrix = solve_with_retry(&problem, &ClarabelBackend, None).unwrap();

            let mut produced = vec![0.0; n];
            for j in 1..=n {
                for (i, p) in matrix.potential(j).unwrap() {
                    produced[i - 1] += p * source.prob(j).unwrap();
                }
            }
            let max_err = produced
                .iter()
                .zip(target.as_slice())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            prop_assert!(max_err < 1e-5, "max |M . source - target| = {}", max_err);
        }
    }
}
