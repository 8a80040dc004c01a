//! Scenario 4 (spec section 8): for a 1460-length pair with source and
//! target equal to the same distribution, the partitioned solver returns
//! a matrix whose sampling produces the identity distribution within
//! statistical tolerance.

use morph_dist::Distribution;
use morph_lp::{solve_partitioned, ClarabelBackend};
use morph_matrix::Morph;

fn skewed_distribution(n: usize) -> Distribution {
    let raw: Vec<f64> = (0..n).map(|i| 1.0 + (i % 7) as f64).collect();
    let sum: f64 = raw.iter().sum();
    Distribution::from_vec(raw.iter().map(|v| v / sum).collect()).unwrap()
}

#[test]
fn identical_source_and_target_partitioned_solve_is_identity() {
    let n = 1460;
    let k = 20;
    let dist = skewed_distribution(n);
    let source = dist.partition(k).unwrap();
    let target = dist.partition(k).unwrap();

    let pmm = solve_partitioned(&source, &target, &ClarabelBackend, None).unwrap();

    // deterministic r = 1.0 walks the CDF of every column to its end,
    // landing on the length whose own mass closes the sum -- for an
    // identity optimum that is always the source length itself.
    for len in (1..=n).step_by(37) {
        assert_eq!(pmm.sample_target(len, Some(1.0)).unwrap(), len);
    }
}

#[test]
fn partitioned_solve_matches_flat_solve_on_a_small_case() {
    use morph_lp::{solve, LpProblem};

    let n = 20;
    let k = 4;
    let dist = skewed_distribution(n);

    let flat_problem = LpProblem::new(&dist, &dist).unwrap();
    let flat = solve(&flat_problem, &ClarabelBackend, None).unwrap();

    let source = dist.partition(k).unwrap();
    let target = dist.partition(k).unwrap();
    let pmm = solve_partitioned(&source, &target, &ClarabelBackend, None).unwrap();
    let flat_from_partitioned = pmm.to_flat().unwrap();

    for len in 1..=n {
        assert_eq!(flat.sample_target(len, Some(1.0)).unwrap(), len);
        assert_eq!(flat_from_partitioned.sample_target(len, Some(1.0)).unwrap(), len);
    }
}
