//! Exercises the full offline-then-online pipeline through crate
//! boundaries: solve a flat LP, round-trip it through the Matrix-Market
//! writer/reader, morph packets with it, and run the overhead evaluator
//! against the result. Each stage is unit-tested in its own crate; this
//! checks that the pieces actually compose.

use morph_dist::Distribution;
use morph_eval::{evaluate, DEFAULT_CHECKPOINTS};
use morph_lp::{solve, ClarabelBackend, LpProblem};
use morph_matrix::{persist, Morph};
use morph_morpher::{PacketMorpher, Strategy};

#[test]
fn shift_scenario_survives_a_persistence_round_trip() {
    // Scenario 2 (spec section 8): S = point mass at 1, T = point mass at 5.
    let n = 5;
    let source = Distribution::point_mass(n, 1).unwrap();
    let target = Distribution::point_mass(n, 5).unwrap();

    let problem = LpProblem::new(&source, &target).unwrap();
    let matrix = solve(&problem, &ClarabelBackend, None).unwrap();

    let text = persist::to_string(&matrix).unwrap();
    let reloaded = persist::read_matrix(&text).unwrap();

    assert_eq!(reloaded.sample_target(1, Some(0.5)).unwrap(), 5);

    let morpher = PacketMorpher::new(&reloaded, &target);
    let plan = morpher.morph(1, Strategy::Morphing).unwrap();
    assert_eq!(plan.overhead(), 4);
}

#[test]
fn evaluator_runs_against_a_solved_and_reloaded_matrix() {
    let n = 6;
    let raw: Vec<f64> = vec![0.3, 0.25, 0.2, 0.15, 0.07, 0.03];
    let source = Distribution::from_vec(raw.clone()).unwrap();
    let target_raw: Vec<f64> = vec![0.05, 0.1, 0.15, 0.2, 0.2, 0.3];
    let target = Distribution::from_vec(target_raw).unwrap();

    let problem = LpProblem::new(&source, &target).unwrap();
    let matrix = solve(&problem, &ClarabelBackend, None).unwrap();
    let reloaded = persist::read_matrix(&persist::to_string(&matrix).unwrap()).unwrap();

    let checkpoints: Vec<u64> = DEFAULT_CHECKPOINTS.iter().copied().take(2).collect();
    let series = evaluate(&source, &target, &reloaded, &checkpoints).unwrap();

    assert_eq!(series.len(), 2);
    for pair in series.windows(2) {
        assert!(pair[1].cumulative_sampling >= pair[0].cumulative_sampling);
        assert!(pair[1].cumulative_morphing >= pair[0].cumulative_morphing);
    }
}
