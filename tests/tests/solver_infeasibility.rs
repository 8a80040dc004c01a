//! Scenario 6 (spec section 8): source and target of different lengths,
//! or a zero-length input, must surface `InvalidArgument` -- across the
//! full pipeline, not just at the type that first notices.

use morph_dist::Distribution;
use morph_error::MorphError;
use morph_lp::LpProblem;

#[test]
fn mismatched_lengths_is_invalid_argument() {
    let s = Distribution::uniform(5).unwrap();
    let t = Distribution::uniform(6).unwrap();
    let err = LpProblem::new(&s, &t).unwrap_err();
    assert!(matches!(err, MorphError::InvalidArgument(_)));
}

#[test]
fn zero_length_vector_is_invalid_argument() {
    let err = Distribution::from_vec(vec![]).unwrap_err();
    assert!(matches!(err, MorphError::InvalidArgument(_)));
}

#[test]
fn zero_length_packet_through_the_morpher_is_invalid_argument() {
    use morph_matrix::MorphingMatrix;
    use morph_morpher::{PacketMorpher, Strategy};

    let n = 4;
    let mut dense = vec![0.0; n * n];
    for i in 0..n {
        dense[i * n + i] = 1.0;
    }
    let matrix = MorphingMatrix::from_dense(n, &dense).unwrap();
    let fallback = Distribution::uniform(n).unwrap();
    let morpher = PacketMorpher::new(&matrix, &fallback);

    let err = morpher.morph(0, Strategy::Morphing).unwrap_err();
    assert!(matches!(err, MorphError::InvalidArgument(_)));
}

#[test]
fn out_of_range_sample_column_is_invalid_argument() {
    use morph_matrix::{Morph, MorphingMatrix};

    let n = 4;
    let mut dense = vec![0.0; n * n];
    for i in 0..n {
        dense[i * n + i] = 1.0;
    }
    let matrix = MorphingMatrix::from_dense(n, &dense).unwrap();
    let err = matrix.sample_target(n + 1, Some(0.5)).unwrap_err();
    assert!(matches!(err, MorphError::InvalidArgument(_)));
}
