//! Column-stochastic morphing matrices and the two-level partitioned
//! ensemble used for large sample spaces (spec section 3.4).
//!
//! Both [`MorphingMatrix`] and [`PartitionedMorphingMatrix`] implement
//! [`Morph`], so `morph-morpher`'s `PacketMorpher` can be generic over
//! "flat" vs "partitioned" without a runtime enum.

mod matrix;
mod partitioned;
pub mod persist;

pub use matrix::MorphingMatrix;
pub use partitioned::PartitionedMorphingMatrix;

use morph_error::MorphResult;

/// Shared sampling interface: given a source packet length, draw a
/// target packet length by inverse-CDF sampling of the matrix column (or
/// columns, in the partitioned case) associated with that source length.
pub trait Morph {
    /// Draw a target length for source length `s_len` (1-based). If `r`
    /// is `Some`, it is used as the uniform draw (or draws, for the
    /// partitioned case, consuming from the same value); otherwise a
    /// fresh uniform is sampled from the thread-local RNG.
    fn sample_target(&self, s_len: usize, r: Option<f64>) -> MorphResult<usize>;

    /// Total number of packet lengths this matrix operates over.
    fn size(&self) -> usize;
}

/// Draw a uniform value in `[0, 1)`, used when a caller does not inject
/// a deterministic `r`. Backed by a per-thread RNG seeded from
/// `MORPH_SEED` when set (spec section 6: "process-wide state: none
/// beyond the RNG seed"), or from OS entropy otherwise -- each worker
/// thread seeds its own generator independently (spec section 5), so
/// setting `MORPH_SEED` makes every thread's draw sequence reproducible
/// without serializing threads behind a shared generator.
pub(crate) fn fresh_uniform() -> f64 {
    use rand::Rng;
    RNG.with(|rng| rng.borrow_mut().gen_range(0.0..1.0))
}

thread_local! {
    static RNG: std::cell::RefCell<rand::rngs::StdRng> = std::cell::RefCell::new(seeded_rng());
}

fn seeded_rng() -> rand::rngs::StdRng {
    use rand::SeedableRng;
    match std::env::var("MORPH_SEED").ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_entropy(),
    }
}
