//! Monte-Carlo overhead evaluator (spec section 4.G): draws packet
//! lengths from a source-traffic distribution, morphs each one under
//! both the Sampling and Morphing strategies, and reports the
//! cumulative overhead series at a set of checkpoints -- grounded on
//! the original gain-measurement script's main loop (every iteration
//! morphs the same draw twice, once per strategy, and accumulates both
//! running totals side by side for comparison).

use morph_dist::Distribution;
use morph_error::MorphResult;
use morph_matrix::Morph;
use morph_morpher::{PacketMorpher, Strategy};
use serde::Serialize;

/// Checkpoint iteration counts at which the cumulative overhead series
/// is reported by default (spec section 4.G).
pub const DEFAULT_CHECKPOINTS: [u64; 7] = [500, 2000, 8000, 16000, 50000, 100000, 500000];

/// Cumulative overhead, in bytes, of both strategies after `iteration`
/// morphed packets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Checkpoint {
    pub iteration: u64,
    pub cumulative_sampling: u64,
    pub cumulative_morphing: u64,
}

/// Run `max(checkpoints)` iterations. On each iteration, draw a packet
/// length from `source`, then morph that same draw once under the
/// Sampling strategy and once under the Morphing strategy, both using
/// `target` as the fallback distribution. Returns the cumulative
/// overhead at every requested checkpoint, in ascending order.
pub fn evaluate<M: Morph>(
    source: &Distribution,
    target: &Distribution,
    matrix: &M,
    checkpoints: &[u64],
) -> MorphResult<Vec<Checkpoint>> {
    let total = checkpoints.iter().copied().max().unwrap_or(0);
    let morpher = PacketMorpher::new(matrix, target);

    let mut cumulative_sampling: u64 = 0;
    let mut cumulative_morphing: u64 = 0;
    let mut series = Vec::new();

    for iteration in 1..=total {
        let s_len = draw_source_length(source)?;

        let sampling_plan = morpher.morph(s_len, Strategy::Sampling)?;
        cumulative_sampling += sampling_plan.overhead();

        let morphing_plan = morpher.morph(s_len, Strategy::Morphing)?;
        cumulative_morphing += morphing_plan.overhead();

        if checkpoints.contains(&iteration) {
            tracing::debug!(
                iteration,
                cumulative_sampling,
                cumulative_morphing,
                "overhead checkpoint"
            );
            series.push(Checkpoint {
                iteration,
                cumulative_sampling,
                cumulative_morphing,
            });
        }
    }

    series.sort_by_key(|c| c.iteration);
    Ok(series)
}

/// Draw a packet length (1-based) from `source` by inverse-CDF
/// sampling. Distinct from [`morph_morpher`]'s internal sampler only in
/// that it has no zero-draw guard to apply: `source` is a validated
/// [`Distribution`], whose indices are already 1-based lengths.
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

fn draw_source_length(source: &Distribution) -> MorphResult<usize> {
    use rand::Rng;
    let r: f64 = RNG.with(|rng| rng.borrow_mut().gen_range(0.0..1.0));
    let slice = source.as_slice();
    let mut cdf = 0.0;
    for (i, p) in slice.iter().enumerate() {
        cdf += p;
        if r <= cdf {
            return Ok(i + 1);
        }
    }
    Ok(slice.len())
}
