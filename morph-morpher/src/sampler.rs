//! Inverse-CDF sampling of a bare [`Distribution`], used for the
//! fallback draws in [`crate::PacketMorpher::morph`] (every draw after
//! the first, and every draw under the Sampling strategy).

use morph_dist::Distribution;
use morph_error::MorphResult;
use rand::Rng;

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

/// Draw a length from `dist`, rejecting and resampling a zero draw
/// (spec section 4.F: "If the fallback distribution may draw 0 the
/// implementation must reject that draw and resample"). This
/// distribution's 1-based indexing means a draw can never actually be
/// zero, but the guard is kept as the spec requires it verbatim.
pub(crate) fn sample_nonzero(dist: &Distribution) -> MorphResult<usize> {
    loop {
        let t = sample_once(dist)?;
        if t > 0 {
            return Ok(t);
        }
    }
}

fn sample_once(dist: &Distribution) -> MorphResult<usize> {
    let r: f64 = RNG.with(|rng| rng.borrow_mut().gen_range(0.0..1.0));
    let slice = dist.as_slice();
    let mut cdf = 0.0;
    for (i, p) in slice.iter().enumerate() {
        cdf += p;
        if r <= cdf {
            return Ok(i + 1);
        }
    }
    Ok(slice.len())
}
