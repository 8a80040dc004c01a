//! Per-packet pad-or-split transformation (spec section 4.F): given an
//! incoming packet length, samples a target length from a morphing
//! matrix (or, under the Sampling strategy, directly from a fallback
//! distribution) and emits a plan of wire segments that realizes it.

mod plan;
mod sampler;

pub use plan::{Plan, Segment};

use morph_dist::Distribution;
use morph_error::{MorphError, MorphResult};
use morph_matrix::Morph;

/// Per-split framing/header cost, in bytes (spec section 4.F).
pub const DEFAULT_SPLIT_PENALTY: u64 = 50;

/// Which distribution drives target-length draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every draw, including the first, comes from the fallback
    /// distribution -- no morphing matrix involved.
    Sampling,
    /// The first draw comes from the morphing matrix's column for the
    /// packet's (remaining) length; subsequent draws (needed only if
    /// the first target is itself shorter than the packet) fall back
    /// to the fallback distribution.
    Morphing,
}

/// Rewrites packet lengths under one matrix and one fallback
/// distribution. Stateless and immutable: holds only borrowed
/// references, so one instance can be shared read-only across worker
/// threads (spec section 5).
pub struct PacketMorpher<'a, M: Morph> {
    matrix: &'a M,
    fallback: &'a Distribution,
    split_penalty: u64,
}

impl<'a, M: Morph> PacketMorpher<'a, M> {
    pub fn new(matrix: &'a M, fallback: &'a Distribution) -> Self {
        Self {
            matrix,
            fallback,
            split_penalty: DEFAULT_SPLIT_PENALTY,
        }
    }

    pub fn with_split_penalty(mut self, split_penalty: u64) -> Self {
        self.split_penalty = split_penalty;
        self
    }

    /// Rewrite a packet of length `s_len` (1-based, must be in the
    /// matrix's and fallback distribution's range) into a [`Plan`].
    pub fn morph(&self, s_len: usize, strategy: Strategy) -> MorphResult<Plan> {
        if s_len == 0 {
            return Err(MorphError::InvalidArgument(
                "packet length must be greater than zero".into(),
            ));
        }

        let mut remaining = s_len;
        let mut first = true;
        let mut overhead: u64 = 0;
        let mut segments = Vec::new();

        loop {
            let t = if first && strategy == Strategy::Morphing {
                self.matrix.sample_target(remaining, None)?
            } else {
                sampler::sample_nonzero(self.fallback)?
            };

            if t >= remaining {
                segments.push(Segment::Send {
                    actual: remaining,
                    padded_to: t,
                });
                overhead += (t - remaining) as u64;
                break;
            }

            segments.push(Segment::Split {
                actual: t,
                padded_to: t,
                remainder: remaining - t,
            });
            overhead += self.split_penalty;
            remaining -= t;
            first = false;
        }

        tracing::trace!(s_len, segments = segments.len(), overhead, "morphed packet");
        Ok(Plan { segments, overhead })
    }
}
