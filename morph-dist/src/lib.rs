//! Discrete probability distributions over packet payload lengths.
//!
//! A [`Distribution`] is the source (S) or target (T) input to the
//! morphing-matrix solver: an ordered, validated, immutable probability
//! vector indexed 1..=n. See [`partition`] for the large-sample-space
//! decomposition used when n is too large for a single LP.

mod partition;

pub use partition::{PartitionedDistribution, DEFAULT_PARTITIONS, DEFAULT_PARTITION_SIZE};

use morph_error::{MorphError, MorphResult, NORMALIZATION_TOLERANCE};

/// A validated discrete probability distribution over packet lengths
/// `1..=n`. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    values: Vec<f64>,
}

impl Distribution {
    /// Build a distribution from raw probabilities (index `i` corresponds
    /// to packet length `i + 1`), validating normalization.
    pub fn from_vec(values: Vec<f64>) -> MorphResult<Self> {
        if values.is_empty() {
            return Err(MorphError::InvalidArgument(
                "distribution must have at least one entry".into(),
            ));
        }
        if let Some(negative) = values.iter().find(|&&p| p < 0.0) {
            return Err(MorphError::InvalidArgument(format!(
                "probability must be non-negative, got {negative}"
            )));
        }
        let sum = pairwise_sum(&values);
        if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
            return Err(MorphError::NotNormalized {
                sum,
                tolerance: NORMALIZATION_TOLERANCE,
            });
        }
        Ok(Self { values })
    }

    /// Uniform distribution over `1..=n`.
    pub fn uniform(n: usize) -> MorphResult<Self> {
        if n == 0 {
            return Err(MorphError::InvalidArgument("n must be > 0".into()));
        }
        let p = 1.0 / n as f64;
        Self::from_vec(vec![p; n])
    }

    /// Point mass at length `at` (1-based) out of `n` total lengths.
    pub fn point_mass(n: usize, at: usize) -> MorphResult<Self> {
        if at == 0 || at > n {
            return Err(MorphError::InvalidArgument(format!(
                "point mass index {at} out of range 1..={n}"
            )));
        }
        let mut values = vec![0.0; n];
        values[at - 1] = 1.0;
        Self::from_vec(values)
    }

    /// Parse a distribution text file: lines `<1-based-index> <probability>`,
    /// blank lines and `#`-comments ignored, indices strictly consecutive
    /// from 1, sum must equal 1 within tolerance.
    pub fn load(text: &str) -> MorphResult<Self> {
        let mut values = Vec::new();
        let mut expected_index = 1usize;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut parts = trimmed.split_whitespace();
            let idx_str = parts.next().ok_or_else(|| {
                MorphError::BadFormat(format!("missing index in line {trimmed:?}"))
            })?;
            let prob_str = parts.next().ok_or_else(|| {
                MorphError::BadFormat(format!("missing probability in line {trimmed:?}"))
            })?;
            if parts.next().is_some() {
                return Err(MorphError::BadFormat(format!(
                    "too many fields in line {trimmed:?}"
                )));
            }

            let idx: usize = idx_str
                .parse()
                .map_err(|_| MorphError::BadFormat(format!("bad index {idx_str:?}")))?;
            if idx != expected_index {
                return Err(MorphError::BadFormat(format!(
                    "indices must be consecutive starting at 1: expected {expected_index}, got {idx}"
                )));
            }
            let prob: f64 = prob_str
                .parse()
                .map_err(|_| MorphError::BadFormat(format!("bad probability {prob_str:?}")))?;
            if prob < 0.0 {
                return Err(MorphError::BadFormat(format!(
                    "probability must be non-negative, got {prob}"
                )));
            }

            values.push(prob);
            expected_index += 1;
        }

        if values.is_empty() {
            return Err(MorphError::BadFormat("file contained no data lines".into()));
        }

        Self::from_vec(values)
    }

    /// Number of packet lengths this distribution ranges over.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw probability vector, index 0 corresponding to length 1.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Probability of packet length `i` (1-based).
    pub fn prob(&self, i: usize) -> Option<f64> {
        if i == 0 {
            return None;
        }
        self.values.get(i - 1).copied()
    }

    /// Decompose into `k` equally-sized contiguous partitions, per
    /// spec section 3.4 ("Dealing With Large Sample Spaces").
    pub fn partition(&self, k: usize) -> MorphResult<PartitionedDistribution> {
        PartitionedDistribution::new(self.clone(), k)
    }
}

/// Pairwise (divide-and-conquer) summation: keeps floating point error
/// from accumulating the way a naive left-to-right fold would over
/// thousands of small probabilities, without resorting to arbitrary
/// precision (Design Notes section 9: "standardize on 64-bit floats").
pub(crate) fn pairwise_sum(values: &[f64]) -> f64 {
    const CHUNK: usize = 128;
    if values.len() <= CHUNK {
        return values.iter().sum();
    }
    let mid = values.len() / 2;
    pairwise_sum(&values[..mid]) + pairwise_sum(&values[mid..])
}
