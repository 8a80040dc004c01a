//! LP model for a single (source, target) distribution pair (spec
//! section 4.B): minimize total expected rewriting cost subject to
//! per-column normalization and exact target production.

use morph_dist::Distribution;
use morph_error::{MorphError, MorphResult};

/// `min sum_j s[j] * M[i,j] * |i - j|` subject to `sum_i M[i,j] == 1` for
/// every `j` and `M . s == t`, `M[i,j] >= 0`.
#[derive(Debug, Clone)]
pub struct LpProblem {
    n: usize,
    source: Vec<f64>,
    target: Vec<f64>,
}

impl LpProblem {
    /// Build a problem from a source and target distribution of equal
    /// length. Neither distribution needs a partition decomposition here;
    /// partitioned solving builds one `LpProblem` per (top-level, or
    /// inter-partition) pair via [`crate::solve_partitioned`].
    pub fn new(source: &Distribution, target: &Distribution) -> MorphResult<Self> {
        if source.len() != target.len() {
            return Err(MorphError::InvalidArgument(format!(
                "source and target distributions must have equal length, got {} and {}",
                source.len(),
                target.len()
            )));
        }
        Ok(Self {
            n: source.len(),
            source: source.as_slice().to_vec(),
            target: target.as_slice().to_vec(),
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn source(&self) -> &[f64] {
        &self.source
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// Padding ("split") cost of rewriting a 0-based source index `j` to a
    /// 0-based target index `i`, matching the packet morpher's per-byte
    /// cost model (spec section 4.F).
    pub(crate) fn cost(i: usize, j: usize) -> f64 {
        (i as f64 - j as f64).abs()
    }
}
