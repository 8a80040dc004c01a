//! Two-level partition decomposition of a [`Distribution`], used by the
//! large-sample-space solver (spec section 3.4 / spec.md 4.E).

use crate::{pairwise_sum, Distribution};
use morph_error::{MorphError, MorphResult};

/// Default number of top-level partitions for the production MTU
/// configuration (n = 1460).
pub const DEFAULT_PARTITIONS: usize = 20;
/// Default partition size for the production MTU configuration
/// (`DEFAULT_PARTITIONS * DEFAULT_PARTITION_SIZE == 1460`).
pub const DEFAULT_PARTITION_SIZE: usize = 73;

/// A [`Distribution`] split into `k` equally-sized contiguous partitions.
///
/// `repr[p]` is the total probability mass of partition `p` (1-based);
/// `part[p]` is the conditional PMF within partition `p` (each entry
/// divided by `repr[p]`, summing to 1 unless `repr[p] == 0`, in which
/// case the partition has no valid conditional distribution and is left
/// as an all-zero placeholder -- callers must check `repr[p] > 0` before
/// using `part[p]` as an LP input).
#[derive(Debug, Clone)]
pub struct PartitionedDistribution {
    source: Distribution,
    k: usize,
    m: usize,
    repr: Vec<f64>,
    part: Vec<Vec<f64>>,
}

impl PartitionedDistribution {
    pub(crate) fn new(source: Distribution, k: usize) -> MorphResult<Self> {
        let n = source.len();
        if k == 0 || n % k != 0 {
            return Err(MorphError::BadPartition { len: n, k });
        }
        let m = n / k;

        let mut repr = Vec::with_capacity(k);
        let mut part = Vec::with_capacity(k);
        for p in 0..k {
            let chunk = &source.as_slice()[p * m..(p + 1) * m];
            let mass = pairwise_sum(chunk);
            repr.push(mass);
            if mass > 0.0 {
                part.push(chunk.iter().map(|v| v / mass).collect());
            } else {
                part.push(vec![0.0; m]);
            }
        }

        Ok(Self { source, k, m, repr, part })
    }

    /// Number of partitions.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Elements per partition.
    pub fn m(&self) -> usize {
        self.m
    }

    /// The original, unpartitioned distribution.
    pub fn source(&self) -> &Distribution {
        &self.source
    }

    /// Top-level representative distribution: `repr[p]` for `p` in
    /// `1..=k`, summing to 1.
    pub fn repr(&self) -> &[f64] {
        &self.repr
    }

    /// Conditional PMF within partition `p` (1-based). Empty mass
    /// (`repr[p] == 0`) yields an all-zero slice.
    pub fn part(&self, p: usize) -> Option<&[f64]> {
        if p == 0 || p > self.k {
            return None;
        }
        Some(&self.part[p - 1])
    }

    /// Given a 1-based global length `len` in `1..=n`, return the
    /// 1-based partition index `q` and the 1-based within-partition
    /// index `j'` such that `len == (q - 1) * m + j'`.
    pub fn locate(&self, len: usize) -> MorphResult<(usize, usize)> {
        if len == 0 || len > self.k * self.m {
            return Err(MorphError::InvalidArgument(format!(
                "length {len} out of range 1..={}",
                self.k * self.m
            )));
        }
        let zero_based = len - 1;
        let q = zero_based / self.m + 1;
        let within = zero_based % self.m + 1;
        Ok((q, within))
    }

    /// Reconstruct a 1-based global length from a partition index `p`
    /// and within-partition index `i'` (both 1-based).
    pub fn globalize(&self, p: usize, within: usize) -> MorphResult<usize> {
        if p == 0 || p > self.k || within == 0 || within > self.m {
            return Err(MorphError::InvalidArgument(format!(
                "partition index {p} or within-partition index {within} out of range"
            )));
        }
        Ok((p - 1) * self.m + within)
    }
}
