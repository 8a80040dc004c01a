//! A single column-stochastic n x n morphing matrix, stored compressed
//! sparse column (CSC): `col_ptr[j]..col_ptr[j+1]` indexes into
//! `row_idx`/`values` for the nonzero entries of column `j`. CSC matches
//! both the LP solver's natural output sparsity and the per-column CDF
//! sampling access pattern (Design Notes section 9).

use crate::{fresh_uniform, Morph};
use morph_error::{MorphError, MorphResult, NORMALIZATION_TOLERANCE};

/// `M[i, j]` is the probability that an input of length `j` (1-based) is
/// rewritten to length `i` (1-based). Immutable after construction;
/// `Sync` because every field is plain data with no interior mutability,
/// so one instance can be shared read-only across worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphingMatrix {
    n: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<f64>,
}

impl MorphingMatrix {
    /// Build from a dense row-major n x n matrix, validating squareness
    /// and per-column stochasticity (sum in `[1 - tol, 1 + tol]`).
    /// Columns whose source mass is exactly zero are exempt (an all-zero
    /// column is valid: that source length never occurs).
    pub fn from_dense(n: usize, dense: &[f64]) -> MorphResult<Self> {
        if dense.len() != n * n {
            return Err(MorphError::InvalidArgument(format!(
                "expected {} entries for a {n}x{n} matrix, got {}",
                n * n,
                dense.len()
            )));
        }

        let mut col_ptr = Vec::with_capacity(n + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0);

        for j in 0..n {
            let mut col_sum = 0.0;
            for i in 0..n {
                let v = dense[i * n + j];
                if v < 0.0 {
                    return Err(MorphError::InvalidArgument(format!(
                        "matrix entry ({}, {}) is negative: {v}",
                        i + 1,
                        j + 1
                    )));
                }
                col_sum += v;
                if v > 0.0 {
                    row_idx.push(i);
                    values.push(v);
                }
            }
            if col_sum > 0.0 && (col_sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
                return Err(MorphError::NotStochastic { column: j + 1, sum: col_sum });
            }
            col_ptr.push(row_idx.len());
        }

        Ok(Self { n, col_ptr, row_idx, values })
    }

    /// Build directly from pre-sorted CSC arrays (e.g. read back from a
    /// Matrix-Market file). `row_idx` within each column must be
    /// ascending; callers that don't already guarantee this should use
    /// [`MorphingMatrix::from_dense`] or [`MorphingMatrix::from_coo`].
    pub(crate) fn from_csc_parts(
        n: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<f64>,
    ) -> MorphResult<Self> {
        if col_ptr.len() != n + 1 {
            return Err(MorphError::InvalidArgument(
                "col_ptr length must be n + 1".into(),
            ));
        }
        let m = Self { n, col_ptr, row_idx, values };
        m.validate_columns()?;
        Ok(m)
    }

    /// Build from a coordinate (COO) list of `(row, col, value)` triples,
    /// 1-based, as produced by an LP solver reading back a sparse
    /// solution or by the Matrix-Market loader.
    pub fn from_coo(n: usize, triples: Vec<(usize, usize, f64)>) -> MorphResult<Self> {
        let mut by_col: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for (row, col, value) in triples {
            if row == 0 || row > n || col == 0 || col > n {
                return Err(MorphError::InvalidArgument(format!(
                    "coordinate ({row}, {col}) out of range for a {n}x{n} matrix"
                )));
            }
            if value < 0.0 {
                return Err(MorphError::InvalidArgument(format!(
                    "matrix entry ({row}, {col}) is negative: {value}"
                )));
            }
            if value != 0.0 {
                by_col[col - 1].push((row - 1, value));
            }
        }

        let mut col_ptr = Vec::with_capacity(n + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0);
        for mut col in by_col {
            col.sort_by_key(|&(r, _)| r);
            for (r, v) in col {
                row_idx.push(r);
                values.push(v);
            }
            col_ptr.push(row_idx.len());
        }

        let m = Self { n, col_ptr, row_idx, values };
        m.validate_columns()?;
        Ok(m)
    }

    fn validate_columns(&self) -> MorphResult<()> {
        for j in 0..self.n {
            let sum: f64 = self.values[self.col_ptr[j]..self.col_ptr[j + 1]].iter().sum();
            if sum > 0.0 && (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
                return Err(MorphError::NotStochastic { column: j + 1, sum });
            }
        }
        Ok(())
    }

    /// Dense copy of column `j` (1-based), length `n`.
    pub fn column(&self, j: usize) -> MorphResult<Vec<f64>> {
        self.check_index(j)?;
        let mut col = vec![0.0; self.n];
        let start = self.col_ptr[j - 1];
        let end = self.col_ptr[j];
        for idx in start..end {
            col[self.row_idx[idx]] = self.values[idx];
        }
        Ok(col)
    }

    /// Nonzero `(length, probability)` pairs of column `j` (1-based), in
    /// ascending length order.
    pub fn potential(&self, j: usize) -> MorphResult<Vec<(usize, f64)>> {
        self.check_index(j)?;
        let start = self.col_ptr[j - 1];
        let end = self.col_ptr[j];
        Ok((start..end)
            .map(|idx| (self.row_idx[idx] + 1, self.values[idx]))
            .collect())
    }

    /// CSC arrays: `(col_ptr, row_idx (0-based), values)`, used by the
    /// Matrix-Market writer.
    pub(crate) fn csc_parts(&self) -> (&[usize], &[usize], &[f64]) {
        (&self.col_ptr, &self.row_idx, &self.values)
    }

    fn check_index(&self, j: usize) -> MorphResult<()> {
        if j == 0 || j > self.n {
            return Err(MorphError::InvalidArgument(format!(
                "column {j} out of range 1..={}",
                self.n
            )));
        }
        Ok(())
    }
}

impl Morph for MorphingMatrix {
    fn sample_target(&self, s_len: usize, r: Option<f64>) -> MorphResult<usize> {
        self.check_index(s_len)?;
        let r = r.unwrap_or_else(fresh_uniform);
        if !(0.0..=1.0).contains(&r) {
            return Err(MorphError::InvalidArgument(format!(
                "uniform draw must be in [0, 1], got {r}"
            )));
        }

        let start = self.col_ptr[s_len - 1];
        let end = self.col_ptr[s_len];
        let mut cdf = 0.0;
        for idx in start..end {
            cdf += self.values[idx];
            if r <= cdf {
                return Ok(self.row_idx[idx] + 1);
            }
        }
        // Rounding drift past the last CDF value: spec says return n.
        Ok(self.n)
    }

    fn size(&self) -> usize {
        self.n
    }
}
