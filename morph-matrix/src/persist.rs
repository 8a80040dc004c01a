//! Matrix-Market coordinate persistence for [`MorphingMatrix`] (spec
//! section 4.H / 6): header `%%MatrixMarket matrix coordinate real
//! general`, then `rows cols nnz`, then `nnz` lines of `i j value`
//! (1-based). Entries below 1e-9 are omitted on write; values are
//! formatted to 6 decimal digits so `load(save(m)) == m` to that
//! precision (property P7).

use crate::MorphingMatrix;
use morph_error::{MorphError, MorphResult, SOLVER_ZERO_CLAMP};
use std::io::Write;

const HEADER: &str = "%%MatrixMarket matrix coordinate real general";

/// Serialize `m` to the Matrix-Market text format.
pub fn write_matrix<W: Write>(m: &MorphingMatrix, out: &mut W) -> MorphResult<()> {
    let n = m.size();
    let (col_ptr, row_idx, values) = m.csc_parts();
    let nnz = values.iter().filter(|v| v.abs() >= SOLVER_ZERO_CLAMP).count();

    writeln!(out, "{HEADER}")?;
    writeln!(out, "{n} {n} {nnz}")?;

    for j in 0..n {
        let start = col_ptr[j];
        let end = col_ptr[j + 1];
        for idx in start..end {
            let v = values[idx];
            if v.abs() < SOLVER_ZERO_CLAMP {
                continue;
            }
            writeln!(out, "{} {} {:.6}", row_idx[idx] + 1, j + 1, v)?;
        }
    }
    Ok(())
}

/// Serialize to an owned `String`, for callers that don't have a
/// `Write`r handy (e.g. building a response body).
pub fn to_string(m: &MorphingMatrix) -> MorphResult<String> {
    let mut buf = Vec::new();
    write_matrix(m, &mut buf)?;
    String::from_utf8(buf).map_err(|e| MorphError::BadFormat(e.to_string()))
}

/// Parse a Matrix-Market coordinate file into a [`MorphingMatrix`],
/// validating square shape and column stochasticity.
pub fn read_matrix(text: &str) -> MorphResult<MorphingMatrix> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| MorphError::BadFormat("empty matrix file".into()))?;
    if !header.starts_with("%%MatrixMarket") {
        return Err(MorphError::BadFormat(format!(
            "expected MatrixMarket header, got {header:?}"
        )));
    }

    let dims_line = lines
        .next()
        .ok_or_else(|| MorphError::BadFormat("missing dimensions line".into()))?;
    let mut dims = dims_line.split_whitespace();
    let rows: usize = parse_field(dims.next(), "rows")?;
    let cols: usize = parse_field(dims.next(), "cols")?;
    let nnz: usize = parse_field(dims.next(), "nnz")?;
    if rows != cols {
        return Err(MorphError::InvalidArgument(format!(
            "matrix must be square, got {rows}x{cols}"
        )));
    }

    let mut triples = Vec::with_capacity(nnz);
    for line in lines {
        let mut fields = line.split_whitespace();
        let i: usize = parse_field(fields.next(), "row index")?;
        let j: usize = parse_field(fields.next(), "col index")?;
        let v: f64 = parse_field(fields.next(), "value")?;
        triples.push((i, j, v));
    }

    if triples.len() != nnz {
        return Err(MorphError::BadFormat(format!(
            "header declared {nnz} nonzeros, found {}",
            triples.len()
        )));
    }

    MorphingMatrix::from_coo(rows, triples)
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, name: &str) -> MorphResult<T> {
    field
        .ok_or_else(|| MorphError::BadFormat(format!("missing {name}")))?
        .parse()
        .map_err(|_| MorphError::BadFormat(format!("malformed {name}: {field:?}")))
}
