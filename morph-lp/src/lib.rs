//! LP model construction and solving for morphing matrices (spec
//! sections 4.B and 4.C), including the two-level partitioned
//! decomposition of section 3.4.

mod backend;
mod model;
mod partitioned;

pub use backend::{solve_with_retry, ClarabelBackend, LpBackend};
pub use model::LpProblem;
pub use partitioned::solve_partitioned;

use morph_error::MorphResult;
use morph_matrix::MorphingMatrix;
use std::time::Instant;

/// Solve a single (non-partitioned) `LpProblem` with the given backend,
/// retrying once on a transient backend failure (spec section 7). A thin
/// convenience wrapper so callers that don't need partitioning don't have
/// to name [`solve_with_retry`] directly.
pub fn solve(problem: &LpProblem, backend: &dyn LpBackend, deadline: Option<Instant>) -> MorphResult<MorphingMatrix> {
    solve_with_retry(problem, backend, deadline)
}
