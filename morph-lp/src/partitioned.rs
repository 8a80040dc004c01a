//! Two-level partitioned solve (spec section 3.4 / 4.E): one top-level
//! LP between partition representative distributions, plus k^2
//! inter-partition LPs, assembled into a [`PartitionedMorphingMatrix`].

use crate::backend::{solve_with_retry, LpBackend};
use crate::model::LpProblem;
use morph_dist::{Distribution, PartitionedDistribution};
use morph_error::MorphResult;
use morph_matrix::PartitionedMorphingMatrix;
use std::time::Instant;

/// Solve the partitioned decomposition for `source` and `target`,
/// dispatching one `LpProblem` per cell via `backend`. `deadline`, if
/// given, is checked before every sub-LP; the first sub-LP to start
/// after the deadline has passed aborts the whole operation (spec
/// section 5: "the current sub-LP is abandoned and the operation
/// fails").
pub fn solve_partitioned(
    source: &PartitionedDistribution,
    target: &PartitionedDistribution,
    backend: &dyn LpBackend,
    deadline: Option<Instant>,
) -> MorphResult<PartitionedMorphingMatrix> {
    let k = source.k();
    let m = source.m();

    let top_problem = LpProblem::new(
        &Distribution::from_vec(source.repr().to_vec())?,
        &Distribution::from_vec(target.repr().to_vec())?,
    )?;
    let top = solve_with_retry(&top_problem, backend, deadline)?;
    tracing::debug!(k, "solved top-level partition LP");

    let mut subs = Vec::with_capacity(k);
    for p in 1..=k {
        let mut row = Vec::with_capacity(k);
        for q in 1..=k {
            let sub = solve_sub_problem(source, target, p, q, backend, deadline)?;
            row.push(sub);
        }
        tracing::trace!(partition = p, "solved inter-partition LP row");
        subs.push(row);
    }

    PartitionedMorphingMatrix::new(top, subs, m)
}

/// Solve `M_pq`, the inter-partition matrix morphing source partition
/// `q`'s conditional distribution into target partition `p`'s (spec
/// section 4.E: "for each (p, q), compute M_pq from (source.part[q],
/// target.part[p])"). A partition with zero representative mass has no
/// valid conditional PMF to solve against; source lengths in it never
/// occur, so an identity placeholder (itself column-stochastic) is used
/// instead of running the solver.
fn solve_sub_problem(
    source: &PartitionedDistribution,
    target: &PartitionedDistribution,
    p: usize,
    q: usize,
    backend: &dyn LpBackend,
    deadline: Option<Instant>,
) -> MorphResult<morph_matrix::MorphingMatrix> {
    let m = source.m();
    let source_empty = source.repr()[q - 1] <= 0.0;
    let target_empty = target.repr()[p - 1] <= 0.0;

    if source_empty || target_empty {
        return identity_placeholder(m);
    }

    let source_part = source.part(q).expect("q validated 1..=k by caller");
    let target_part = target.part(p).expect("p validated 1..=k by caller");
    let problem = LpProblem::new(
        &Distribution::from_vec(source_part.to_vec())?,
        &Distribution::from_vec(target_part.to_vec())?,
    )?;
    solve_with_retry(&problem, backend, deadline)
}

fn identity_placeholder(m: usize) -> MorphResult<morph_matrix::MorphingMatrix> {
    let triples = (1..=m).map(|i| (i, i, 1.0)).collect();
    morph_matrix::MorphingMatrix::from_coo(m, triples)
}
