//! `morpher`: solves a morphing matrix from a source/target distribution
//! pair and writes it to a Matrix-Market file (spec section 6).

use clap::Parser;
use morph_cli::{options::MorpherOptions, report_error};
use morph_dist::Distribution;
use morph_error::{MorphError, MorphResult};
use morph_lp::{solve, solve_partitioned, ClarabelBackend};
use morph_matrix::persist;
use std::process::ExitCode;
use std::time::{Duration, Instant};

fn main() -> ExitCode {
    let opts = MorpherOptions::parse();
    if let Some(seed) = opts.seed {
        std::env::set_var("MORPH_SEED", seed.to_string());
    }
    morph_logger::init_verbose(opts.verbose);

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(report_error("morpher", &err) as u8),
    }
}

fn run(opts: &MorpherOptions) -> MorphResult<()> {
    if opts.output.exists() {
        return Err(MorphError::IoError(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("output file {} already exists", opts.output.display()),
        )));
    }

    let source_text = std::fs::read_to_string(&opts.source)?;
    let target_text = std::fs::read_to_string(&opts.target)?;
    let source = Distribution::load(&source_text)?;
    let target = Distribution::load(&target_text)?;

    let deadline = opts
        .deadline_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let backend = ClarabelBackend;

    let matrix = if opts.partition {
        tracing::info!(k = opts.partitions, "solving via the partitioned decomposition");
        let source_part = source.partition(opts.partitions)?;
        let target_part = target.partition(opts.partitions)?;
        let pmm = solve_partitioned(&source_part, &target_part, &backend, deadline)?;
        pmm.to_flat()?
    } else {
        tracing::info!(n = source.len(), "solving flat LP");
        let problem = morph_lp::LpProblem::new(&source, &target)?;
        solve(&problem, &backend, deadline)?
    };

    let mut file = std::fs::File::create(&opts.output)?;
    persist::write_matrix(&matrix, &mut file)?;
    tracing::info!(output = %opts.output.display(), "wrote morphing matrix");
    Ok(())
}
