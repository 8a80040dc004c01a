//! `morph-eval`: runs the Monte-Carlo overhead comparison between direct
//! sampling and morphing, and emits the cumulative-overhead series as a
//! CSV table (spec section 6).

use clap::Parser;
use morph_cli::{options::EvalOptions, report_error};
use morph_dist::Distribution;
use morph_error::MorphResult;
use morph_eval::{evaluate, Checkpoint, DEFAULT_CHECKPOINTS};
use morph_matrix::persist;
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    let opts = EvalOptions::parse();
    if let Some(seed) = opts.seed {
        std::env::set_var("MORPH_SEED", seed.to_string());
    }
    morph_logger::init_verbose(opts.verbose);

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(report_error("morph-eval", &err) as u8),
    }
}

fn run(opts: &EvalOptions) -> MorphResult<()> {
    let inputs = opts.resolve_inputs()?;

    let source_text = std::fs::read_to_string(&inputs.source_dist)?;
    let target_text = std::fs::read_to_string(&inputs.target_dist)?;
    let matrix_text = std::fs::read_to_string(&inputs.matrix)?;

    let source = Distribution::load(&source_text)?;
    let target = Distribution::load(&target_text)?;
    let matrix = persist::read_matrix(&matrix_text)?;

    let checkpoints: Vec<u64> = opts
        .checkpoints
        .clone()
        .unwrap_or_else(|| DEFAULT_CHECKPOINTS.to_vec());

    tracing::info!(iterations = checkpoints.iter().max().copied().unwrap_or(0), "running evaluation");
    let series = evaluate(&source, &target, &matrix, &checkpoints)?;

    let csv = render_csv(&series);
    match &opts.csv {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            file.write_all(csv.as_bytes())?;
            tracing::info!(output = %path.display(), "wrote overhead CSV");
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn render_csv(series: &[Checkpoint]) -> String {
    let mut out = String::from("iteration,cumulative_sampling,cumulative_morphing\n");
    for c in series {
        out.push_str(&format!(
            "{},{},{}\n",
            c.iteration, c.cumulative_sampling, c.cumulative_morphing
        ));
    }
    out
}
