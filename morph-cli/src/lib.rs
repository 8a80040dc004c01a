//! Shared option-parsing and diagnostic plumbing for the `morpher` and
//! `morph-eval` binaries (spec section 6). Split into a library so the
//! `clap` structs are directly unit-testable, mirroring the teacher's
//! `cli::options` module.

pub mod options;

use morph_error::{ExitCode, MorphError};

/// Print a single-line diagnostic to stderr and return the matching
/// process exit code, per spec section 7: "CLI tools print a single-line
/// diagnostic to standard error and exit with a distinct non-zero code
/// per error kind."
pub fn report_error(context: &str, err: &MorphError) -> i32 {
    eprintln!("{context}: {err}");
    ExitCode::from(err) as i32
}
