//! # Verify Subcommand
//!
//! `datapack verify <ARCHIVE>` re-digests every manifest entry and checks
//! the payload totals. Exit code 0 when the bag is valid, 1 otherwise.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use datapack_bag::verify_archive;

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Zipped bag to verify.
    pub archive: PathBuf,
}

/// Run `verify`, writing the outcome to `out`.
pub fn run_verify(args: &VerifyArgs, out: &mut impl Write) -> Result<u8> {
    let report = verify_archive(&args.archive)
        .with_context(|| format!("failed to read bag {}", args.archive.display()))?;

    if report.is_valid() {
        writeln!(
            out,
            "{}: valid ({} payload files, {} bytes)",
            args.archive.display(),
            report.payload_files,
            report.payload_bytes
        )?;
        return Ok(0);
    }

    for problem in &report.problems {
        writeln!(out, "{problem}")?;
    }
    writeln!(
        out,
        "{}: invalid ({} problems)",
        args.archive.display(),
        report.problems.len()
    )?;
    Ok(1)
}
