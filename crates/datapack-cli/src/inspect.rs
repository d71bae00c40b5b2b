//! # Inspect Subcommand
//!
//! `datapack inspect <ARCHIVE>` prints the `bag-info.txt` fields and the
//! identifier-to-file mapping of a bag, as text or JSON.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use datapack_bag::verify_archive;

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Zipped bag to inspect.
    pub archive: PathBuf,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Run `inspect`, writing to `out`.
pub fn run_inspect(args: &InspectArgs, out: &mut impl Write) -> Result<u8> {
    let report = verify_archive(&args.archive)
        .with_context(|| format!("failed to read bag {}", args.archive.display()))?;

    if args.json {
        let info: serde_json::Map<String, serde_json::Value> = report
            .info
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();
        let members: Vec<_> = report
            .pid_mapping
            .iter()
            .map(|(id, path)| json!({ "identifier": id, "path": path }))
            .collect();
        let doc = json!({
            "archive": args.archive.display().to_string(),
            "digest": report.algorithm.map(|a| a.as_str()),
            "payload_files": report.payload_files,
            "payload_bytes": report.payload_bytes,
            "bag_info": info,
            "pid_mapping": members,
            "valid": report.is_valid(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
        return Ok(0);
    }

    writeln!(out, "{}", args.archive.display())?;
    for (label, value) in &report.info {
        writeln!(out, "  {label}: {value}")?;
    }
    if let Some(alg) = report.algorithm {
        writeln!(out, "  Manifest-Algorithm: {alg}")?;
    }
    writeln!(out)?;
    writeln!(out, "Members:")?;
    let width = report
        .pid_mapping
        .iter()
        .map(|(id, _)| id.len())
        .max()
        .unwrap_or(0);
    for (id, path) in &report.pid_mapping {
        writeln!(out, "  {id:<width$}  {path}")?;
    }
    Ok(0)
}
