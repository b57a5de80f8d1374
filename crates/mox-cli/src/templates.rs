//! # Apply-Templates Subcommand
//!
//! Renders every (object type, template) pair into one SQL script.
//! With `--check` the script is compared against a previously generated
//! file by SHA-256 digest instead of being written.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mox_schema::SchemaCompiler;
use mox_templates::TemplateEngine;

use crate::sha256_hex;

#[derive(Args, Debug)]
pub struct ApplyTemplatesArgs {
    /// Write the script to a file instead of stdout.
    #[arg(short, long, conflicts_with = "check")]
    pub output: Option<PathBuf>,

    /// Compare against an existing script and exit 1 on drift.
    #[arg(long, value_name = "FILE")]
    pub check: Option<PathBuf>,
}

pub fn run_apply_templates(
    args: &ApplyTemplatesArgs,
    compiler: &SchemaCompiler,
    engine: &TemplateEngine,
) -> Result<u8> {
    let snapshot = compiler.snapshot();
    let script = engine.project_all_to_string(snapshot.registry())?;

    if let Some(path) = &args.check {
        let existing =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let expected = sha256_hex(&existing);
        let actual = sha256_hex(script.as_bytes());
        println!("existing:  {expected}  {}", path.display());
        println!("generated: {actual}");
        if expected == actual {
            println!("OK: script is up to date");
            return Ok(0);
        }
        eprintln!("DRIFT: {} differs from the generated script", path.display());
        return Ok(1);
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &script)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), digest = %sha256_hex(script.as_bytes()), "wrote script");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(script.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(0)
}
