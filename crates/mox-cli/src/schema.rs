//! # Schema Subcommand
//!
//! Prints the validation document generated for an object type.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mox_schema::SchemaCompiler;

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Object type name (case-insensitive).
    pub object_type: String,

    /// Write the document to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit compact JSON.
    #[arg(long)]
    pub compact: bool,
}

pub fn run_schema(args: &SchemaArgs, compiler: &SchemaCompiler) -> Result<u8> {
    let document = compiler.generate(&args.object_type)?;
    let text = if args.compact {
        serde_json::to_string(document.as_value())?
    } else {
        serde_json::to_string_pretty(document.as_value())?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), object_type = %document.object_type(), "wrote schema");
        }
        None => println!("{text}"),
    }
    Ok(0)
}
