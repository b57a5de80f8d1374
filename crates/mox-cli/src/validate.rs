//! # Validate Subcommand
//!
//! Validates a registration payload (JSON or YAML) for an object type.
//! Content references to uploads given with `--upload` are stored and
//! rewritten before validation, as a write request would be.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use mox_core::RelationTarget;
use mox_schema::{
    ContentResolver, FileContentStore, Operation, RelationView, SchemaCompiler, SchemaError,
    Upload,
};
use mox_structure::Cardinality;
use serde_json::Value;

/// Upload directory used when none is configured.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Object type name (case-insensitive).
    pub object_type: String,

    /// Registration payload (`.json`, `.yaml` or `.yml`).
    pub file: PathBuf,

    /// File uploaded with the registration, as NAME=PATH. Repeatable.
    #[arg(long = "upload", value_name = "NAME=PATH", value_parser = parse_upload)]
    pub uploads: Vec<(String, PathBuf)>,

    /// Treat the payload as a read: content references are left as is.
    #[arg(long)]
    pub read_only: bool,

    /// Print the payload after content references are rewritten.
    #[arg(long)]
    pub print_payload: bool,
}

fn parse_upload(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got {value:?}")),
    }
}

/// Parse a payload file, choosing the format by extension.
pub fn load_payload(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

pub fn run_validate(
    args: &ValidateArgs,
    compiler: &SchemaCompiler,
    upload_dir: Option<&Path>,
) -> Result<u8> {
    let mut payload = load_payload(&args.file)?;
    let snapshot = compiler.snapshot();
    let (name, description) = snapshot.registry().entry(&args.object_type)?;

    let uploads = args
        .uploads
        .iter()
        .map(|(field, path)| {
            let bytes = fs::read(path)
                .with_context(|| format!("failed to read upload {}", path.display()))?;
            let upload = Upload {
                file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
                content_type: None,
                bytes,
            };
            Ok((field.clone(), upload))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    let store = FileContentStore::new(upload_dir.unwrap_or(Path::new(DEFAULT_UPLOAD_DIR)));
    let operation = if args.read_only { Operation::Read } else { Operation::Write };
    let resolver = ContentResolver::new(&store, &uploads, operation);
    match resolver.resolve_payload(&mut payload) {
        Ok(rewritten) if rewritten > 0 => {
            tracing::info!(rewritten, root = %store.root().display(), "stored uploaded content");
        }
        Ok(_) => {}
        Err(e) if e.is_validation_failure() => {
            eprintln!("{}: invalid {name}\n  {e}", args.file.display());
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    }

    if args.print_payload {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    match snapshot.validate(name.as_str(), &payload) {
        Ok(()) => {}
        Err(SchemaError::ValidationFailed { violations, .. }) => {
            eprintln!(
                "{}: invalid {name} ({} violation(s))\n{violations}",
                args.file.display(),
                violations.len()
            );
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    }

    if description.unconstrained {
        println!("{}: accepted {name} (unconstrained type)", args.file.display());
        return Ok(0);
    }

    let views = match RelationView::collect(name.as_str(), description, &payload) {
        Ok(views) => views,
        Err(e) if e.is_validation_failure() => {
            eprintln!("{}: invalid {name}\n  {e}", args.file.display());
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}: valid {name}", args.file.display());
    for view in views {
        let cardinality = match view.cardinality {
            Cardinality::ZeroToOne => "0..1",
            Cardinality::ZeroToMany => "0..n",
        };
        println!("  {} [{cardinality}]", view.name);
        for entry in &view.entries {
            let target = match &entry.target {
                RelationTarget::Uuid(id) => id.to_string(),
                RelationTarget::Urn(urn) => urn.to_string(),
            };
            match entry.index {
                Some(index) => println!("    #{index} {target}"),
                None => println!("    {target}"),
            }
        }
    }
    Ok(0)
}
