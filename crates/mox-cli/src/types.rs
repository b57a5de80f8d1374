//! # Types Subcommand
//!
//! Lists registered object types and shows one description with the names
//! derived from it.

use anyhow::Result;
use clap::{Args, Subcommand};
use mox_schema::SchemaCompiler;
use mox_structure::FieldScope;

#[derive(Args, Debug)]
pub struct TypesArgs {
    #[command(subcommand)]
    pub command: Option<TypesCommand>,
}

#[derive(Subcommand, Debug)]
pub enum TypesCommand {
    /// List registered object types (default).
    List,

    /// Show the description of one object type.
    Describe {
        /// Object type name (case-insensitive).
        object_type: String,
    },
}

pub fn run_types(args: &TypesArgs, compiler: &SchemaCompiler) -> Result<u8> {
    match &args.command {
        None | Some(TypesCommand::List) => list(compiler),
        Some(TypesCommand::Describe { object_type }) => describe(compiler, object_type),
    }
}

fn list(compiler: &SchemaCompiler) -> Result<u8> {
    let snapshot = compiler.snapshot();
    for (name, description) in snapshot.registry().iter() {
        let marker = if description.unconstrained { "  (unconstrained)" } else { "" };
        println!("{name}{marker}");
    }
    Ok(0)
}

fn describe(compiler: &SchemaCompiler, object_type: &str) -> Result<u8> {
    let snapshot = compiler.snapshot();
    let registry = snapshot.registry();
    let index = snapshot.index();
    let (name, description) = registry.entry(object_type)?;

    println!("{}", serde_yaml::to_string(description)?.trim_end());
    println!();
    println!("attribute names: {}", index.attribute_names(name.as_str())?.join(", "));
    println!("state names:     {}", index.state_names(name.as_str())?.join(", "));
    println!("relation names:  {}", index.relation_names(name.as_str())?.join(", "));

    let resolver = registry.resolver(name.as_str())?;
    for group in description.attributes.keys() {
        let mandatory = resolver.mandatory_fields(FieldScope::Attribute(group));
        if !mandatory.is_empty() {
            println!("mandatory in {name}{group}: {}", mandatory.join(", "));
        }
    }
    Ok(0)
}
