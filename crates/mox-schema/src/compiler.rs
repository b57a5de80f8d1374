//! # Schema Compiler
//!
//! Owns the current registry snapshot and memoizes generated documents and
//! compiled validators per snapshot.
//!
//! A registry mutation never edits a snapshot in place. It builds the
//! extended registry, wraps it in a fresh [`Snapshot`] with empty caches
//! and a bumped generation, and swaps the pointer under the write lock.
//! Callers holding the previous snapshot keep a consistent view until they
//! drop it, and nothing they cache can leak into the new generation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use mox_core::ObjectTypeName;
use mox_structure::{Extension, NameIndex, StructureRegistry};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::SchemaError;
use crate::generate::{SchemaGenerator, ValidationDocument};
use crate::validate;

/// An immutable registry view with its derived caches.
pub struct Snapshot {
    generation: u64,
    registry: StructureRegistry,
    index: NameIndex,
    documents: Mutex<HashMap<ObjectTypeName, Arc<ValidationDocument>>>,
    validators: Mutex<HashMap<ObjectTypeName, Arc<Validator>>>,
}

impl Snapshot {
    fn new(registry: StructureRegistry, generation: u64) -> Self {
        let index = NameIndex::build(&registry);
        Self {
            generation,
            registry,
            index,
            documents: Mutex::new(HashMap::new()),
            validators: Mutex::new(HashMap::new()),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn registry(&self) -> &StructureRegistry {
        &self.registry
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    /// Number of memoized documents.
    pub fn cached_documents(&self) -> usize {
        self.documents.lock().len()
    }

    /// The validation document for `object_type`, generated on first use.
    ///
    /// Generation runs outside the cache lock. If two callers race, the
    /// first inserted document wins and both receive it.
    pub fn document(&self, object_type: &str) -> Result<Arc<ValidationDocument>, SchemaError> {
        let name = ObjectTypeName::new(object_type);
        if let Some(doc) = self.documents.lock().get(&name) {
            tracing::debug!(object_type = %name, generation = self.generation, "schema cache hit");
            return Ok(Arc::clone(doc));
        }

        tracing::debug!(object_type = %name, generation = self.generation, "schema cache miss");
        let doc = Arc::new(SchemaGenerator::new(&self.registry).generate(name.as_str())?);
        let mut documents = self.documents.lock();
        Ok(Arc::clone(documents.entry(name).or_insert(doc)))
    }

    /// The compiled validator for `object_type`, built on first use.
    pub fn validator(&self, object_type: &str) -> Result<Arc<Validator>, SchemaError> {
        let name = ObjectTypeName::new(object_type);
        if let Some(validator) = self.validators.lock().get(&name) {
            return Ok(Arc::clone(validator));
        }

        let document = self.document(name.as_str())?;
        let validator = Arc::new(validate::compile(&document)?);
        let mut validators = self.validators.lock();
        Ok(Arc::clone(validators.entry(name).or_insert(validator)))
    }

    /// Validate a registration payload for `object_type`.
    pub fn validate(&self, object_type: &str, payload: &Value) -> Result<(), SchemaError> {
        let validator = self.validator(object_type)?;
        validate::check(&ObjectTypeName::new(object_type).to_string(), &validator, payload)
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("generation", &self.generation)
            .field("object_types", &self.registry.len())
            .field("cached_documents", &self.documents.lock().len())
            .field("cached_validators", &self.validators.lock().len())
            .finish()
    }
}

/// Entry point for schema generation and validation.
///
/// Safe to share across threads; wrap in an `Arc` for that.
#[derive(Debug)]
pub struct SchemaCompiler {
    current: RwLock<Arc<Snapshot>>,
}

impl SchemaCompiler {
    pub fn new(registry: StructureRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::new(registry, 0))),
        }
    }

    /// Compiler over the built-in structure document.
    pub fn builtin() -> Result<Self, SchemaError> {
        Ok(Self::new(StructureRegistry::builtin()?))
    }

    /// The current snapshot. Hold it for a consistent multi-step view.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read())
    }

    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Generate (or fetch) the document for `object_type`.
    pub fn generate(&self, object_type: &str) -> Result<Arc<ValidationDocument>, SchemaError> {
        self.snapshot().document(object_type)
    }

    /// Validate `payload` against the current document for `object_type`.
    pub fn validate(&self, object_type: &str, payload: &Value) -> Result<(), SchemaError> {
        self.snapshot().validate(object_type, payload)
    }

    /// Apply a registry extension and publish a new generation.
    ///
    /// On error the current snapshot is left untouched.
    pub fn mutate(&self, extension: &Extension) -> Result<u64, SchemaError> {
        let mut current = self.current.write();
        let registry = current.registry.extended(extension)?;
        let generation = current.generation + 1;
        *current = Arc::new(Snapshot::new(registry, generation));
        tracing::info!(
            generation,
            types = extension.types.len(),
            mode = ?extension.mode,
            "structure registry extended; schema caches reset"
        );
        Ok(generation)
    }

    /// Replace the whole registry and publish a new generation.
    pub fn replace_registry(&self, registry: StructureRegistry) -> u64 {
        let mut current = self.current.write();
        let generation = current.generation + 1;
        *current = Arc::new(Snapshot::new(registry, generation));
        tracing::info!(generation, "structure registry replaced; schema caches reset");
        generation
    }

    /// Drop all cached documents and validators without changing the
    /// registry.
    pub fn invalidate(&self) -> u64 {
        let mut current = self.current.write();
        let generation = current.generation + 1;
        *current = Arc::new(Snapshot::new(current.registry.clone(), generation));
        tracing::info!(generation, "schema caches invalidated");
        generation
    }
}
