//! # mox-core — Foundational Types for the Object Registry
//!
//! Shared primitives used by every other `mox-*` crate. This crate depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Normalized object-type names.** [`ObjectTypeName`] lower-cases on
//!    construction, so `"Organisation"` and `"organisation"` are the same
//!    registry key everywhere.
//!
//! 2. **Dual addressing as a closed union.** A relation target is either a
//!    [`uuid::Uuid`] or a [`Urn`], never both, expressed by
//!    [`RelationTarget`].
//!
//! 3. **Every time-varying entry carries a [`Virkning`].** The validity
//!    interval always has `from` and `to`; everything else is optional.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mox-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod relation;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::{MoxError, UnknownTypeError};
pub use identity::{ObjectTypeName, Urn};
pub use relation::{RelationEntry, RelationTarget};
pub use temporal::{TimeBound, Virkning};
