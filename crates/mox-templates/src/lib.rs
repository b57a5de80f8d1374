//! # mox-templates — Template Projection
//!
//! Renders persistence code for every registered object type from a fixed,
//! ordered list of templates. Each (object type, template) pair gets a
//! [`ProjectionContext`] derived from the structure registry; the run
//! emits object types in sorted order and templates in declaration order,
//! so the output is byte-for-byte reproducible.
//!
//! Templates are Handlebars files embedded in the crate. A directory of
//! `*.sql.hbs` files can override or extend them at runtime.
//!
//! ## Crate Policy
//!
//! - Rendering is a pure function of the registry snapshot and the
//!   template set; no I/O except when loading a template directory or
//!   writing to a caller-supplied sink.
//! - Output is never HTML-escaped.

pub mod catalog;
pub mod context;
pub mod engine;
pub mod error;
pub mod options;

pub use catalog::{TEMPLATES, TEMPLATE_EXTENSION};
pub use context::ProjectionContext;
pub use engine::TemplateEngine;
pub use error::TemplateError;
pub use options::{TemplateOptions, EMPTY_MIXIN};
