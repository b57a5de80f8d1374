//! # Content References
//!
//! Document variants carry their payload as a URL in the `indhold` field.
//! On write operations a `field:<name>` URL names an upload attached to
//! the same request; the upload is handed to a [`ContentStore`] and the
//! reference is rewritten to the URL the store returns. Reads and any
//! other URL scheme pass through untouched.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Payload field holding a content URL.
pub const CONTENT_FIELD: &str = "indhold";

/// Scheme naming an upload attached to the current request.
pub const UPLOAD_SCHEME: &str = "field";

/// Scheme of URLs returned by [`FileContentStore`].
pub const STORE_SCHEME: &str = "store";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("content URL {url:?} is malformed: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("content URL {url:?} references upload {field:?}, which is not present in the request")]
    MissingUpload { url: String, field: String },

    #[error("content store failed: {0}")]
    Store(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    /// Malformed URLs and missing uploads are the caller's fault.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::MissingUpload { .. })
    }
}

/// Whether the request reads or writes registry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// A file uploaded alongside a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            ..Self::default()
        }
    }
}

/// Persists uploaded content and returns a URL for it.
pub trait ContentStore: Send + Sync {
    fn store(&self, upload: &Upload) -> Result<String, ContentError>;
}

/// Stores uploads below a root directory, bucketed by hour.
#[derive(Debug, Clone)]
pub struct FileContentStore {
    root: PathBuf,
}

impl FileContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `YYYY/MM/DD/HH/<uuid>.bin`
    pub fn relative_path(at: DateTime<Utc>, id: Uuid) -> String {
        format!("{}/{id}.bin", at.format("%Y/%m/%d/%H"))
    }

    /// Filesystem location of a URL previously returned by [`store`].
    ///
    /// [`store`]: ContentStore::store
    pub fn locate(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(STORE_SCHEME)?.strip_prefix(':')?;
        if relative.split('/').any(|part| part == ".." || part.is_empty()) {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ContentStore for FileContentStore {
    fn store(&self, upload: &Upload) -> Result<String, ContentError> {
        let relative = Self::relative_path(Utc::now(), Uuid::new_v4());
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &upload.bytes)?;
        tracing::debug!(path = %path.display(), bytes = upload.bytes.len(), "stored upload");
        Ok(format!("{STORE_SCHEME}:{relative}"))
    }
}

/// Rewrites content references for one request.
pub struct ContentResolver<'a> {
    store: &'a dyn ContentStore,
    uploads: &'a HashMap<String, Upload>,
    operation: Operation,
}

impl<'a> ContentResolver<'a> {
    pub fn new(
        store: &'a dyn ContentStore,
        uploads: &'a HashMap<String, Upload>,
        operation: Operation,
    ) -> Self {
        Self {
            store,
            uploads,
            operation,
        }
    }

    /// Resolve one content URL.
    ///
    /// # Errors
    ///
    /// [`ContentError::InvalidUrl`] for malformed URLs and
    /// [`ContentError::MissingUpload`] when a `field:` reference names an
    /// upload the request does not carry.
    pub fn resolve(&self, value: &str) -> Result<String, ContentError> {
        if self.operation == Operation::Read || value.is_empty() {
            return Ok(value.to_string());
        }

        let url = Url::parse(value).map_err(|e| ContentError::InvalidUrl {
            url: value.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != UPLOAD_SCHEME {
            return Ok(value.to_string());
        }

        let field = url.path();
        let upload = self
            .uploads
            .get(field)
            .ok_or_else(|| ContentError::MissingUpload {
                url: value.to_string(),
                field: field.to_string(),
            })?;
        self.store.store(upload)
    }

    /// Resolve every `indhold` string in `payload`, at any depth.
    ///
    /// Returns the number of references rewritten.
    pub fn resolve_payload(&self, payload: &mut Value) -> Result<usize, ContentError> {
        match payload {
            Value::Object(map) => {
                let mut rewritten = 0;
                for (key, value) in map.iter_mut() {
                    match value {
                        Value::String(url) if key == CONTENT_FIELD => {
                            let resolved = self.resolve(url)?;
                            if resolved != *url {
                                *url = resolved;
                                rewritten += 1;
                            }
                        }
                        other => rewritten += self.resolve_payload(other)?,
                    }
                }
                Ok(rewritten)
            }
            Value::Array(items) => items
                .iter_mut()
                .try_fold(0, |acc, item| Ok(acc + self.resolve_payload(item)?)),
            _ => Ok(0),
        }
    }
}
