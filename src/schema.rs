//! Schema subscription requests.
//!
//! A subscription replaces the full set of schemas governing the client's
//! data. Any schema registered earlier and missing from the new set is
//! deleted together with its data, so a [`SchemaSet`] must always be built
//! from the complete desired set.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Suffix of schema-definition files.
pub const SCHEMA_SUFFIX: &str = ".proto";

/// A complete, non-empty set of schema definitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SubscribeWire", into = "SubscribeWire")]
pub struct SchemaSet {
    api_key: String,
    schemas: Vec<String>,
}

impl SchemaSet {
    /// Reads every schema file found under `directories`.
    ///
    /// File contents are sent verbatim.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if a directory or file cannot be read, and the
    /// errors of [`build_subscription`] otherwise.
    pub fn from_directories<P: AsRef<Path>>(
        api_key: impl Into<String>,
        directories: impl IntoIterator<Item = P>,
    ) -> Result<Self> {
        let mut schemas = Vec::new();
        for directory in directories {
            for path in list_files(directory.as_ref(), SCHEMA_SUFFIX)? {
                let text = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
                schemas.push(text);
            }
        }

        if schemas.is_empty() {
            warn!("No schema files found; refusing to build an empty subscription");
        }

        build_subscription(api_key, schemas)
    }

    /// API key sent with the subscription.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Raw schema texts.
    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Always false for a built set.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Builds a subscription from schema texts.
///
/// # Errors
/// - [`Error::InvalidArgument`] if `api_key` is empty.
/// - [`Error::MalformedQuery`] if `schema_texts` is empty: an empty
///   subscription would delete every registered schema.
pub fn build_subscription(
    api_key: impl Into<String>,
    schema_texts: impl IntoIterator<Item = String>,
) -> Result<SchemaSet> {
    let api_key = api_key.into();
    if api_key.is_empty() {
        return Err(Error::InvalidArgument("API key cannot be empty".to_string()));
    }

    let schemas: Vec<_> = schema_texts.into_iter().collect();
    if schemas.is_empty() {
        return Err(Error::MalformedQuery(
            "Subscription has no schemas and would delete every registered schema".to_string(),
        ));
    }

    debug!(schemas = schemas.len(), "Built schema subscription");

    Ok(SchemaSet { api_key, schemas })
}

/// Lists regular files below `root` whose names end with `suffix`, recursing
/// into subdirectories. Paths are returned sorted.
///
/// # Errors
/// Returns [`Error::Io`] if `root` is not a readable directory, and
/// [`Error::InvalidArgument`] if it is not valid UTF-8.
pub fn list_files(root: impl AsRef<Path>, suffix: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::io(
            root,
            io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let root_str = root
        .to_str()
        .ok_or_else(|| Error::InvalidArgument(format!("Path {} is not UTF-8", root.display())))?;
    let pattern = format!(
        "{}/**/*{}",
        glob::Pattern::escape(root_str),
        glob::Pattern::escape(suffix)
    );

    let entries = glob::glob(&pattern)
        .map_err(|e| Error::InvalidArgument(format!("Invalid search pattern: {e}")))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::io(path, e.into_error())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    debug!(root = %root.display(), files = files.len(), "Discovered schema files");
    Ok(files)
}

#[derive(Clone, Serialize, Deserialize)]
struct SubscribeWire {
    api_key: String,
    schemas: Vec<String>,
}

impl TryFrom<SubscribeWire> for SchemaSet {
    type Error = Error;

    fn try_from(wire: SubscribeWire) -> Result<Self> {
        build_subscription(wire.api_key, wire.schemas)
    }
}

impl From<SchemaSet> for SubscribeWire {
    fn from(set: SchemaSet) -> Self {
        Self {
            api_key: set.api_key,
            schemas: set.schemas,
        }
    }
}
