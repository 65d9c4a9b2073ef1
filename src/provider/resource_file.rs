//! Resource file container and its provider.

use std::any::Any;
use std::collections::HashMap;
use std::fs::File;
use std::io::{
    BufReader,
    Read,
};
use std::path::Path;

use serde_json::Value;

use super::{
    ProviderError,
    TranslationDataProvider,
};

/// A typed entry inside a resource file.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEntry {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    /// Embedded blob (images, nested documents, ...).
    Binary(Vec<u8>),
    Null,
}

impl From<Value> for ResourceEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::String(s),
            Value::Number(n) => Self::Number(n),
            Value::Bool(b) => Self::Boolean(b),
            Value::Null => Self::Null,
            other => Self::Binary(other.to_string().into_bytes()),
        }
    }
}

impl From<&str> for ResourceEntry {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ResourceEntry {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Enumerates the entries of a resource file.
///
/// The reader holds its entries until [`close`](Self::close) is called;
/// after that enumeration fails with [`ProviderError::ReaderClosed`].
#[derive(Debug, Clone, Default)]
pub struct ResourceReader {
    entries: Option<Vec<(String, ResourceEntry)>>,
}

impl ResourceReader {
    /// Creates an open reader over in-memory entries.
    pub fn from_entries<K, E, I>(entries: I) -> Self
    where
        K: Into<String>,
        E: Into<ResourceEntry>,
        I: IntoIterator<Item = (K, E)>,
    {
        Self { entries: Some(entries.into_iter().map(|(k, e)| (k.into(), e.into())).collect()) }
    }

    /// Reads a JSON resource file (a single top-level object).
    ///
    /// # Errors
    /// Returns error if the stream cannot be read or is not a JSON object.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProviderError> {
        let json: Value = serde_json::from_reader(reader)?;
        let Value::Object(map) = json else {
            return Err(ProviderError::Other("Resource file must contain a JSON object".into()));
        };

        Ok(Self::from_entries(map))
    }

    /// Opens a resource file from disk.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or parsed.
    pub fn open(path: &Path) -> Result<Self, ProviderError> {
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "Opened resource file");
        Self::from_reader(BufReader::new(file))
    }

    /// Iterates over every entry in file order.
    ///
    /// # Errors
    /// Returns [`ProviderError::ReaderClosed`] once the reader is closed.
    pub fn entries(&self) -> Result<impl Iterator<Item = (&str, &ResourceEntry)>, ProviderError> {
        let entries = self.entries.as_ref().ok_or(ProviderError::ReaderClosed)?;
        Ok(entries.iter().map(|(k, e)| (k.as_str(), e)))
    }

    /// Releases the entries held by this reader.
    pub fn close(&mut self) {
        self.entries = None;
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.entries.is_none()
    }
}

/// Reads translations from a [`ResourceReader`], keeping string entries only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceFileProvider;

impl TranslationDataProvider for ResourceFileProvider {
    fn name(&self) -> &'static str {
        "resource-file"
    }

    fn get_keys(&self, resource: &dyn Any) -> Result<Vec<String>, ProviderError> {
        let Some(reader) = resource.downcast_ref::<ResourceReader>() else {
            return Ok(Vec::new());
        };

        Ok(reader
            .entries()?
            .filter(|(_, entry)| matches!(entry, ResourceEntry::String(_)))
            .map(|(key, _)| key.to_string())
            .collect())
    }

    fn read_translation_data(
        &self,
        resource: &dyn Any,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let Some(reader) = resource.downcast_ref::<ResourceReader>() else {
            return Ok(HashMap::new());
        };

        Ok(reader
            .entries()?
            .filter_map(|(key, entry)| match entry {
                ResourceEntry::String(value) => Some((key.to_string(), value.clone())),
                _ => None,
            })
            .collect())
    }
}
