//! Generic resource dictionary and its provider.

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use super::{
    ProviderError,
    TranslationDataProvider,
};

/// A flat, insertion-ordered key → value dictionary.
///
/// Values keep their original JSON type; providers coerce them to strings on read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceDictionary {
    entries: Vec<(String, Value)>,
    /// key → position in `entries`
    index: HashMap<String, usize>,
}

impl ResourceDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.index.get(&key).and_then(|&position| self.entries.get_mut(position))
        {
            entry.1 = value;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).and_then(|&position| self.entries.get(position)).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges another dictionary into this one. Later values win.
    pub fn merge(&mut self, other: Self) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Builds a dictionary from a JSON document, flattening nested objects.
    #[must_use]
    pub fn from_json(json: &Value, separator: &str) -> Self {
        flatten_json(json, separator, None).into_iter().collect()
    }

    /// Parses a JSON string into a dictionary.
    ///
    /// # Errors
    /// Returns error if the text is not valid JSON.
    pub fn from_json_str(text: &str, separator: &str) -> Result<Self, ProviderError> {
        let json: Value = serde_json::from_str(text)?;
        Ok(Self::from_json(&json, separator))
    }

    /// Loads a JSON locale file into a dictionary.
    ///
    /// # Errors
    /// Returns error if file read or JSON parse fails.
    pub fn from_path(path: &Path, separator: &str) -> Result<Self, ProviderError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content, separator)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ResourceDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dictionary = Self::new();
        for (key, value) in iter {
            dictionary.insert(key, value);
        }
        dictionary
    }
}

/// Flatten nested JSON object into separator-joined keys.
///
/// Scalars keep their JSON type. Arrays use `key[index]`.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use live_translations::provider::flatten_json;
///
/// let json = json!({
///     "common": {
///         "hello": "Hello",
///         "goodbye": "Goodbye"
///     }
/// });
///
/// let flattened = flatten_json(&json, ".", None);
/// assert_eq!(flattened[0], ("common.goodbye".to_string(), json!("Goodbye")));
/// assert_eq!(flattened[1], ("common.hello".to_string(), json!("Hello")));
/// ```
#[must_use]
pub fn flatten_json(json: &Value, separator: &str, prefix: Option<&str>) -> Vec<(String, Value)> {
    let mut result = Vec::new();
    flatten_json_value(json, separator, prefix, &mut result);
    result
}

fn flatten_json_value(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
    result: &mut Vec<(String, Value)>,
) {
    match json {
        Value::Object(map) => {
            for (key, value) in map {
                let full_key =
                    prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
                flatten_json_value(value, separator, Some(&full_key), result);
            }
        }
        Value::Array(arr) => {
            for (index, value) in arr.iter().enumerate() {
                let full_key =
                    prefix.map_or_else(|| format!("[{index}]"), |p| format!("{p}[{index}]"));
                flatten_json_value(value, separator, Some(&full_key), result);
            }
        }
        _ => {
            if let Some(key) = prefix {
                result.push((key.to_string(), json.clone()));
            }
        }
    }
}

/// Coerces a dictionary value to its string form.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads translations from a [`ResourceDictionary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceDictionaryProvider;

impl TranslationDataProvider for ResourceDictionaryProvider {
    fn name(&self) -> &'static str {
        "resource-dictionary"
    }

    fn get_keys(&self, resource: &dyn Any) -> Result<Vec<String>, ProviderError> {
        let Some(dictionary) = resource.downcast_ref::<ResourceDictionary>() else {
            return Ok(Vec::new());
        };

        Ok(dictionary.keys().map(str::to_string).collect())
    }

    fn read_translation_data(
        &self,
        resource: &dyn Any,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let Some(dictionary) = resource.downcast_ref::<ResourceDictionary>() else {
            return Ok(HashMap::new());
        };

        Ok(dictionary.iter().map(|(key, value)| (key.to_string(), value_to_string(value))).collect())
    }
}
