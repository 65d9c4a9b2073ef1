use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::catalog::KeyPolicy;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "localeFiles.includePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    pub locale_files: LocaleFilesConfig,

    /// Separator used when flattening nested locale files.
    pub key_separator: String,

    pub key_policy: KeyPolicy,

    /// Culture whose locale file is the key contract.
    pub contract_culture: String,

    /// Also register the contract culture as a selectable translation.
    pub register_contract: bool,

    /// Culture selected after loading. Falls back to `contract_culture`.
    pub default_culture: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocaleFilesConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for LocaleFilesConfig {
    fn default() -> Self {
        Self {
            include_patterns: vec!["**/{locales,messages,i18n}/**/*.json".to_string()],
            exclude_patterns: vec!["node_modules/**".to_string(), "target/**".to_string()],
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            locale_files: LocaleFilesConfig::default(),
            key_separator: ".".to_string(),
            key_policy: KeyPolicy::Strict,
            contract_culture: "en".to_string(),
            register_contract: true,
            default_culture: None,
        }
    }
}

impl CatalogSettings {
    /// Culture to select once loading finishes.
    #[must_use]
    pub fn startup_culture(&self) -> &str {
        self.default_culture.as_deref().unwrap_or(&self.contract_culture)
    }

    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if self.contract_culture.trim().is_empty() {
            errors.push(ValidationError::new(
                "contractCulture",
                "The contract culture cannot be empty. Example: \"en\"",
            ));
        }

        if let Some(culture) = &self.default_culture
            && culture.trim().is_empty()
        {
            errors.push(ValidationError::new(
                "defaultCulture",
                "The default culture cannot be empty. Please specify a culture, or remove this field",
            ));
        }

        if self.locale_files.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "localeFiles.includePatterns",
                "At least one pattern is required. Example: [\"**/locales/*.json\"]",
            ));
        }

        for (index, pattern) in self.locale_files.include_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("localeFiles.includePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        for (index, pattern) in self.locale_files.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("localeFiles.excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
