use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::group::{
    NAMESPACE_SEPARATOR,
    PATH_SEPARATOR,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "namespaces.acme")
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
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorSettings {
    /// Directory under the app root holding the custom overrides.
    pub custom_lang_directory_name: String,

    /// Write a `.gitignore` ignoring everything into a freshly created
    /// custom directory.
    pub add_gitignore_to_custom_lang_directory: bool,

    /// Persist group files as nested arrays instead of flat dotted keys.
    pub group_keys_in_array: bool,

    /// Group name standing for the per-locale JSON file.
    pub json_group: String,

    /// Directory under the app root holding the default translations.
    pub lang_directory_name: String,

    /// Namespaces to register on the loader chain, name to hint path.
    pub namespaces: BTreeMap<String, PathBuf>,
}

impl TranslatorSettings {
    /// # Errors
    /// - Required field is empty
    /// - Custom and default directories are the same
    /// - JSON group collides with the group syntax
    /// - Invalid namespace name
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (field_path, value) in [
            ("custom_lang_directory_name", &self.custom_lang_directory_name),
            ("lang_directory_name", &self.lang_directory_name),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::new(
                    field_path,
                    "The directory name cannot be empty. Example: \"lang\"",
                ));
            }
        }

        if !self.lang_directory_name.is_empty()
            && self.custom_lang_directory_name == self.lang_directory_name
        {
            errors.push(ValidationError::new(
                "custom_lang_directory_name",
                format!(
                    "The custom directory must differ from the default directory '{}'",
                    self.lang_directory_name
                ),
            ));
        }

        if self.json_group.is_empty() {
            errors.push(ValidationError::new(
                "json_group",
                "The group name cannot be empty. Example: \"json-file\"",
            ));
        } else if self.json_group.contains(NAMESPACE_SEPARATOR)
            || self.json_group.contains(PATH_SEPARATOR)
        {
            errors.push(ValidationError::new(
                "json_group",
                format!(
                    "Invalid group name '{}': it cannot contain '{NAMESPACE_SEPARATOR}' or '{PATH_SEPARATOR}'",
                    self.json_group
                ),
            ));
        }

        for namespace in self.namespaces.keys() {
            if namespace.is_empty() || namespace.contains(NAMESPACE_SEPARATOR) {
                errors.push(ValidationError::new(
                    format!("namespaces.{namespace}"),
                    format!(
                        "Invalid namespace '{namespace}': it must be non-empty and cannot contain '{NAMESPACE_SEPARATOR}'"
                    ),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            custom_lang_directory_name: "lang-custom".to_string(),
            add_gitignore_to_custom_lang_directory: true,
            group_keys_in_array: false,
            json_group: "json-file".to_string(),
            lang_directory_name: "lang".to_string(),
            namespaces: BTreeMap::new(),
        }
    }
}
