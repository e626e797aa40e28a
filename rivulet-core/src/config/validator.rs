//! Settings validation utilities

use super::error::{ValidationError, ValidationErrorKind};
use super::schema::{Settings, CURRENT_VERSION};
use crate::protocol::Role;
use regex::Regex;
use std::collections::HashSet;

/// Upper bound accepted for the generation budget
const MAX_TOKENS_CEILING: u32 = 131_072;

/// Settings validator with rules beyond what serde can express
pub struct SettingsValidator {
    /// Pattern for environment variable placeholders
    env_var_pattern: Regex,
    /// Pattern for sensitive field names
    sensitive_pattern: Regex,
}

impl Default for SettingsValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            env_var_pattern: Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap(),
            sensitive_pattern: Regex::new(r"(?i)(api_key|apikey|secret|token|password|credential)")
                .unwrap(),
        }
    }

    /// Validate a settings value
    pub fn validate(&self, settings: &Settings) -> Result<(), ValidationError> {
        self.validate_version(settings)?;
        self.validate_model_selection(settings)?;
        self.validate_max_tokens(settings)?;
        self.validate_custom_models(settings)?;
        self.validate_messages(settings)?;
        Ok(())
    }

    fn validate_version(&self, settings: &Settings) -> Result<(), ValidationError> {
        if settings.version == 0 || settings.version > CURRENT_VERSION {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::InvalidVersion {
                    expected: format!("1..={CURRENT_VERSION}"),
                    actual: settings.version.to_string(),
                },
            ));
        }
        Ok(())
    }

    fn validate_model_selection(&self, settings: &Settings) -> Result<(), ValidationError> {
        if let Some(model) = &settings.selected_model {
            if model.trim().is_empty() {
                return Err(ValidationError::invalid_value(
                    "selectedModel",
                    "a non-empty model id",
                    "an empty string",
                ));
            }
        }
        Ok(())
    }

    fn validate_max_tokens(&self, settings: &Settings) -> Result<(), ValidationError> {
        if let Some(max_tokens) = settings.max_tokens {
            if max_tokens == 0 || max_tokens > MAX_TOKENS_CEILING {
                return Err(ValidationError::out_of_range(
                    "maxTokens",
                    format!("must be between 1 and {MAX_TOKENS_CEILING}, got {max_tokens}"),
                ));
            }
        }
        Ok(())
    }

    fn validate_custom_models(&self, settings: &Settings) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for (i, model) in settings.custom_models.iter().enumerate() {
            if model.trim().is_empty() {
                return Err(ValidationError::required(format!("customModels[{i}]")));
            }
            if !seen.insert(model.as_str()) {
                return Err(ValidationError::new(
                    format!("customModels[{i}]"),
                    ValidationErrorKind::DuplicateValue {
                        value: model.clone(),
                    },
                ));
            }
        }
        Ok(())
    }

    /// The system prompt lives in its own field; a system message inside
    /// the stored transcript would be sent twice.
    fn validate_messages(&self, settings: &Settings) -> Result<(), ValidationError> {
        for (i, message) in settings.messages.iter().enumerate() {
            if message.role == Role::System {
                return Err(ValidationError::invalid_value(
                    format!("messages[{i}].role"),
                    "user or assistant",
                    "system",
                )
                .with_context("the system prompt is configured separately"));
            }
        }
        Ok(())
    }

    /// Check if a field name appears to contain sensitive information
    pub fn is_sensitive_field(&self, field_name: &str) -> bool {
        self.sensitive_pattern.is_match(field_name)
    }

    /// Extract environment variables from a string
    pub fn extract_env_vars(&self, text: &str) -> Vec<String> {
        self.env_var_pattern
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}
