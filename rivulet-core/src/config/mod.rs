//! Configuration and persistence for the chat client
//!
//! Two entry points: a seed configuration file (YAML or JSON, with
//! `${ENV_VAR}` interpolation so the credential can stay out of the file)
//! and the [`SnapshotStore`], which durably persists the full client state
//! between sessions.

mod env;
mod error;
mod schema;
mod secrets;
mod store;
mod validator;

pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{
    Settings, Theme, CURRENT_VERSION, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
};
pub use secrets::SecretString;
pub use store::{SnapshotStore, SNAPSHOT_FILE};
pub use validator::SettingsValidator;

use std::fs;
use std::path::Path;

/// Load settings from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<Settings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let settings: Settings =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    finish_load(settings)
}

/// Load settings from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<Settings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let settings: Settings =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    finish_load(settings)
}

/// Shared tail of both loaders: interpolate, migrate, validate
fn finish_load(mut settings: Settings) -> ConfigResult<Settings> {
    env::interpolate_settings_env_vars(&mut settings)?;
    let settings = settings.migrate();

    let validator = SettingsValidator::new();
    validator.validate(&settings)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: 2
apiKey: ""
messages: []
customModels:
  - deepseek/deepseek-r1
selectedModel: deepseek/deepseek-r1
systemPrompt: You are a helpful assistant.
maxTokens: 4096
theme: dark
"#;
        let settings: Result<Settings, _> = serde_yaml::from_str(yaml);
        assert!(settings.is_ok());
    }
}
