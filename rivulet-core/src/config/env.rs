//! Environment variable interpolation for configuration

use super::error::ConfigError;
use super::schema::Settings;
use super::secrets::SecretString;
use regex::Regex;
use std::env;

/// Interpolate environment variables in a configuration string
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let env_var_pattern = env_var_regex();
    let mut result = content.to_string();
    let mut missing_vars = Vec::new();

    // Find all environment variable references
    for cap in env_var_pattern.captures_iter(content) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let var_name = &cap[1];

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match.as_str(), &value);
            }
            Err(_) => {
                missing_vars.push(var_name.to_string());
            }
        }
    }

    // Report the first missing variable (to match the error type)
    if let Some(var) = missing_vars.first() {
        return Err(ConfigError::EnvVarNotFound { var: var.clone() });
    }

    Ok(result)
}

/// Interpolate environment variables in a Settings value after loading
///
/// Only the credential is targeted: a seed file may carry
/// `apiKey: ${OPENROUTER_API_KEY}` instead of the key itself.
pub fn interpolate_settings_env_vars(settings: &mut Settings) -> Result<(), ConfigError> {
    let env_var_pattern = env_var_regex();

    let api_key_str = settings.api_key.expose_secret();
    if env_var_pattern.is_match(api_key_str) {
        let interpolated = interpolate_env_vars(api_key_str)?;
        settings.api_key = SecretString::new(interpolated);
    }

    Ok(())
}

fn env_var_regex() -> Regex {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap()
}
