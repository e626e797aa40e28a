//! Settings schema with serde support and versioned migration
//!
//! The snapshot is the single persisted record of client state: the
//! credential, the transcript, model selection, and presentation
//! preferences. Field names stay camelCase for compatibility with
//! snapshots written by earlier clients.

use super::secrets::SecretString;
use crate::protocol::Message;
use serde::{Deserialize, Serialize};

/// Current snapshot schema version
pub const CURRENT_VERSION: u32 = 2;

/// Model used when none has been selected
pub const DEFAULT_MODEL: &str = "deepseek-r1:0528";

/// System prompt used when none has been configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Generation budget used when none has been configured
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Presentation theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

/// Persisted client state
///
/// Version 1 snapshots predate per-user model/prompt configuration;
/// [`Settings::migrate`] lifts them to version 2 by filling defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Schema version (required - no default)
    pub version: u32,

    /// API credential; empty until the user supplies one
    #[serde(default)]
    pub api_key: SecretString,

    /// The conversation transcript
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Model ids the user added by hand
    #[serde(default)]
    pub custom_models: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,

    /// Zero-cost models surfaced by discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_models: Option<Vec<String>>,

    /// Set once a v1 snapshot has been lifted to v2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_to_v2: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            api_key: SecretString::default(),
            messages: Vec::new(),
            custom_models: Vec::new(),
            selected_model: None,
            system_prompt: None,
            max_tokens: None,
            theme: None,
            suggested_models: None,
            migrated_to_v2: None,
        }
    }
}

impl Settings {
    /// Lift a version-1 snapshot to the current schema
    ///
    /// Fills every field version 1 lacked with its default and marks the
    /// snapshot migrated. Snapshots already at the current version pass
    /// through untouched.
    pub fn migrate(mut self) -> Self {
        if self.version == 1 {
            self.version = CURRENT_VERSION;
            self.selected_model
                .get_or_insert_with(|| DEFAULT_MODEL.to_string());
            self.system_prompt
                .get_or_insert_with(|| DEFAULT_SYSTEM_PROMPT.to_string());
            self.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
            self.theme.get_or_insert(Theme::Dark);
            self.suggested_models.get_or_insert_with(Vec::new);
            self.migrated_to_v2 = Some(true);
        }
        self
    }

    /// The selected model, falling back to the default
    pub fn model(&self) -> &str {
        self.selected_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// The configured system prompt, falling back to the default
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// The configured generation budget, falling back to the default
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Drop the whole transcript (the only permitted deletion)
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }
}
