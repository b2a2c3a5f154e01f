//! Engine configuration and typed component settings

use crate::error::{ClientPolicyError, Result};
use client_policy_types::ComponentRecord;
use serde::{Deserialize, Serialize};

/// How a policy whose conditions all vote `NOT_APPLICABLE` is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbstentionMode {
    /// The policy stays active
    #[default]
    Active,

    /// The policy needs at least one `APPLICABLE` vote
    Inactive,
}

/// Engine-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// When off, `trigger` evaluates nothing
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub abstention: AbstentionMode,

    /// Include component names in error descriptions returned to callers
    #[serde(default)]
    pub expose_diagnostics: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            abstention: AbstentionMode::Active,
            expose_diagnostics: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from defaults, an optional file and `CLIENT_POLICY_*` variables
    pub fn load(path: Option<&str>) -> std::result::Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CLIENT_POLICY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Parse configuration from an inline TOML document layered over the defaults
    pub fn from_toml(document: &str) -> std::result::Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?)
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn with_abstention(mut self, abstention: AbstentionMode) -> Self {
        self.abstention = abstention;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_expose_diagnostics(mut self, expose: bool) -> Self {
        self.expose_diagnostics = expose;
        self
    }
}

/// Typed view over a component's multi-valued configuration
///
/// Decoding failures are reported as configuration errors naming the
/// component, so a malformed record fails when its policy is loaded.
pub(crate) struct ComponentSettings<'a> {
    record: &'a ComponentRecord,
}

impl<'a> ComponentSettings<'a> {
    pub(crate) fn new(record: &'a ComponentRecord) -> Self {
        Self { record }
    }

    /// Trimmed, non-empty values of a key
    pub(crate) fn list(&self, key: &str) -> Vec<String> {
        self.record
            .config
            .get(key)
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn first(&self, key: &str) -> Option<String> {
        self.record.config.get_first(key).map(str::to_string)
    }

    /// Boolean flag, `false` when absent
    pub(crate) fn flag(&self, key: &str) -> Result<bool> {
        match self.record.config.get_first(key) {
            None => Ok(false),
            Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
            Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
            Some(value) => Err(self.invalid(format!("{key} is not a boolean: {value}"))),
        }
    }

    pub(crate) fn invalid(&self, reason: impl Into<String>) -> ClientPolicyError {
        ClientPolicyError::configuration(&self.record.name, reason)
    }
}
