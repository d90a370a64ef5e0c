//! Generator configuration.
//!
//! Explicit values (usually CLI flags) take precedence; anything left unset
//! is filled from the environment.

use crate::types::TypeNormalizer;

pub const ENV_API_URL: &str = "SWAGGER_PWSH_API_URL";
pub const ENV_TOKEN: &str = "SWAGGER_PWSH_TOKEN";
pub const ENV_PASSTHROUGH_MODELS: &str = "SWAGGER_PWSH_PASSTHROUGH_MODELS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Inserted between verb and subject of every command name.
    pub cmdlet_prefix: String,
    /// Model names emitted as a generic object, on top of the built-in list.
    pub passthrough_models: Vec<String>,
    /// Replaces the `scheme://host:port` taken from the root document.
    pub api_base_override: Option<String>,
    /// Bearer token sent when fetching documents.
    pub auth_token: Option<String>,
    /// Extra headers sent when fetching documents.
    pub headers: Vec<(String, String)>,
}

impl GeneratorConfig {
    pub fn new(cmdlet_prefix: impl Into<String>) -> Self {
        Self {
            cmdlet_prefix: cmdlet_prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.api_base_override.is_none() {
            self.api_base_override = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty());
        }
        if self.auth_token.is_none() {
            self.auth_token = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty());
        }
        if let Some(models) = lookup(ENV_PASSTHROUGH_MODELS) {
            for model in split_list(&models) {
                if !self.passthrough_models.contains(&model) {
                    self.passthrough_models.push(model);
                }
            }
        }
        self
    }

    pub fn normalizer(&self) -> TypeNormalizer {
        TypeNormalizer::new(self.passthrough_models.iter().cloned())
    }
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Splits `NAME:VALUE` or `NAME=VALUE`.
pub fn split_key_value(value: &str) -> Option<(&str, &str)> {
    if let Some((k, v)) = value.split_once(':') {
        return Some((k.trim(), v.trim()));
    }
    if let Some((k, v)) = value.split_once('=') {
        return Some((k.trim(), v.trim()));
    }
    None
}
