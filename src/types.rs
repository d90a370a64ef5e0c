//! Description-level type tokens to host-safe type tokens.
//!
//! The table is applied at annotation sites only: bracket style (`[integer]`)
//! and declaration style (`public integer count;`). Tokens outside the table
//! are left exactly as they are.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Model names that have no declaration of their own and are passed through
/// as a generic object.
pub const DEFAULT_PASSTHROUGH_MODELS: &[&str] = &[
    "IvWorkspaceDataContext",
    "DmSystem",
    "Farm",
    "AuthenticationSettings",
    "ConnectionBrokers",
    "ConnectorSettings",
    "DisplaySettings",
    "Downloads",
    "GeneralSettings",
    "LocalResourceSettings",
    "MiscellaneousSettings",
    "ProxyServer",
    "UserExperienceSettings",
    "UserInterfaceText",
    "ApplicationType",
    "ServerType",
    "ClientType",
    "WebsiteSettings",
    "WebsiteStatus",
];

const PRIMITIVES: &[(&str, &str)] = &[
    ("boolean", "bool"),
    ("integer", "int"),
    ("Guid", "string"),
    ("array", "object"),
];

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?P<bracket>[A-Za-z_][A-Za-z0-9_]*)\]|\bpublic (?P<decl>[A-Za-z_][A-Za-z0-9_]*) ")
        .expect("annotation pattern is valid")
});

#[derive(Debug, Clone)]
pub struct TypeNormalizer {
    table: HashMap<String, String>,
}

impl Default for TypeNormalizer {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl TypeNormalizer {
    /// Builds the table from the fixed primitives, the built-in passthrough
    /// models and `extra_passthrough`.
    pub fn new<I, S>(extra_passthrough: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table: HashMap<String, String> = PRIMITIVES
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        for model in DEFAULT_PASSTHROUGH_MODELS {
            table.insert(model.to_string(), "object".to_string());
        }
        for model in extra_passthrough {
            table.insert(model.into(), "object".to_string());
        }
        Self { table }
    }

    pub fn normalize_token<'a>(&'a self, token: &'a str) -> &'a str {
        self.table.get(token).map(String::as_str).unwrap_or(token)
    }

    /// Rewrites every bracket and declaration annotation in `code`.
    pub fn normalize_source(&self, code: &str) -> String {
        ANNOTATION
            .replace_all(code, |caps: &Captures| {
                if let Some(token) = caps.name("bracket") {
                    format!("[{}]", self.normalize_token(token.as_str()))
                } else if let Some(token) = caps.name("decl") {
                    format!("public {} ", self.normalize_token(token.as_str()))
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }
}
