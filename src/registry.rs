//! Model and enum declarations collected from every resolved document.
//!
//! Models and enums share one namespace. The first declaration of a name wins;
//! later ones from other documents are ignored.

use serde_json::{Map, Value};
use tracing::debug;

use crate::emit::capitalize_first;
use crate::swagger::type_token;

const PRIMITIVE_TOKENS: &[&str] = &["string", "integer", "number", "boolean"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDecl {
    pub name: String,
    /// Property name and type token, in document order.
    pub properties: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Model(ModelDecl),
    Enum(EnumDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Model(m) => &m.name,
            Self::Enum(e) => &e.name,
        }
    }
}

#[derive(Debug, Default)]
pub struct ModelRegistry {
    declarations: Vec<Declaration>,
}

impl ModelRegistry {
    /// Registers every model of a document's `models` section.
    ///
    /// Enums found on properties are registered ahead of the model that uses
    /// them.
    pub fn register_models(&mut self, models: &Map<String, Value>) {
        for (name, model) in models {
            let properties = self.collect_properties(name, model);
            self.register_model(ModelDecl {
                name: name.clone(),
                properties,
            });
        }
    }

    fn collect_properties(&mut self, model: &str, value: &Value) -> Vec<(String, String)> {
        let Some(properties) = value.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut out = Vec::with_capacity(properties.len());
        for (property, spec) in properties {
            let Some(spec) = spec.as_object() else {
                out.push((property.clone(), "object".to_string()));
                continue;
            };
            let mut ty = type_token(spec);
            if let Some(values) = spec.get("enum").and_then(Value::as_array) {
                if PRIMITIVE_TOKENS.contains(&ty.as_str()) {
                    ty = format!("{}{}", capitalize_first(model), capitalize_first(property));
                }
                self.register_enum(EnumDecl {
                    name: ty.clone(),
                    values: values.iter().map(enum_literal).collect(),
                });
            }
            out.push((property.clone(), ty));
        }
        out
    }

    /// Returns false when the name was already declared.
    pub fn register_model(&mut self, model: ModelDecl) -> bool {
        self.register(Declaration::Model(model))
    }

    pub fn register_enum(&mut self, decl: EnumDecl) -> bool {
        self.register(Declaration::Enum(decl))
    }

    fn register(&mut self, decl: Declaration) -> bool {
        if self.contains(decl.name()) {
            debug!(name = decl.name(), "declaration already registered, keeping the first");
            return false;
        }
        self.declarations.push(decl);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.iter().any(|d| d.name() == name)
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Model(m) => Some(m),
            Declaration::Enum(_) => None,
        })
    }
}

fn enum_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
