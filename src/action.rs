use serde::Serialize;

/// What a command does to its subject, inferred from the operation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Read,
    Replace,
    Create,
    Delete,
}

impl Action {
    /// Maps a description-level method (`GET`, `PUT`, `POST`, `DELETE`) to an action.
    pub fn from_method(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Read),
            "PUT" => Some(Self::Replace),
            "POST" => Some(Self::Create),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            Self::Read => "GET",
            Self::Replace => "PUT",
            Self::Create => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// The shell verb used as the first half of a command name.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Read => "Get",
            Self::Replace => "Set",
            Self::Create => "Add",
            Self::Delete => "Remove",
        }
    }
}
