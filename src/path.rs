//! Path template decomposition.
//!
//! A path template is read right to left. Braced segments name parameters
//! and the bare segment to their left types them; the right-most bare segment
//! is the subject of the command.

use serde::Serialize;

/// Name of the entry that carries the subject in a parameter sequence.
pub const NOUN_MARKER: &str = "noun";
/// Name of the request body parameter.
pub const BODY_PARAM: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ParamType {
    Named(String),
    /// Presence-only flag.
    Switch,
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Switch => "SwitchParam",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ty: ParamType,
}

impl Parameter {
    pub fn named(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Named(ty.into()),
        }
    }

    pub fn switch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Switch,
        }
    }

    fn subject(noun: &str) -> Self {
        Self::named(NOUN_MARKER, noun)
    }

    pub fn is_subject_marker(&self) -> bool {
        self.name == NOUN_MARKER
    }

    pub fn is_body(&self) -> bool {
        self.name == BODY_PARAM
    }

    pub fn is_switch(&self) -> bool {
        self.ty == ParamType::Switch
    }
}

/// Result of decomposing a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedPath {
    subject: String,
    entries: Vec<Parameter>,
}

impl DecomposedPath {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Subject marker first, then parameters in the order they were resolved.
    pub fn entries(&self) -> &[Parameter] {
        &self.entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Beginning,
    LookingForParameterName,
    LookingForParameterType,
}

/// Decomposes `path` into its subject and typed parameters.
///
/// Returns `None` when the path has no bare segment to act as a subject.
/// Two placeholders in a row cannot be typed from the path alone; the second
/// one is dropped. A placeholder name that repeats keeps only the occurrence
/// nearest the subject.
pub fn decompose(path: &str) -> Option<DecomposedPath> {
    let mut entries: Vec<Parameter> = Vec::new();
    let mut pending: Option<&str> = None;
    let mut state = ScanState::Beginning;

    for segment in path.split('/').filter(|s| !s.is_empty()).rev() {
        match (placeholder_name(segment), state) {
            // a trailing placeholder is typed by the subject, so keep scanning for it
            (Some(name), ScanState::Beginning) => pending = Some(name),
            (Some(name), ScanState::LookingForParameterName) => {
                pending = Some(name);
                state = ScanState::LookingForParameterType;
            }
            (Some(_), ScanState::LookingForParameterType) => {}
            (None, ScanState::Beginning) => {
                entries.push(Parameter::subject(segment));
                if let Some(name) = pending.take() {
                    push_unique(&mut entries, Parameter::named(name, segment));
                }
                state = ScanState::LookingForParameterName;
            }
            (None, ScanState::LookingForParameterType) => {
                if let Some(name) = pending.take() {
                    push_unique(&mut entries, Parameter::named(name, segment));
                }
                state = ScanState::LookingForParameterName;
            }
            (None, ScanState::LookingForParameterName) => {
                // two bare segments right after the subject: the first was a filter keyword
                if entries.len() == 1 {
                    let keyword = entries[0].ty.as_str().to_string();
                    entries.clear();
                    entries.push(Parameter::subject(segment));
                    entries.push(Parameter::switch(keyword));
                }
            }
        }
    }

    let subject = entries.first()?.ty.as_str().to_string();
    Some(DecomposedPath { subject, entries })
}

// a name resolved closer to the subject wins; later repeats are dropped
fn push_unique(entries: &mut Vec<Parameter>, param: Parameter) {
    if !entries.iter().any(|p| p.name == param.name) {
        entries.push(param);
    }
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
