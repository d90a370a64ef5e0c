use serde::Serialize;

use crate::action::Action;
use crate::aggregate::AggregationGroup;
use crate::emit::command_name;
use crate::error::GenerateError;
use crate::path::{DecomposedPath, ParamType, Parameter};
use crate::swagger::OperationSpec;

/// One inferred command before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    pub action: Action,
    pub subject: String,
    pub endpoint: String,
    /// Subject marker first, then path parameters, then declared parameters.
    pub parameters: Vec<Parameter>,
    pub parameter_set_name: String,
}

impl CommandDescriptor {
    pub fn has_body(&self) -> bool {
        self.parameters.iter().any(Parameter::is_body)
    }
}

/// Builds the descriptor for one operation declared at `endpoint`.
///
/// Declared parameters follow the path-derived ones; a declared parameter
/// already named by the path is not repeated.
pub fn classify_operation(
    path: &DecomposedPath,
    endpoint: &str,
    operation: &OperationSpec,
) -> Result<CommandDescriptor, GenerateError> {
    let action = Action::from_method(&operation.method).ok_or_else(|| GenerateError::UnsupportedMethod {
        method: operation.method.clone(),
        path: endpoint.to_string(),
    })?;

    let mut parameters = path.entries().to_vec();
    for declared in &operation.parameters {
        if !parameters.iter().any(|p| p.name == declared.name) {
            parameters.push(declared.clone());
        }
    }

    let subject = path.subject().to_string();
    let parameter_set_name = parameter_set_name(&parameters, &subject);
    Ok(CommandDescriptor {
        action,
        subject,
        endpoint: endpoint.to_string(),
        parameters,
        parameter_set_name,
    })
}

/// Names the way a descriptor reaches its subject, from its first entries.
pub fn parameter_set_name(parameters: &[Parameter], subject: &str) -> String {
    if let Some(second) = parameters.get(1) {
        match &second.ty {
            ParamType::Named(ty) if ty == subject => {
                let by_id = format!("{subject}byID");
                return match parameters.get(2) {
                    Some(third) => format!("{}{by_id}", third.ty.as_str()),
                    None => by_id,
                };
            }
            ParamType::Switch => return second.name.clone(),
            ParamType::Named(_) => {}
        }
    }
    format!("all{subject}")
}

/// Serializable view of the merged commands, for inspection.
#[derive(Debug, Serialize, Clone)]
pub struct CommandTree {
    pub base_uri: String,
    pub commands: Vec<CommandEntry>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CommandEntry {
    pub name: String,
    pub action: Action,
    pub subject: String,
    pub members: Vec<CommandDescriptor>,
}

impl CommandTree {
    pub fn from_groups(base_uri: &str, prefix: &str, groups: &[AggregationGroup<'_>]) -> Self {
        let commands = groups
            .iter()
            .map(|group| CommandEntry {
                name: command_name(group.action, prefix, group.subject),
                action: group.action,
                subject: group.subject.to_string(),
                members: group.members.iter().map(|d| (*d).clone()).collect(),
            })
            .collect();
        Self {
            base_uri: base_uri.to_string(),
            commands,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::path::decompose;

    fn op(method: &str, parameters: Vec<Parameter>) -> OperationSpec {
        OperationSpec {
            method: method.to_string(),
            parameters,
        }
    }

    fn classify(path: &str, operation: &OperationSpec) -> CommandDescriptor {
        classify_operation(&decompose(path).unwrap(), path, operation).unwrap()
    }

    #[test]
    fn bulk_access() {
        let d = classify("/widgets", &op("GET", vec![]));
        assert_eq!(d.action, Action::Read);
        assert_eq!(d.subject, "widgets");
        assert_eq!(d.parameter_set_name, "allwidgets");
        assert!(!d.has_body());
    }

    #[test]
    fn access_by_identifier() {
        let d = classify("/widgets/{widgetId}", &op("DELETE", vec![]));
        assert_eq!(d.action, Action::Delete);
        assert_eq!(d.parameter_set_name, "widgetsbyID");
    }

    #[test]
    fn compound_identifier_is_prefixed_by_parent_type() {
        let d = classify("/farms/{farmId}/desktops/{desktopId}", &op("GET", vec![]));
        assert_eq!(d.parameter_set_name, "farmsdesktopsbyID");
    }

    #[test]
    fn switch_names_its_own_set() {
        let d = classify("/widgets/active", &op("GET", vec![]));
        assert_eq!(d.parameter_set_name, "active");
    }

    #[test]
    fn parent_identifier_is_bulk_access() {
        let d = classify("/farms/{farmId}/desktops", &op("GET", vec![]));
        assert_eq!(d.parameter_set_name, "alldesktops");
    }

    #[test]
    fn declared_parameters_follow_path_parameters() {
        let d = classify(
            "/widgets/{widgetId}",
            &op(
                "PUT",
                vec![
                    Parameter::named("widgetId", "string"),
                    Parameter::named("body", "Widget"),
                ],
            ),
        );
        assert_eq!(d.action, Action::Replace);
        assert_eq!(
            d.parameters,
            vec![
                Parameter::named("noun", "widgets"),
                Parameter::named("widgetId", "widgets"),
                Parameter::named("body", "Widget"),
            ]
        );
        assert!(d.has_body());
    }

    #[test]
    fn declared_parameter_can_complete_a_set_name() {
        let d = classify("/widgets", &op("GET", vec![Parameter::named("owner", "widgets")]));
        assert_eq!(d.parameter_set_name, "widgetsbyID");
    }

    #[test]
    fn unsupported_method_is_fatal() {
        let err = classify_operation(&decompose("/widgets").unwrap(), "/widgets", &op("PATCH", vec![]))
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedMethod { method, .. } if method == "PATCH"));
    }
}
