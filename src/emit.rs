//! PowerShell source emission.
//!
//! Each emitted construct is a small builder implementing [`Emit`]. Layout is
//! fixed here; which parameters, branches and calls exist is decided by the
//! aggregator and the registry.

use url::Url;

use crate::action::Action;
use crate::command_tree::CommandDescriptor;
use crate::registry::{Declaration, EnumDecl, ModelDecl};

const INDENT: &str = "    ";

/// Trait for emitting PowerShell source from builder nodes.
pub trait Emit {
    fn emit(&self) -> String;
}

/// A `param(...)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: String,
    pub mandatory: bool,
    pub parameter_sets: Vec<String>,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            mandatory: false,
            parameter_sets: Vec::new(),
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn in_sets(mut self, sets: Vec<String>) -> Self {
        self.parameter_sets = sets;
        self
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.mandatory {
            lines.push("[Parameter(Mandatory=$true)]".to_string());
        }
        for set in &self.parameter_sets {
            lines.push(format!("[Parameter(ParameterSetName='{set}')]"));
        }
        lines.push(format!("[{}]${}", self.ty, self.name));
        lines
    }
}

/// One `Invoke-RestMethod` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestCall {
    pub uri: String,
    pub method: &'static str,
    pub with_body: bool,
}

impl RestCall {
    pub fn for_descriptor(base_uri: &str, descriptor: &CommandDescriptor) -> Self {
        Self {
            uri: request_uri(base_uri, &descriptor.endpoint),
            method: descriptor.action.method(),
            with_body: descriptor.has_body(),
        }
    }
}

impl Emit for RestCall {
    fn emit(&self) -> String {
        let mut line = format!(
            "$response = Invoke-RestMethod -Uri \"{}\" -Method {} -ContentType 'application/json' -Headers @{{accept=\"Application/JSON\";Authorization=\"Token\" + $global:AuthToken.Token}}",
            self.uri, self.method
        );
        if self.with_body {
            line.push_str(" -Body $($body | ConvertTo-JSON)");
        }
        line
    }
}

/// Base URI joined with an endpoint template whose `{name}` placeholders
/// become variable references. An absolute endpoint replaces the base.
pub fn request_uri(base_uri: &str, endpoint: &str) -> String {
    let absolute = Url::parse(endpoint).is_ok();
    let endpoint = endpoint.replace('{', "$($").replace('}', ")");
    if absolute {
        return endpoint;
    }
    format!(
        "{}/{}",
        base_uri.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    NotNull(String),
    Present(String),
}

impl Emit for Condition {
    fn emit(&self) -> String {
        match self {
            Self::NotNull(name) => format!("($(${name}) -ne $null)"),
            Self::Present(name) => format!("(${name}.IsPresent)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub conditions: Vec<Condition>,
    pub call: RestCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Call(RestCall),
    /// Conditional branches in order, then the unconditional default.
    Dispatch {
        branches: Vec<Branch>,
        default: Option<RestCall>,
    },
    Construct {
        type_name: String,
        fields: Vec<String>,
    },
}

impl Body {
    fn lines(&self) -> Vec<String> {
        match self {
            Self::Call(call) => vec![call.emit(), "$response".to_string()],
            Self::Dispatch { branches, default } => {
                let mut lines = Vec::new();
                for (idx, branch) in branches.iter().enumerate() {
                    let keyword = if idx == 0 { "if" } else { "elseif" };
                    let test = branch
                        .conditions
                        .iter()
                        .map(Emit::emit)
                        .collect::<Vec<_>>()
                        .join(" -and ");
                    lines.push(format!("{keyword} ({test})"));
                    push_block(&mut lines, &branch.call);
                }
                match default {
                    Some(call) if branches.is_empty() => lines.push(call.emit()),
                    Some(call) => {
                        lines.push("else".to_string());
                        push_block(&mut lines, call);
                    }
                    None => {}
                }
                lines.push("$response".to_string());
                lines
            }
            Self::Construct { type_name, fields } => {
                let mut lines = vec![format!("$obj = New-Object {type_name};")];
                lines.extend(fields.iter().map(|f| format!("$obj.{f} = ${f};")));
                lines.push("$obj".to_string());
                lines
            }
        }
    }
}

fn push_block(lines: &mut Vec<String>, call: &RestCall) {
    lines.push("{".to_string());
    lines.push(format!("{INDENT}{}", call.emit()));
    lines.push("}".to_string());
}

/// A `function` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub body: Body,
}

impl Emit for Function {
    fn emit(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| {
                p.lines()
                    .iter()
                    .map(|l| format!("{INDENT}{INDENT}{l}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join(",\n");

        let mut out = format!("function {}\n{{\n{INDENT}param(", self.name);
        if !params.is_empty() {
            out.push('\n');
            out.push_str(&params);
        }
        out.push_str(&format!("\n{INDENT})\n{INDENT}Begin\n{INDENT}{{\n"));
        for line in self.body.lines() {
            out.push_str(&format!("{INDENT}{INDENT}{line}\n"));
        }
        out.push_str(&format!("{INDENT}}}\n}}\n"));
        out
    }
}

/// `New-<Prefix><Model>` helper that builds an instance of a declared model.
pub fn constructor(prefix: &str, model: &ModelDecl) -> Function {
    Function {
        name: format!("New-{prefix}{}", model.name),
        params: model
            .properties
            .iter()
            .map(|(name, ty)| ParamDecl::new(name, ty))
            .collect(),
        body: Body::Construct {
            type_name: model.name.clone(),
            fields: model.properties.iter().map(|(name, _)| name.clone()).collect(),
        },
    }
}

impl Emit for ModelDecl {
    fn emit(&self) -> String {
        let mut out = format!("Add-Type -Language CSharp @\"\n{INDENT}public class {}{{\n", self.name);
        for (name, ty) in &self.properties {
            out.push_str(&format!("{INDENT}{INDENT}public {ty} {name};\n"));
        }
        out.push_str(&format!("{INDENT}}}\n\"@\n"));
        out
    }
}

impl Emit for EnumDecl {
    fn emit(&self) -> String {
        let values = self.values.join(&format!(",\n{INDENT}{INDENT}"));
        format!(
            "Add-Type -Language CSharp @\"\n{INDENT}public enum {}\n{INDENT}{{\n{INDENT}{INDENT}{values}\n{INDENT}}}\n\"@\n",
            self.name
        )
    }
}

impl Emit for Declaration {
    fn emit(&self) -> String {
        match self {
            Self::Model(m) => m.emit(),
            Self::Enum(e) => e.emit(),
        }
    }
}

/// Joins emitted pieces with one blank line between them.
pub fn assemble<'a, I>(pieces: I) -> String
where
    I: IntoIterator<Item = &'a dyn Emit>,
{
    pieces
        .into_iter()
        .map(Emit::emit)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `<Verb>-<Prefix><Subject>`.
pub fn command_name(action: Action, prefix: &str, subject: &str) -> String {
    format!("{}-{prefix}{}", action.verb(), capitalize_first(subject))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn call(uri: &str) -> RestCall {
        RestCall {
            uri: uri.to_string(),
            method: "GET",
            with_body: false,
        }
    }

    #[test]
    fn test_request_uri() {
        assert_eq!(request_uri("http://h:8080", "/widgets"), "http://h:8080/widgets");
        assert_eq!(
            request_uri("http://h/", "/farms/{farmId}/desktops"),
            "http://h/farms/$($farmId)/desktops"
        );
    }

    #[test]
    fn test_request_uri_with_absolute_endpoint() {
        assert_eq!(
            request_uri("http://h", "http://petstore.example.com/api/pet/{petId}"),
            "http://petstore.example.com/api/pet/$($petId)"
        );
    }

    #[test]
    fn test_emit_rest_call_with_body() {
        let c = RestCall {
            uri: "http://h/widgets".into(),
            method: "POST",
            with_body: true,
        };
        assert_eq!(
            c.emit(),
            "$response = Invoke-RestMethod -Uri \"http://h/widgets\" -Method POST -ContentType 'application/json' -Headers @{accept=\"Application/JSON\";Authorization=\"Token\" + $global:AuthToken.Token} -Body $($body | ConvertTo-JSON)"
        );
    }

    #[test]
    fn test_emit_param_decl() {
        let p = ParamDecl::new("widgetId", "object").in_sets(vec!["a".into(), "b".into()]);
        assert_eq!(
            p.lines(),
            vec![
                "[Parameter(ParameterSetName='a')]",
                "[Parameter(ParameterSetName='b')]",
                "[object]$widgetId",
            ]
        );
        assert_eq!(
            ParamDecl::new("body", "Widget").mandatory().lines(),
            vec!["[Parameter(Mandatory=$true)]", "[Widget]$body"]
        );
    }

    #[test]
    fn test_emit_direct_function() {
        let f = Function {
            name: "Get-XWidgets".into(),
            params: vec![ParamDecl::new("widgetId", "object").mandatory()],
            body: Body::Call(call("http://h/widgets/$($widgetId)")),
        };
        let expected = format!(
            "function Get-XWidgets\n{{\n    param(\n        [Parameter(Mandatory=$true)]\n        [object]$widgetId\n    )\n    Begin\n    {{\n        {}\n        $response\n    }}\n}}\n",
            call("http://h/widgets/$($widgetId)").emit()
        );
        assert_eq!(f.emit(), expected);
    }

    #[test]
    fn test_emit_function_without_params() {
        let f = Function {
            name: "Get-XWidgets".into(),
            params: vec![],
            body: Body::Call(call("http://h/widgets")),
        };
        assert!(f.emit().starts_with("function Get-XWidgets\n{\n    param(\n    )\n    Begin\n"));
    }

    #[test]
    fn test_emit_dispatch() {
        let body = Body::Dispatch {
            branches: vec![
                Branch {
                    conditions: vec![Condition::NotNull("widgetId".into())],
                    call: call("by-id"),
                },
                Branch {
                    conditions: vec![Condition::NotNull("a".into()), Condition::Present("b".into())],
                    call: call("both"),
                },
            ],
            default: Some(call("all")),
        };
        let lines = body.lines();
        assert_eq!(lines[0], "if (($($widgetId) -ne $null))");
        assert_eq!(lines[4], "elseif (($($a) -ne $null) -and ($b.IsPresent))");
        assert_eq!(lines[8], "else");
        assert_eq!(lines[10], format!("    {}", call("all").emit()));
        assert_eq!(lines.last().unwrap(), "$response");
    }

    #[test]
    fn test_emit_dispatch_with_only_default() {
        let body = Body::Dispatch {
            branches: vec![],
            default: Some(call("all")),
        };
        assert_eq!(body.lines(), vec![call("all").emit(), "$response".to_string()]);
    }

    #[test]
    fn test_emit_model_and_enum() {
        let model = ModelDecl {
            name: "Widget".into(),
            properties: vec![("id".into(), "integer".into()), ("name".into(), "string".into())],
        };
        assert_eq!(
            model.emit(),
            "Add-Type -Language CSharp @\"\n    public class Widget{\n        public integer id;\n        public string name;\n    }\n\"@\n"
        );
        let e = EnumDecl {
            name: "Color".into(),
            values: vec!["red".into(), "green".into()],
        };
        assert_eq!(
            e.emit(),
            "Add-Type -Language CSharp @\"\n    public enum Color\n    {\n        red,\n        green\n    }\n\"@\n"
        );
    }

    #[test]
    fn test_emit_constructor() {
        let model = ModelDecl {
            name: "Widget".into(),
            properties: vec![("id".into(), "integer".into())],
        };
        assert_eq!(
            constructor("X", &model).emit(),
            "function New-XWidget\n{\n    param(\n        [integer]$id\n    )\n    Begin\n    {\n        $obj = New-Object Widget;\n        $obj.id = $id;\n        $obj\n    }\n}\n"
        );
    }

    #[test]
    fn test_assemble_separates_with_blank_lines() {
        let a = EnumDecl { name: "A".into(), values: vec!["x".into()] };
        let b = EnumDecl { name: "B".into(), values: vec!["y".into()] };
        let text = assemble([&a as &dyn Emit, &b as &dyn Emit]);
        assert!(text.contains("\"@\n\nAdd-Type"));
    }

    #[test]
    fn test_command_name() {
        assert_eq!(command_name(Action::Read, "Ras", "widgets"), "Get-RasWidgets");
        assert_eq!(command_name(Action::Delete, "", "w"), "Remove-W");
        assert_eq!(capitalize_first(""), "");
    }
}
