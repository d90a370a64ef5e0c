//! Swagger 1.2 description documents.
//!
//! Documents are walked as `serde_json::Value` trees. Key order is preserved,
//! so models, properties and apis come out in document order.

use serde::Deserialize;
use serde_json::{Map, Value};
use url::{Position, Url};

use crate::error::GenerateError;
use crate::path::{BODY_PARAM, Parameter};

pub const SUPPORTED_VERSION: &str = "1.2";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDocument {
    #[serde(alias = "schemaVersion")]
    swagger_version: Option<Value>,
    base_path: Option<String>,
    #[serde(default)]
    pub models: Map<String, Value>,
    #[serde(default)]
    apis: Vec<Value>,
}

/// One entry of a document's `apis` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEntry {
    /// Points at another document to resolve.
    Reference { path: String },
    Endpoint {
        path: String,
        operations: Vec<OperationSpec>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    pub method: String,
    pub parameters: Vec<Parameter>,
}

impl ApiDocument {
    /// Parses `text` as JSON, falling back to YAML.
    pub fn parse(uri: &Url, text: &str) -> Result<Self, GenerateError> {
        match serde_json::from_str(text) {
            Ok(doc) => Ok(doc),
            Err(json_err) => serde_yaml::from_str(text).map_err(|_| GenerateError::MalformedDocument {
                uri: uri.to_string(),
                reason: json_err.to_string(),
            }),
        }
    }

    pub fn version(&self) -> Option<String> {
        match self.swagger_version.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn check_version(&self, uri: &Url) -> Result<(), GenerateError> {
        match self.version() {
            Some(v) if v == SUPPORTED_VERSION => Ok(()),
            found => Err(GenerateError::SchemaVersionMismatch {
                uri: uri.to_string(),
                found: found.unwrap_or_else(|| "<missing>".to_string()),
            }),
        }
    }

    /// `basePath` with `/` treated as empty.
    pub fn base_path(&self) -> &str {
        match self.base_path.as_deref() {
            Some("/") | None => "",
            Some(p) => p.trim_end_matches('/'),
        }
    }

    pub fn api_entries(&self, uri: &Url) -> Result<Vec<ApiEntry>, GenerateError> {
        let mut entries = Vec::with_capacity(self.apis.len());
        for api in &self.apis {
            let entry = parse_api_entry(api).ok_or_else(|| malformed(uri, "api entry without a path"))??;
            entries.push(entry);
        }
        Ok(entries)
    }
}

fn malformed(uri: &Url, reason: &str) -> GenerateError {
    GenerateError::MalformedDocument {
        uri: uri.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_api_entry(api: &Value) -> Option<Result<ApiEntry, GenerateError>> {
    let map = api.as_object()?;
    let path = map.get("path").and_then(Value::as_str)?.to_string();

    // anything without operations only points somewhere else
    let Some(operations) = map.get("operations") else {
        return Some(Ok(ApiEntry::Reference { path }));
    };

    let operations = operations
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|op| parse_operation(op, &path))
        .collect::<Result<Vec<_>, _>>();
    Some(operations.map(|operations| ApiEntry::Endpoint { path, operations }))
}

fn parse_operation(op: &Value, path: &str) -> Result<OperationSpec, GenerateError> {
    let method = op
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| GenerateError::UnsupportedMethod {
            method: "<missing>".to_string(),
            path: path.to_string(),
        })?
        .to_string();

    let parameters = op
        .get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(parse_parameter)
        .collect();

    Ok(OperationSpec { method, parameters })
}

fn parse_parameter(param: &Value) -> Option<Parameter> {
    let map = param.as_object()?;
    let is_body = map.get("paramType").and_then(Value::as_str) == Some("body");
    let name = if is_body {
        BODY_PARAM
    } else {
        map.get("name").and_then(Value::as_str)?
    };
    Some(Parameter::named(name, type_token(map)))
}

/// `type`, else `$ref`, else `object`.
pub(crate) fn type_token(map: &Map<String, Value>) -> String {
    map.get("type")
        .or_else(|| map.get("$ref"))
        .and_then(Value::as_str)
        .unwrap_or("object")
        .to_string()
}

/// Parses a document location given as a URL or a local path.
pub fn parse_document_uri(input: &str) -> Result<Url, GenerateError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(GenerateError::NullInputUri);
    }
    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => std::path::absolute(input)
            .ok()
            .and_then(|path| Url::from_file_path(path).ok())
            .ok_or_else(|| GenerateError::InvalidUri {
                uri: input.to_string(),
                source: url::ParseError::RelativeUrlWithoutBase,
            }),
        Err(source) => Err(GenerateError::InvalidUri {
            uri: input.to_string(),
            source,
        }),
    }
}

/// `scheme://host[:port]` of a document, used as the root of generated calls.
pub fn api_base(uri: &Url) -> String {
    uri[..Position::BeforePath].to_string()
}

pub fn is_http(uri: &Url) -> bool {
    matches!(uri.scheme(), "http" | "https")
}

/// Location of a referenced document: the stub path appended to the current
/// document's path.
pub fn sub_document_uri(current: &Url, stub_path: &str) -> Url {
    let mut next = current.clone();
    let leaf = format!(
        "{}/{}",
        current.path().trim_end_matches('/'),
        stub_path.trim_start_matches('/')
    );
    next.set_path(&leaf);
    next.set_query(None);
    next.set_fragment(None);
    next
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn uri() -> Url {
        Url::parse("http://api.example.com:8080/api-docs").unwrap()
    }

    #[test]
    fn parses_entries_in_document_order() {
        let doc = ApiDocument::parse(
            &uri(),
            r#"{
              "swaggerVersion": "1.2",
              "apis": [
                { "path": "/widgets" },
                { "path": "/gadgets", "description": "Gadget operations" },
                { "path": "/widgets/{widgetId}", "operations": [
                  { "method": "GET", "parameters": [
                    { "name": "expand", "type": "boolean", "paramType": "query" },
                    { "name": "payload", "type": "Widget", "paramType": "body" }
                  ] }
                ] }
              ]
            }"#,
        )
        .unwrap();
        doc.check_version(&uri()).unwrap();
        let entries = doc.api_entries(&uri()).unwrap();
        assert_eq!(
            entries,
            vec![
                ApiEntry::Reference { path: "/widgets".into() },
                ApiEntry::Reference { path: "/gadgets".into() },
                ApiEntry::Endpoint {
                    path: "/widgets/{widgetId}".into(),
                    operations: vec![OperationSpec {
                        method: "GET".into(),
                        parameters: vec![
                            Parameter::named("expand", "boolean"),
                            Parameter::named("body", "Widget"),
                        ],
                    }],
                },
            ]
        );
    }

    #[test]
    fn rejects_other_versions() {
        let doc = ApiDocument::parse(&uri(), r#"{"swaggerVersion": "2.0", "apis": []}"#).unwrap();
        assert!(matches!(
            doc.check_version(&uri()),
            Err(GenerateError::SchemaVersionMismatch { found, .. }) if found == "2.0"
        ));
        let doc = ApiDocument::parse(&uri(), r#"{"apis": []}"#).unwrap();
        assert!(matches!(
            doc.check_version(&uri()),
            Err(GenerateError::SchemaVersionMismatch { found, .. }) if found == "<missing>"
        ));
    }

    #[test]
    fn accepts_yaml_with_numeric_version() {
        let doc = ApiDocument::parse(&uri(), "swaggerVersion: 1.2\nbasePath: /\napis: []\n").unwrap();
        doc.check_version(&uri()).unwrap();
        assert_eq!(doc.base_path(), "");
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            ApiDocument::parse(&uri(), "{ not json"),
            Err(GenerateError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn entries_need_a_path() {
        let doc = ApiDocument::parse(&uri(), r#"{"swaggerVersion": "1.2", "apis": [{"description": "x"}]}"#)
            .unwrap();
        assert!(matches!(
            doc.api_entries(&uri()),
            Err(GenerateError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn operations_need_a_method() {
        let doc = ApiDocument::parse(
            &uri(),
            r#"{"swaggerVersion": "1.2", "apis": [{"path": "/w", "operations": [{}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            doc.api_entries(&uri()),
            Err(GenerateError::UnsupportedMethod { .. })
        ));
    }

    #[test]
    fn base_of_document_keeps_scheme_host_and_port() {
        assert_eq!(api_base(&uri()), "http://api.example.com:8080");
        let default_port = Url::parse("https://api.example.com:443/docs").unwrap();
        assert_eq!(api_base(&default_port), "https://api.example.com");
    }

    #[test]
    fn only_http_schemes_count_as_served() {
        assert!(is_http(&uri()));
        assert!(is_http(&Url::parse("https://h/docs").unwrap()));
        assert!(!is_http(&Url::parse("file:///srv/docs/api.json").unwrap()));
    }

    #[test]
    fn sub_documents_extend_the_current_path() {
        assert_eq!(
            sub_document_uri(&uri(), "/widgets").as_str(),
            "http://api.example.com:8080/api-docs/widgets"
        );
        let nested = Url::parse("http://h/api-docs/?format=json").unwrap();
        assert_eq!(sub_document_uri(&nested, "widgets").as_str(), "http://h/api-docs/widgets");
    }

    #[test]
    fn document_uris() {
        assert!(matches!(parse_document_uri("  "), Err(GenerateError::NullInputUri)));
        assert_eq!(parse_document_uri("http://h/x").unwrap().scheme(), "http");
        assert_eq!(parse_document_uri("docs/api.json").unwrap().scheme(), "file");
        assert!(matches!(
            parse_document_uri("http://[::1"),
            Err(GenerateError::InvalidUri { .. })
        ));
    }
}
