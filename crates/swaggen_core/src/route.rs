//! Route-related structure definitions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{SchemaRef, SecurityRequirement};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Every supported method, in path item field order
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
            Self::Head => write!(f, "HEAD"),
            Self::Options => write!(f, "OPTIONS"),
            Self::Trace => write!(f, "TRACE"),
        }
    }
}

impl TryFrom<&str> for HttpMethod {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            other => Err(format!("unknown HTTP method: {other}")),
        }
    }
}

/// Parameter location in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// Serialization style of a parameter or multipart field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    Matrix,
    Label,
    Form,
    Simple,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

/// Parameter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub r#in: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// Schema reference or inline schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    /// Specification extensions (`x-*` keys)
    #[serde(flatten)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl Parameter {
    /// Create a parameter without schema
    #[must_use]
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            r#in: location,
            description: None,
            required: None,
            deprecated: None,
            schema: None,
            example: None,
            extensions: IndexMap::new(),
        }
    }
}

/// Request body definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Schema per Content-Type
    pub content: IndexMap<String, MediaType>,
    /// Specification extensions (`x-*` keys)
    #[serde(flatten)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

/// Media type definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaType {
    /// Schema reference or inline schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Example>,
    /// Per-property encoding of multipart and form bodies
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub encoding: IndexMap<String, Encoding>,
}

impl MediaType {
    #[must_use]
    pub fn with_schema(schema: SchemaRef) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }
}

/// Encoding of a single multipart/form property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,
}

/// Example definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Response definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,
    /// Schema per Content-Type
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    /// Specification extensions (`x-*` keys)
    #[serde(flatten)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

/// Header definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
}

/// `OpenAPI` Operation definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID (unique identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Response definitions (status code or `default` -> Response)
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Specification extensions (`x-*` keys)
    #[serde(flatten)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

/// Path Item definition (all HTTP methods for a specific path)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// Parameters shared by every operation of the path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Set an operation for a specific HTTP method
    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) {
        *self.slot_mut(method) = Some(operation);
    }

    /// Get an operation for a specific HTTP method
    #[must_use]
    pub const fn get_operation(&self, method: &HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    pub fn get_operation_mut(&mut self, method: HttpMethod) -> Option<&mut Operation> {
        self.slot_mut(method).as_mut()
    }

    /// Defined operations, in path item field order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(|method| self.get_operation(&method).map(|op| (method, op)))
    }

    /// Mutable access to every defined operation
    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        [
            &mut self.get,
            &mut self.put,
            &mut self.post,
            &mut self.delete,
            &mut self.options,
            &mut self.head,
            &mut self.patch,
            &mut self.trace,
        ]
        .into_iter()
        .filter_map(Option::as_mut)
    }

    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Trace => &mut self.trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn operation(id: &str) -> Operation {
        Operation {
            operation_id: Some(id.to_string()),
            ..Operation::default()
        }
    }

    #[rstest]
    #[case("GET", HttpMethod::Get)]
    #[case("get", HttpMethod::Get)]
    #[case("Post", HttpMethod::Post)]
    #[case("put", HttpMethod::Put)]
    #[case("PATCH", HttpMethod::Patch)]
    #[case("delete", HttpMethod::Delete)]
    #[case("HEAD", HttpMethod::Head)]
    #[case("Options", HttpMethod::Options)]
    #[case("trace", HttpMethod::Trace)]
    fn test_http_method_from_str(#[case] input: &str, #[case] expected: HttpMethod) {
        let result = HttpMethod::try_from(input).unwrap();
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case("CONNECT")]
    #[case("INVALID")]
    #[case("")]
    fn test_http_method_from_invalid_str(#[case] input: &str) {
        assert!(HttpMethod::try_from(input).is_err());
    }

    #[rstest]
    #[case(HttpMethod::Get, "GET")]
    #[case(HttpMethod::Post, "POST")]
    #[case(HttpMethod::Put, "PUT")]
    #[case(HttpMethod::Patch, "PATCH")]
    #[case(HttpMethod::Delete, "DELETE")]
    #[case(HttpMethod::Head, "HEAD")]
    #[case(HttpMethod::Options, "OPTIONS")]
    #[case(HttpMethod::Trace, "TRACE")]
    fn test_http_method_display(#[case] method: HttpMethod, #[case] expected: &str) {
        assert_eq!(method.to_string(), expected);
        let serialized = serde_json::to_string(&method).unwrap();
        assert_eq!(serialized, format!("\"{expected}\""));
    }

    #[test]
    fn test_path_item_set_operation_overwrites() {
        let mut path_item = PathItem::default();

        path_item.set_operation(HttpMethod::Get, operation("first"));
        path_item.set_operation(HttpMethod::Get, operation("second"));

        assert_eq!(
            path_item.get.as_ref().unwrap().operation_id,
            Some("second".to_string())
        );
    }

    #[test]
    fn test_path_item_get_operation() {
        let mut path_item = PathItem::default();
        assert!(path_item.get_operation(&HttpMethod::Get).is_none());

        for method in HttpMethod::ALL {
            path_item.set_operation(method, operation(&method.to_string()));
        }

        for method in HttpMethod::ALL {
            let retrieved = path_item.get_operation(&method).unwrap();
            assert_eq!(retrieved.operation_id, Some(method.to_string()));
        }
    }

    #[test]
    fn test_path_item_operations_in_field_order() {
        let mut path_item = PathItem::default();
        path_item.set_operation(HttpMethod::Post, operation("create"));
        path_item.set_operation(HttpMethod::Get, operation("list"));

        let methods: Vec<_> = path_item.operations().map(|(m, _)| m).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);

        for op in path_item.operations_mut() {
            op.deprecated = Some(true);
        }
        assert_eq!(path_item.post.unwrap().deprecated, Some(true));
    }

    #[test]
    fn test_operation_always_serializes_responses() {
        let json = serde_json::to_string(&Operation::default()).unwrap();
        assert_eq!(json, r#"{"responses":{}}"#);
    }

    #[test]
    fn test_media_type_encoding_serialization() {
        let mut media_type = MediaType::default();
        media_type.encoding.insert(
            "file".to_string(),
            Encoding {
                style: Some(ParameterStyle::Form),
                ..Encoding::default()
            },
        );
        let json = serde_json::to_string(&media_type).unwrap();
        assert_eq!(json, r#"{"encoding":{"file":{"style":"form"}}}"#);
    }

    #[test]
    fn test_parameter_extensions_round_trip() {
        let mut parameter = Parameter::new("id", ParameterLocation::Path);
        parameter.required = Some(true);
        parameter
            .extensions
            .insert("x-docName".to_string(), serde_json::json!("v1"));

        let json = serde_json::to_string(&parameter).unwrap();
        assert_eq!(json, r#"{"name":"id","in":"path","required":true,"x-docName":"v1"}"#);

        let parsed: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, parameter);
    }
}
