//! Route descriptions supplied by the host's route discovery.
//!
//! Everything the generator needs to know about an action is resolved once
//! into these plain values; the generator never inspects handlers itself.

use serde_json::Value;
use swaggen_core::route::Operation;

use crate::types::{TypeCatalog, TypeId, TypeKind};

/// Where a parameter value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingSource {
    Query,
    Header,
    Path,
    Cookie,
    Body,
    Form,
    /// Bound by a custom binder; described as a query parameter
    Custom,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterDescription {
    pub name: String,
    pub source: Option<BindingSource>,
    /// Absent when no action parameter backs this description
    pub ty: Option<TypeId>,
    pub is_required: bool,
    /// Never bound, or hidden from documentation
    pub ignored: bool,
    pub default_value: Option<Value>,
    pub description: Option<String>,
}

impl ParameterDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_source(mut self, source: BindingSource) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn typed(mut self, ty: TypeId) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_from(&self, source: BindingSource) -> bool {
        self.source == Some(source)
    }

    /// Whether the parameter carries an uploaded file or a collection of them
    #[must_use]
    pub fn is_file_upload(&self, types: &TypeCatalog) -> bool {
        let Some(mut ty) = self.ty else {
            return false;
        };
        loop {
            match types.get(ty).kind {
                TypeKind::File => return true,
                TypeKind::Array(inner) | TypeKind::Set(inner) | TypeKind::Nullable(inner) => {
                    ty = inner;
                }
                _ => return false,
            }
        }
    }
}

/// One documented response of an action
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseType {
    pub status_code: u16,
    /// Describes every status code not listed explicitly
    pub is_default: bool,
    /// Content types the response can be produced in
    pub formats: Vec<String>,
    /// Payload type; absent for empty responses
    pub ty: Option<TypeId>,
}

impl ResponseType {
    #[must_use]
    pub const fn new(status_code: u16) -> Self {
        Self {
            status_code,
            is_default: false,
            formats: Vec::new(),
            ty: None,
        }
    }

    #[must_use]
    pub const fn default_response() -> Self {
        Self {
            status_code: 0,
            is_default: true,
            formats: Vec::new(),
            ty: None,
        }
    }

    #[must_use]
    pub fn typed(mut self, ty: TypeId) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn with_formats<'a>(mut self, formats: impl IntoIterator<Item = &'a str>) -> Self {
        self.formats = formats.into_iter().map(String::from).collect();
        self
    }

    /// Key of the response in an operation's `responses` map
    #[must_use]
    pub fn key(&self) -> String {
        if self.is_default {
            "default".to_string()
        } else {
            self.status_code.to_string()
        }
    }
}

/// Endpoint metadata resolved by route discovery
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointMetadata {
    pub route_name: Option<String>,
    pub endpoint_name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    /// Hidden from every document
    pub ignored: bool,
    /// Explicit request content types
    pub consumes: Option<Vec<String>>,
    /// Explicit response content types
    pub produces: Option<Vec<String>>,
    /// Hand-written operation used as the starting point
    pub operation: Option<Operation>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionDescriptor {
    /// Fully qualified identity, used in error messages
    pub id: String,
    /// Grouping construct the action belongs to; the default tag
    pub controller: Option<String>,
    pub metadata: EndpointMetadata,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDescription {
    pub group_name: Option<String>,
    pub http_method: Option<String>,
    /// Route template relative to the application root
    pub relative_path: String,
    pub parameters: Vec<ParameterDescription>,
    pub request_formats: Vec<String>,
    pub response_types: Vec<ResponseType>,
    pub action: ActionDescriptor,
}

impl RouteDescription {
    pub fn new(http_method: &str, relative_path: impl Into<String>) -> Self {
        Self {
            http_method: Some(http_method.to_string()),
            relative_path: relative_path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_action(mut self, id: impl Into<String>) -> Self {
        self.action.id = id.into();
        self
    }

    #[must_use]
    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.action.controller = Some(controller.into());
        self
    }

    #[must_use]
    pub fn in_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDescription) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: ResponseType) -> Self {
        self.response_types.push(response);
        self
    }

    #[must_use]
    pub fn with_request_formats<'a>(mut self, formats: impl IntoIterator<Item = &'a str>) -> Self {
        self.request_formats = formats.into_iter().map(String::from).collect();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: EndpointMetadata) -> Self {
        self.action.metadata = metadata;
        self
    }

    /// Body-bound parameter that supplies the request body, if any
    #[must_use]
    pub fn body_parameter(&self) -> Option<&ParameterDescription> {
        self.parameters
            .iter()
            .find(|p| p.is_from(BindingSource::Body) && !p.ignored)
    }

    /// Form-bound parameters merged into one request body
    pub fn form_parameters(&self) -> impl Iterator<Item = &ParameterDescription> {
        self.parameters
            .iter()
            .filter(|p| p.is_from(BindingSource::Form) && !p.ignored)
    }
}

/// Source of the routes and types a document is generated from
pub trait ApiDescriptionProvider: Send + Sync {
    fn types(&self) -> &TypeCatalog;

    /// Routes in discovery order
    fn routes(&self) -> &[RouteDescription];
}

/// In-memory route and type descriptions
#[derive(Debug, Clone, Default)]
pub struct ApiDescriptions {
    pub types: TypeCatalog,
    pub routes: Vec<RouteDescription>,
}

impl ApiDescriptions {
    #[must_use]
    pub fn new(types: TypeCatalog, routes: Vec<RouteDescription>) -> Self {
        Self { types, routes }
    }
}

impl ApiDescriptionProvider for ApiDescriptions {
    fn types(&self) -> &TypeCatalog {
        &self.types
    }

    fn routes(&self) -> &[RouteDescription] {
        &self.routes
    }
}
