//! Generator configuration.
//!
//! Options are plain data plus shared closures; once a [`SwaggerGenerator`] is
//! built from them they are never mutated, so one generator can serve
//! concurrent requests for different documents.
//!
//! [`SwaggerGenerator`]: crate::openapi_generator::SwaggerGenerator

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use swaggen_core::openapi::{Info, Server};
use swaggen_core::schema::{Schema, SecurityRequirement, SecurityScheme};

use crate::description::RouteDescription;
use crate::filters::{
    AsyncDocumentFilter, AsyncOperationFilter, AsyncParameterFilter, AsyncRequestBodyFilter,
    DocumentFilter, FilterEntry, OperationFilter, ParameterFilter, RequestBodyFilter,
    SchemaFilter,
};
use crate::identity::default_schema_id;
use crate::types::{TypeHandle, TypeId};

pub type DocInclusionPredicate = Arc<dyn Fn(&str, &RouteDescription) -> bool + Send + Sync>;
pub type ConflictingActionsResolver =
    Arc<dyn Fn(&[&RouteDescription]) -> RouteDescription + Send + Sync>;
pub type OperationIdSelector = Arc<dyn Fn(&RouteDescription) -> Option<String> + Send + Sync>;
pub type TagsSelector = Arc<dyn Fn(&RouteDescription) -> Vec<String> + Send + Sync>;
pub type SortKeySelector = Arc<dyn Fn(&RouteDescription) -> String + Send + Sync>;
pub type SchemaComparer = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;
pub type SecuritySchemesSelector =
    Arc<dyn Fn(&[String]) -> IndexMap<String, SecurityScheme> + Send + Sync>;

pub type SchemaFactory = Arc<dyn Fn() -> Schema + Send + Sync>;
pub type SchemaIdSelector = Arc<dyn Fn(TypeHandle<'_>) -> String + Send + Sync>;
pub type SubTypesSelector = Arc<dyn Fn(TypeHandle<'_>) -> Vec<TypeId> + Send + Sync>;
pub type DiscriminatorSelector = Arc<dyn Fn(TypeHandle<'_>) -> Option<String> + Send + Sync>;

/// Options of the type -> schema mapping
#[derive(Clone)]
pub struct SchemaGeneratorOptions {
    pub custom_type_mappings: HashMap<TypeId, SchemaFactory>,
    pub use_inline_definitions_for_enums: bool,
    pub schema_id_selector: SchemaIdSelector,
    pub ignore_obsolete_properties: bool,
    pub use_all_of_for_inheritance: bool,
    pub use_one_of_for_polymorphism: bool,
    pub sub_types_selector: SubTypesSelector,
    pub discriminator_name_selector: DiscriminatorSelector,
    pub discriminator_value_selector: DiscriminatorSelector,
    pub use_all_of_to_extend_reference_schemas: bool,
    pub support_non_nullable_reference_types: bool,
    pub non_nullable_reference_types_as_required: bool,
    pub schema_filters: Vec<Arc<dyn SchemaFilter>>,
}

impl Default for SchemaGeneratorOptions {
    fn default() -> Self {
        Self {
            custom_type_mappings: HashMap::new(),
            use_inline_definitions_for_enums: false,
            schema_id_selector: Arc::new(default_schema_id),
            ignore_obsolete_properties: false,
            use_all_of_for_inheritance: false,
            use_one_of_for_polymorphism: false,
            sub_types_selector: Arc::new(|ty: TypeHandle<'_>| ty.catalog().subtypes_of(ty.id())),
            discriminator_name_selector: Arc::new(|_: TypeHandle<'_>| None),
            discriminator_value_selector: Arc::new(|_: TypeHandle<'_>| None),
            use_all_of_to_extend_reference_schemas: false,
            support_non_nullable_reference_types: false,
            non_nullable_reference_types_as_required: false,
            schema_filters: Vec::new(),
        }
    }
}

impl SchemaGeneratorOptions {
    /// Always describe `ty` with the schema produced by `factory`
    #[must_use]
    pub fn map_type<F>(mut self, ty: TypeId, factory: F) -> Self
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        self.custom_type_mappings.insert(ty, Arc::new(factory));
        self
    }

    #[must_use]
    pub fn use_inline_definitions_for_enums(mut self) -> Self {
        self.use_inline_definitions_for_enums = true;
        self
    }

    #[must_use]
    pub fn custom_schema_ids<F>(mut self, selector: F) -> Self
    where
        F: Fn(TypeHandle<'_>) -> String + Send + Sync + 'static,
    {
        self.schema_id_selector = Arc::new(selector);
        self
    }

    #[must_use]
    pub fn ignore_obsolete_properties(mut self) -> Self {
        self.ignore_obsolete_properties = true;
        self
    }

    #[must_use]
    pub fn use_all_of_for_inheritance(mut self) -> Self {
        self.use_all_of_for_inheritance = true;
        self
    }

    #[must_use]
    pub fn use_one_of_for_polymorphism(mut self) -> Self {
        self.use_one_of_for_polymorphism = true;
        self
    }

    #[must_use]
    pub fn select_sub_types_using<F>(mut self, selector: F) -> Self
    where
        F: Fn(TypeHandle<'_>) -> Vec<TypeId> + Send + Sync + 'static,
    {
        self.sub_types_selector = Arc::new(selector);
        self
    }

    #[must_use]
    pub fn select_discriminator_name_using<F>(mut self, selector: F) -> Self
    where
        F: Fn(TypeHandle<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.discriminator_name_selector = Arc::new(selector);
        self
    }

    #[must_use]
    pub fn select_discriminator_value_using<F>(mut self, selector: F) -> Self
    where
        F: Fn(TypeHandle<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.discriminator_value_selector = Arc::new(selector);
        self
    }

    #[must_use]
    pub fn use_all_of_to_extend_reference_schemas(mut self) -> Self {
        self.use_all_of_to_extend_reference_schemas = true;
        self
    }

    #[must_use]
    pub fn support_non_nullable_reference_types(mut self) -> Self {
        self.support_non_nullable_reference_types = true;
        self
    }

    #[must_use]
    pub fn non_nullable_reference_types_as_required(mut self) -> Self {
        self.non_nullable_reference_types_as_required = true;
        self
    }

    #[must_use]
    pub fn schema_filter(mut self, filter: impl SchemaFilter + 'static) -> Self {
        self.schema_filters.push(Arc::new(filter));
        self
    }
}

impl fmt::Debug for SchemaGeneratorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaGeneratorOptions")
            .field("custom_type_mappings", &self.custom_type_mappings.len())
            .field(
                "use_inline_definitions_for_enums",
                &self.use_inline_definitions_for_enums,
            )
            .field("ignore_obsolete_properties", &self.ignore_obsolete_properties)
            .field("use_all_of_for_inheritance", &self.use_all_of_for_inheritance)
            .field("use_one_of_for_polymorphism", &self.use_one_of_for_polymorphism)
            .field(
                "use_all_of_to_extend_reference_schemas",
                &self.use_all_of_to_extend_reference_schemas,
            )
            .field(
                "support_non_nullable_reference_types",
                &self.support_non_nullable_reference_types,
            )
            .field(
                "non_nullable_reference_types_as_required",
                &self.non_nullable_reference_types_as_required,
            )
            .field("schema_filters", &self.schema_filters.len())
            .finish_non_exhaustive()
    }
}

pub type ParameterFilterEntry = FilterEntry<dyn ParameterFilter, dyn AsyncParameterFilter>;
pub type RequestBodyFilterEntry = FilterEntry<dyn RequestBodyFilter, dyn AsyncRequestBodyFilter>;
pub type OperationFilterEntry = FilterEntry<dyn OperationFilter, dyn AsyncOperationFilter>;
pub type DocumentFilterEntry = FilterEntry<dyn DocumentFilter, dyn AsyncDocumentFilter>;

/// Options of route selection and document assembly
#[derive(Clone)]
pub struct GeneratorOptions {
    /// Document name -> info block, in registration order
    pub documents: IndexMap<String, Info>,
    pub doc_inclusion_predicate: DocInclusionPredicate,
    pub ignore_obsolete_actions: bool,
    pub conflicting_actions_resolver: Option<ConflictingActionsResolver>,
    pub operation_id_selector: OperationIdSelector,
    pub tags_selector: Option<TagsSelector>,
    pub sort_key_selector: Option<SortKeySelector>,
    pub schema_comparer: Option<SchemaComparer>,
    pub describe_all_parameters_in_camel_case: bool,
    pub servers: Vec<Server>,
    pub security_schemes: IndexMap<String, SecurityScheme>,
    pub security_requirements: Vec<SecurityRequirement>,
    pub infer_security_schemes: bool,
    pub security_schemes_selector: Option<SecuritySchemesSelector>,
    pub parameter_filters: Vec<ParameterFilterEntry>,
    pub request_body_filters: Vec<RequestBodyFilterEntry>,
    pub operation_filters: Vec<OperationFilterEntry>,
    pub document_filters: Vec<DocumentFilterEntry>,
    pub schema_generator: SchemaGeneratorOptions,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            documents: IndexMap::new(),
            doc_inclusion_predicate: Arc::new(default_doc_inclusion_predicate),
            ignore_obsolete_actions: false,
            conflicting_actions_resolver: None,
            operation_id_selector: Arc::new(default_operation_id),
            tags_selector: None,
            sort_key_selector: None,
            schema_comparer: None,
            describe_all_parameters_in_camel_case: false,
            servers: Vec::new(),
            security_schemes: IndexMap::new(),
            security_requirements: Vec::new(),
            infer_security_schemes: false,
            security_schemes_selector: None,
            parameter_filters: Vec::new(),
            request_body_filters: Vec::new(),
            operation_filters: Vec::new(),
            document_filters: Vec::new(),
            schema_generator: SchemaGeneratorOptions::default(),
        }
    }
}

/// Routes without a group belong to every document
#[must_use]
pub fn default_doc_inclusion_predicate(document_name: &str, route: &RouteDescription) -> bool {
    route
        .group_name
        .as_deref()
        .is_none_or(|group| group == document_name)
}

/// Route name, else endpoint name
#[must_use]
pub fn default_operation_id(route: &RouteDescription) -> Option<String> {
    let metadata = &route.action.metadata;
    metadata
        .route_name
        .clone()
        .or_else(|| metadata.endpoint_name.clone())
}

impl GeneratorOptions {
    /// Register a named document
    #[must_use]
    pub fn swagger_doc(mut self, name: impl Into<String>, info: Info) -> Self {
        self.documents.insert(name.into(), info);
        self
    }

    #[must_use]
    pub fn doc_inclusion_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &RouteDescription) -> bool + Send + Sync + 'static,
    {
        self.doc_inclusion_predicate = Arc::new(predicate);
        self
    }

    #[must_use]
    pub fn ignore_obsolete_actions(mut self) -> Self {
        self.ignore_obsolete_actions = true;
        self
    }

    #[must_use]
    pub fn resolve_conflicting_actions<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&[&RouteDescription]) -> RouteDescription + Send + Sync + 'static,
    {
        self.conflicting_actions_resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn custom_operation_ids<F>(mut self, selector: F) -> Self
    where
        F: Fn(&RouteDescription) -> Option<String> + Send + Sync + 'static,
    {
        self.operation_id_selector = Arc::new(selector);
        self
    }

    #[must_use]
    pub fn tag_actions_by<F>(mut self, selector: F) -> Self
    where
        F: Fn(&RouteDescription) -> Vec<String> + Send + Sync + 'static,
    {
        self.tags_selector = Some(Arc::new(selector));
        self
    }

    #[must_use]
    pub fn order_actions_by<F>(mut self, selector: F) -> Self
    where
        F: Fn(&RouteDescription) -> String + Send + Sync + 'static,
    {
        self.sort_key_selector = Some(Arc::new(selector));
        self
    }

    #[must_use]
    pub fn sort_schemas_with<F>(mut self, comparer: F) -> Self
    where
        F: Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    {
        self.schema_comparer = Some(Arc::new(comparer));
        self
    }

    #[must_use]
    pub fn describe_all_parameters_in_camel_case(mut self) -> Self {
        self.describe_all_parameters_in_camel_case = true;
        self
    }

    #[must_use]
    pub fn add_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    #[must_use]
    pub fn add_security_definition(
        mut self,
        name: impl Into<String>,
        scheme: SecurityScheme,
    ) -> Self {
        self.security_schemes.insert(name.into(), scheme);
        self
    }

    #[must_use]
    pub fn add_security_requirement(mut self, requirement: SecurityRequirement) -> Self {
        self.security_requirements.push(requirement);
        self
    }

    #[must_use]
    pub fn infer_security_schemes(mut self) -> Self {
        self.infer_security_schemes = true;
        self
    }

    /// Map authentication scheme names to security schemes; implies inference
    #[must_use]
    pub fn infer_security_schemes_using<F>(mut self, selector: F) -> Self
    where
        F: Fn(&[String]) -> IndexMap<String, SecurityScheme> + Send + Sync + 'static,
    {
        self.infer_security_schemes = true;
        self.security_schemes_selector = Some(Arc::new(selector));
        self
    }

    #[must_use]
    pub fn schema_generator(mut self, options: SchemaGeneratorOptions) -> Self {
        self.schema_generator = options;
        self
    }

    #[must_use]
    pub fn parameter_filter(mut self, filter: impl ParameterFilter + 'static) -> Self {
        self.parameter_filters.push(FilterEntry::Sync(Arc::new(filter)));
        self
    }

    #[must_use]
    pub fn parameter_async_filter(mut self, filter: impl AsyncParameterFilter + 'static) -> Self {
        self.parameter_filters.push(FilterEntry::Async(Arc::new(filter)));
        self
    }

    #[must_use]
    pub fn request_body_filter(mut self, filter: impl RequestBodyFilter + 'static) -> Self {
        self.request_body_filters
            .push(FilterEntry::Sync(Arc::new(filter)));
        self
    }

    #[must_use]
    pub fn request_body_async_filter(
        mut self,
        filter: impl AsyncRequestBodyFilter + 'static,
    ) -> Self {
        self.request_body_filters
            .push(FilterEntry::Async(Arc::new(filter)));
        self
    }

    #[must_use]
    pub fn operation_filter(mut self, filter: impl OperationFilter + 'static) -> Self {
        self.operation_filters.push(FilterEntry::Sync(Arc::new(filter)));
        self
    }

    #[must_use]
    pub fn operation_async_filter(mut self, filter: impl AsyncOperationFilter + 'static) -> Self {
        self.operation_filters
            .push(FilterEntry::Async(Arc::new(filter)));
        self
    }

    #[must_use]
    pub fn document_filter(mut self, filter: impl DocumentFilter + 'static) -> Self {
        self.document_filters.push(FilterEntry::Sync(Arc::new(filter)));
        self
    }

    #[must_use]
    pub fn document_async_filter(mut self, filter: impl AsyncDocumentFilter + 'static) -> Self {
        self.document_filters
            .push(FilterEntry::Async(Arc::new(filter)));
        self
    }

    /// Whether any async filter is registered in any category
    #[must_use]
    pub fn has_async_filters(&self) -> bool {
        self.parameter_filters.iter().any(FilterEntry::is_async)
            || self.request_body_filters.iter().any(FilterEntry::is_async)
            || self.operation_filters.iter().any(FilterEntry::is_async)
            || self.document_filters.iter().any(FilterEntry::is_async)
    }
}

impl fmt::Debug for GeneratorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorOptions")
            .field("documents", &self.documents.keys().collect::<Vec<_>>())
            .field("ignore_obsolete_actions", &self.ignore_obsolete_actions)
            .field(
                "describe_all_parameters_in_camel_case",
                &self.describe_all_parameters_in_camel_case,
            )
            .field("servers", &self.servers)
            .field("security_schemes", &self.security_schemes.keys().collect::<Vec<_>>())
            .field("infer_security_schemes", &self.infer_security_schemes)
            .field("schema_generator", &self.schema_generator)
            .finish_non_exhaustive()
    }
}
