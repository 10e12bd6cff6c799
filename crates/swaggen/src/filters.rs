//! Post-processing hooks.
//!
//! Every category has a synchronous and an asynchronous trait. Registered
//! filters run in registration order once the structural part of their target
//! is generated, and a failing filter aborts the whole document.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use swaggen_core::openapi::OpenApi;
use swaggen_core::route::{Operation, Parameter, RequestBody};
use swaggen_core::schema::{Schema, SchemaRef};

use crate::description::{ParameterDescription, RouteDescription};
use crate::error::{FilterError, FilterKind, GeneratorError, Result};
use crate::repository::SchemaRepository;
use crate::schema::SchemaGenerator;
use crate::types::{TypeCatalog, TypeHandle, TypeId};

/// Registered filter, kept in one list so sync and async filters interleave in
/// registration order
pub enum FilterEntry<S: ?Sized, A: ?Sized> {
    Sync(Arc<S>),
    Async(Arc<A>),
}

impl<S: ?Sized, A: ?Sized> FilterEntry<S, A> {
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl<S: ?Sized, A: ?Sized> Clone for FilterEntry<S, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(filter) => Self::Sync(Arc::clone(filter)),
            Self::Async(filter) => Self::Async(Arc::clone(filter)),
        }
    }
}

impl<S: ?Sized, A: ?Sized> fmt::Debug for FilterEntry<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("FilterEntry::Sync"),
            Self::Async(_) => f.write_str("FilterEntry::Async"),
        }
    }
}

/// Which filters a generation pass runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterMode {
    SyncOnly,
    All,
}

pub struct SchemaFilterContext<'a> {
    /// Type the schema was generated for
    pub ty: TypeHandle<'a>,
    pub schema_generator: &'a SchemaGenerator,
    pub repository: &'a mut SchemaRepository,
}

pub struct ParameterFilterContext<'a> {
    /// Description the parameter was built from; absent for hand-written
    /// parameters with no matching description
    pub parameter_description: Option<&'a ParameterDescription>,
    pub route: &'a RouteDescription,
    pub document_name: &'a str,
    pub types: &'a TypeCatalog,
    pub schema_generator: &'a SchemaGenerator,
    pub repository: &'a mut SchemaRepository,
}

pub struct RequestBodyFilterContext<'a> {
    pub body_parameter: Option<&'a ParameterDescription>,
    pub form_parameters: Vec<&'a ParameterDescription>,
    pub route: &'a RouteDescription,
    pub document_name: &'a str,
    pub types: &'a TypeCatalog,
    pub schema_generator: &'a SchemaGenerator,
    pub repository: &'a mut SchemaRepository,
}

pub struct OperationFilterContext<'a> {
    pub route: &'a RouteDescription,
    pub document_name: &'a str,
    pub types: &'a TypeCatalog,
    pub schema_generator: &'a SchemaGenerator,
    pub repository: &'a mut SchemaRepository,
}

pub struct DocumentFilterContext<'a> {
    /// Routes included in the document, in path order
    pub routes: Vec<&'a RouteDescription>,
    pub document_name: &'a str,
    pub types: &'a TypeCatalog,
    pub schema_generator: &'a SchemaGenerator,
    /// Definitions generated here that the document does not hold yet are
    /// added to its components after the filters run. Definitions generated
    /// before the filters are already in `document.components.schemas`.
    pub repository: &'a mut SchemaRepository,
}

macro_rules! impl_generate_schema {
    ($($context:ident),+) => {
        $(
            impl $context<'_> {
                /// Generate (or reference) the schema of `ty` in the document's repository
                ///
                /// # Errors
                ///
                /// Propagates schema generation failures.
                pub fn generate_schema(&mut self, ty: TypeId) -> Result<SchemaRef> {
                    self.schema_generator
                        .generate_schema(ty, self.types, self.repository)
                }
            }
        )+
    };
}

impl_generate_schema!(
    ParameterFilterContext,
    RequestBodyFilterContext,
    OperationFilterContext,
    DocumentFilterContext
);

pub trait SchemaFilter: Send + Sync {
    /// # Errors
    ///
    /// An error aborts document generation.
    fn apply(
        &self,
        schema: &mut Schema,
        context: &mut SchemaFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

pub trait ParameterFilter: Send + Sync {
    /// # Errors
    ///
    /// An error aborts document generation.
    fn apply(
        &self,
        parameter: &mut Parameter,
        context: &mut ParameterFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

#[async_trait]
pub trait AsyncParameterFilter: Send + Sync {
    async fn apply_async(
        &self,
        parameter: &mut Parameter,
        context: &mut ParameterFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

pub trait RequestBodyFilter: Send + Sync {
    /// # Errors
    ///
    /// An error aborts document generation.
    fn apply(
        &self,
        request_body: &mut RequestBody,
        context: &mut RequestBodyFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

#[async_trait]
pub trait AsyncRequestBodyFilter: Send + Sync {
    async fn apply_async(
        &self,
        request_body: &mut RequestBody,
        context: &mut RequestBodyFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

pub trait OperationFilter: Send + Sync {
    /// # Errors
    ///
    /// An error aborts document generation.
    fn apply(
        &self,
        operation: &mut Operation,
        context: &mut OperationFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

#[async_trait]
pub trait AsyncOperationFilter: Send + Sync {
    async fn apply_async(
        &self,
        operation: &mut Operation,
        context: &mut OperationFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

pub trait DocumentFilter: Send + Sync {
    /// # Errors
    ///
    /// An error aborts document generation.
    fn apply(
        &self,
        document: &mut OpenApi,
        context: &mut DocumentFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

#[async_trait]
pub trait AsyncDocumentFilter: Send + Sync {
    async fn apply_async(
        &self,
        document: &mut OpenApi,
        context: &mut DocumentFilterContext<'_>,
    ) -> Result<(), FilterError>;
}

macro_rules! run_filters {
    ($entries:expr, $mode:expr, $kind:expr, $target:expr, $context:expr) => {{
        for entry in $entries {
            match entry {
                FilterEntry::Sync(filter) => filter
                    .apply($target, $context)
                    .map_err(GeneratorError::filter($kind))?,
                FilterEntry::Async(filter) if $mode == FilterMode::All => filter
                    .apply_async($target, $context)
                    .await
                    .map_err(GeneratorError::filter($kind))?,
                FilterEntry::Async(_) => {}
            }
        }
        Ok(())
    }};
}

pub(crate) async fn run_parameter_filters(
    entries: &[FilterEntry<dyn ParameterFilter, dyn AsyncParameterFilter>],
    mode: FilterMode,
    parameter: &mut Parameter,
    context: &mut ParameterFilterContext<'_>,
) -> Result<()> {
    run_filters!(entries, mode, FilterKind::Parameter, parameter, context)
}

pub(crate) async fn run_request_body_filters(
    entries: &[FilterEntry<dyn RequestBodyFilter, dyn AsyncRequestBodyFilter>],
    mode: FilterMode,
    request_body: &mut RequestBody,
    context: &mut RequestBodyFilterContext<'_>,
) -> Result<()> {
    run_filters!(entries, mode, FilterKind::RequestBody, request_body, context)
}

pub(crate) async fn run_operation_filters(
    entries: &[FilterEntry<dyn OperationFilter, dyn AsyncOperationFilter>],
    mode: FilterMode,
    operation: &mut Operation,
    context: &mut OperationFilterContext<'_>,
) -> Result<()> {
    run_filters!(entries, mode, FilterKind::Operation, operation, context)
}

pub(crate) async fn run_document_filters(
    entries: &[FilterEntry<dyn DocumentFilter, dyn AsyncDocumentFilter>],
    mode: FilterMode,
    document: &mut OpenApi,
    context: &mut DocumentFilterContext<'_>,
) -> Result<()> {
    run_filters!(entries, mode, FilterKind::Document, document, context)
}
