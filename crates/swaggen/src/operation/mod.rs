//! Route -> operation generation.
//!
//! Builders are async so filters can be awaited; the synchronous document path
//! drives the same code with [`FilterMode::SyncOnly`].

mod parameters;
mod request_body;
mod response;

use swaggen_core::route::Operation;

use crate::description::RouteDescription;
use crate::error::Result;
use crate::filters::{FilterMode, OperationFilterContext, run_operation_filters};
use crate::options::GeneratorOptions;
use crate::repository::SchemaRepository;
use crate::schema::SchemaGenerator;
use crate::types::TypeCatalog;

pub use parameters::to_camel_case;
pub use response::reason_phrase;

/// Everything an operation needs besides the route and the schema repository
#[derive(Clone, Copy)]
pub(crate) struct OperationContext<'a> {
    pub(crate) document_name: &'a str,
    pub(crate) types: &'a TypeCatalog,
    pub(crate) options: &'a GeneratorOptions,
    pub(crate) schema_generator: &'a SchemaGenerator,
    pub(crate) mode: FilterMode,
}

/// Build the operation of one route, starting from the hand-written operation
/// in its metadata when there is one.
pub(crate) async fn build_operation(
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<Operation> {
    let metadata = &route.action.metadata;

    let mut operation = match &metadata.operation {
        Some(overridden) => from_metadata(overridden.clone(), route, ctx, repository).await?,
        None => Operation {
            tags: tags_for(route, ctx.options),
            operation_id: (ctx.options.operation_id_selector)(route),
            parameters: parameters::generate_parameters(route, ctx, repository).await?,
            request_body: request_body::generate_request_body(route, ctx, repository).await?,
            responses: response::generate_responses(route, ctx, repository)?,
            ..Operation::default()
        },
    };

    if operation.summary.is_none() {
        operation.summary.clone_from(&metadata.summary);
    }
    if operation.description.is_none() {
        operation.description.clone_from(&metadata.description);
    }
    if metadata.obsolete {
        operation.deprecated = Some(true);
    }

    let mut context = OperationFilterContext {
        route,
        document_name: ctx.document_name,
        types: ctx.types,
        schema_generator: ctx.schema_generator,
        repository,
    };
    run_operation_filters(&ctx.options.operation_filters, ctx.mode, &mut operation, &mut context)
        .await?;

    Ok(operation)
}

async fn from_metadata(
    mut operation: Operation,
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<Operation> {
    if operation.operation_id.is_none() {
        operation.operation_id = (ctx.options.operation_id_selector)(route);
    }
    if operation.tags.is_empty() {
        operation.tags = tags_for(route, ctx.options);
    }

    parameters::backfill_parameters(&mut operation.parameters, route, ctx, repository).await?;
    if let Some(request_body) = operation.request_body.as_mut() {
        request_body::backfill_request_body(request_body, route, ctx, repository).await?;
    }
    response::backfill_responses(&mut operation.responses, route, ctx, repository)?;

    Ok(operation)
}

/// Tags selector, else metadata tags, else the controller name
fn tags_for(route: &RouteDescription, options: &GeneratorOptions) -> Vec<String> {
    if let Some(selector) = &options.tags_selector {
        return selector(route);
    }
    route
        .action
        .metadata
        .tags
        .clone()
        .or_else(|| route.action.controller.clone().map(|controller| vec![controller]))
        .unwrap_or_default()
}
