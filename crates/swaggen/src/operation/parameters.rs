use swaggen_core::route::{Parameter, ParameterLocation};
use swaggen_core::schema::{Schema, SchemaRef};

use super::OperationContext;
use crate::description::{BindingSource, ParameterDescription, RouteDescription};
use crate::error::Result;
use crate::filters::{ParameterFilterContext, run_parameter_filters};
use crate::repository::SchemaRepository;

/// Headers the transport controls; they are never described as parameters
const ILLEGAL_HEADERS: [&str; 3] = ["Accept", "Content-Type", "Authorization"];

/// Lower-case the first character of every dotted segment
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    name.split('.')
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_lowercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn is_illegal_header(description: &ParameterDescription) -> bool {
    description.is_from(BindingSource::Header)
        && ILLEGAL_HEADERS
            .iter()
            .any(|header| header.eq_ignore_ascii_case(&description.name))
}

/// Described as an operation parameter rather than part of the request body
fn is_operation_parameter(description: &ParameterDescription) -> bool {
    !description.ignored
        && !description.is_from(BindingSource::Body)
        && !description.is_from(BindingSource::Form)
}

const fn location(source: Option<BindingSource>) -> ParameterLocation {
    match source {
        Some(BindingSource::Path) => ParameterLocation::Path,
        Some(BindingSource::Header) => ParameterLocation::Header,
        Some(BindingSource::Cookie) => ParameterLocation::Cookie,
        _ => ParameterLocation::Query,
    }
}

pub(super) fn parameter_name(name: &str, ctx: OperationContext<'_>) -> String {
    if ctx.options.describe_all_parameters_in_camel_case {
        to_camel_case(name)
    } else {
        name.to_string()
    }
}

/// Schema of a described parameter; untyped parameters are plain strings
pub(super) fn parameter_schema(
    description: &ParameterDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<SchemaRef> {
    let mut schema = match description.ty {
        Some(ty) => ctx
            .schema_generator
            .generate_schema(ty, ctx.types, repository)?,
        None => SchemaRef::inline(Schema::string()),
    };
    if let (Some(default), Some(inline)) = (&description.default_value, schema.as_inline_mut()) {
        inline.default = Some(default.clone());
    }
    Ok(schema)
}

/// Description of the component a parameter schema refers to, directly or
/// through its array items
fn referenced_description(schema: &SchemaRef, repository: &SchemaRepository) -> Option<String> {
    let reference = match schema {
        SchemaRef::Ref(_) => schema,
        SchemaRef::Inline(inline) => inline.items.as_deref()?,
    };
    let schema_id = reference.reference_id()?;
    repository.definition(schema_id)?.description.clone()
}

fn generate_parameter(
    description: &ParameterDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<Parameter> {
    let location = location(description.source);
    let schema = parameter_schema(description, ctx, repository)?;

    let mut parameter = Parameter::new(parameter_name(&description.name, ctx), location);
    parameter.required = (location == ParameterLocation::Path || description.is_required)
        .then_some(true);
    parameter.description = description
        .description
        .clone()
        .or_else(|| referenced_description(&schema, repository));
    parameter.schema = Some(schema);
    Ok(parameter)
}

async fn apply_filters(
    parameter: &mut Parameter,
    description: Option<&ParameterDescription>,
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<()> {
    let mut context = ParameterFilterContext {
        parameter_description: description,
        route,
        document_name: ctx.document_name,
        types: ctx.types,
        schema_generator: ctx.schema_generator,
        repository,
    };
    run_parameter_filters(&ctx.options.parameter_filters, ctx.mode, parameter, &mut context).await
}

pub(super) async fn generate_parameters(
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<Vec<Parameter>> {
    let mut parameters = Vec::new();
    for description in &route.parameters {
        if !is_operation_parameter(description) || is_illegal_header(description) {
            continue;
        }
        let mut parameter = generate_parameter(description, ctx, repository)?;
        apply_filters(&mut parameter, Some(description), route, ctx, repository).await?;
        parameters.push(parameter);
    }
    Ok(parameters)
}

/// Complete hand-written parameters: schemas come from the description of the
/// same name, except for illegal headers which stay schema-less.
pub(super) async fn backfill_parameters(
    parameters: &mut [Parameter],
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<()> {
    for parameter in parameters {
        let description = route
            .parameters
            .iter()
            .find(|candidate| candidate.name.eq_ignore_ascii_case(&parameter.name));

        if let Some(description) = description
            && parameter.schema.is_none()
            && !is_illegal_header(description)
        {
            parameter.schema = Some(parameter_schema(description, ctx, repository)?);
        }
        parameter.name = parameter_name(&parameter.name, ctx);

        apply_filters(parameter, description, route, ctx, repository).await?;
    }
    Ok(())
}
