use indexmap::IndexMap;
use swaggen_core::route::{Encoding, MediaType, ParameterStyle, RequestBody};
use swaggen_core::schema::{Schema, SchemaRef};

use super::OperationContext;
use super::parameters::{parameter_name, parameter_schema};
use crate::description::{ParameterDescription, RouteDescription};
use crate::error::{GeneratorError, Result};
use crate::filters::{RequestBodyFilterContext, run_request_body_filters};
use crate::repository::SchemaRepository;
use crate::types::TypeKind;

const DEFAULT_BODY_CONTENT_TYPE: &str = "application/json";
const DEFAULT_FORM_CONTENT_TYPE: &str = "multipart/form-data";

/// Explicit `consumes` metadata, else the route's request formats, else `default`
fn request_content_types(route: &RouteDescription, default: &str) -> Vec<String> {
    if let Some(consumes) = &route.action.metadata.consumes
        && !consumes.is_empty()
    {
        return consumes.clone();
    }
    if !route.request_formats.is_empty() {
        return route.request_formats.clone();
    }
    vec![default.to_string()]
}

/// Body parameter, checked to carry no file upload
fn checked_body_parameter<'a>(
    route: &'a RouteDescription,
    ctx: OperationContext<'_>,
) -> Result<Option<&'a ParameterDescription>> {
    let Some(body) = route.body_parameter() else {
        return Ok(None);
    };
    if body.is_file_upload(ctx.types) {
        return Err(GeneratorError::generation(format!(
            "Error reading parameter(s) for action {}: file upload parameter \"{}\" cannot be bound to the request body; bind it to form data instead",
            route.action.id, body.name
        )));
    }
    Ok(Some(body))
}

/// Object-typed parameter, whatever shape its schema takes
fn is_complex_object(parameter: &ParameterDescription, ctx: OperationContext<'_>) -> bool {
    let Some(ty) = parameter.ty else {
        return false;
    };
    match &ctx.types.get(ty).kind {
        TypeKind::Object => true,
        TypeKind::Nullable(inner) => matches!(ctx.types.get(*inner).kind, TypeKind::Object),
        _ => false,
    }
}

struct FormSchema {
    schema: SchemaRef,
    encoding: IndexMap<String, Encoding>,
}

/// Merge form parameters into one schema: complex parameters are composed with
/// `allOf`, everything else becomes a property of an inline object.
fn form_schema(
    forms: &[&ParameterDescription],
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<FormSchema> {
    let mut references = Vec::new();
    let mut object = Schema::object();

    for form in forms {
        let schema = parameter_schema(form, ctx, repository)?;
        if is_complex_object(form, ctx) {
            references.push(schema);
            continue;
        }

        let name = parameter_name(&form.name, ctx);
        if form.is_required {
            object.required.push(name.clone());
        }
        object.properties.insert(name, schema);
    }

    let encoding = object
        .properties
        .keys()
        .map(|name| {
            let encoding = Encoding {
                style: Some(ParameterStyle::Form),
                ..Encoding::default()
            };
            (name.clone(), encoding)
        })
        .collect();

    let schema = match (references.len(), object.properties.is_empty()) {
        (1, true) => references.remove(0),
        (0, _) => SchemaRef::inline(object),
        (_, true) => SchemaRef::inline(Schema {
            all_of: references,
            ..Schema::default()
        }),
        (_, false) => {
            references.push(SchemaRef::inline(object));
            SchemaRef::inline(Schema {
                all_of: references,
                ..Schema::default()
            })
        }
    };

    Ok(FormSchema { schema, encoding })
}

fn content_for(
    content_types: Vec<String>,
    schema: &SchemaRef,
    encoding: &IndexMap<String, Encoding>,
) -> IndexMap<String, MediaType> {
    content_types
        .into_iter()
        .map(|content_type| {
            let media_type = MediaType {
                encoding: encoding.clone(),
                ..MediaType::with_schema(schema.clone())
            };
            (content_type, media_type)
        })
        .collect()
}

pub(super) async fn generate_request_body(
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<Option<RequestBody>> {
    let body = checked_body_parameter(route, ctx)?;
    let forms: Vec<&ParameterDescription> = route.form_parameters().collect();

    let mut request_body = if let Some(body) = body {
        let schema = parameter_schema(body, ctx, repository)?;
        RequestBody {
            description: body.description.clone(),
            required: body.is_required.then_some(true),
            content: content_for(
                request_content_types(route, DEFAULT_BODY_CONTENT_TYPE),
                &schema,
                &IndexMap::new(),
            ),
            ..RequestBody::default()
        }
    } else if !forms.is_empty() {
        let form = form_schema(&forms, ctx, repository)?;
        RequestBody {
            content: content_for(
                request_content_types(route, DEFAULT_FORM_CONTENT_TYPE),
                &form.schema,
                &form.encoding,
            ),
            ..RequestBody::default()
        }
    } else {
        return Ok(None);
    };

    apply_filters(&mut request_body, body, forms, route, ctx, repository).await?;
    Ok(Some(request_body))
}

/// Give schema-less media types of a hand-written request body the schema
/// derived from the route's body or form parameters.
pub(super) async fn backfill_request_body(
    request_body: &mut RequestBody,
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<()> {
    let body = checked_body_parameter(route, ctx)?;
    let forms: Vec<&ParameterDescription> = route.form_parameters().collect();

    let missing = request_body
        .content
        .values()
        .any(|media_type| media_type.schema.is_none());
    if missing {
        let generated = match body {
            Some(body) => Some(FormSchema {
                schema: parameter_schema(body, ctx, repository)?,
                encoding: IndexMap::new(),
            }),
            None if !forms.is_empty() => Some(form_schema(&forms, ctx, repository)?),
            None => None,
        };

        if let Some(generated) = generated {
            for media_type in request_body.content.values_mut() {
                if media_type.schema.is_none() {
                    media_type.schema = Some(generated.schema.clone());
                    if media_type.encoding.is_empty() {
                        media_type.encoding.clone_from(&generated.encoding);
                    }
                }
            }
        }
    }

    apply_filters(request_body, body, forms, route, ctx, repository).await
}

async fn apply_filters(
    request_body: &mut RequestBody,
    body: Option<&ParameterDescription>,
    forms: Vec<&ParameterDescription>,
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<()> {
    let mut context = RequestBodyFilterContext {
        body_parameter: body,
        form_parameters: forms,
        route,
        document_name: ctx.document_name,
        types: ctx.types,
        schema_generator: ctx.schema_generator,
        repository,
    };
    run_request_body_filters(
        &ctx.options.request_body_filters,
        ctx.mode,
        request_body,
        &mut context,
    )
    .await
}
