use http::StatusCode;
use indexmap::IndexMap;
use swaggen_core::route::{MediaType, Response};

use super::OperationContext;
use crate::description::{ResponseType, RouteDescription};
use crate::error::Result;
use crate::repository::SchemaRepository;

const DEFAULT_RESPONSE_CONTENT_TYPE: &str = "application/json";

/// RFC 9110 reason phrase of a status code.
///
/// Codes without a registered phrase are described by their class.
#[must_use]
pub fn reason_phrase(status_code: u16) -> String {
    let phrase = match status_code {
        413 => Some("Content Too Large"),
        416 => Some("Range Not Satisfiable"),
        422 => Some("Unprocessable Content"),
        _ => StatusCode::from_u16(status_code)
            .ok()
            .and_then(|status| status.canonical_reason()),
    };
    let phrase = phrase.unwrap_or(match status_code {
        100..=199 => "Informational",
        200..=299 => "Success",
        300..=399 => "Redirection",
        400..=499 => "Client Error",
        500..=599 => "Server Error",
        _ => "Error",
    });
    phrase.to_string()
}

fn description_for(response_type: &ResponseType) -> String {
    if response_type.is_default {
        "Error".to_string()
    } else {
        reason_phrase(response_type.status_code)
    }
}

/// Explicit `produces` metadata, else the response's formats, else JSON
fn response_content_types(route: &RouteDescription, response_type: &ResponseType) -> Vec<String> {
    if let Some(produces) = &route.action.metadata.produces
        && !produces.is_empty()
    {
        return produces.clone();
    }
    if !response_type.formats.is_empty() {
        return response_type.formats.clone();
    }
    vec![DEFAULT_RESPONSE_CONTENT_TYPE.to_string()]
}

fn generate_response(
    route: &RouteDescription,
    response_type: &ResponseType,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<Response> {
    let mut response = Response {
        description: description_for(response_type),
        ..Response::default()
    };
    if let Some(ty) = response_type.ty {
        let schema = ctx
            .schema_generator
            .generate_schema(ty, ctx.types, repository)?;
        response.content = response_content_types(route, response_type)
            .into_iter()
            .map(|content_type| (content_type, MediaType::with_schema(schema.clone())))
            .collect();
    }
    Ok(response)
}

pub(super) fn generate_responses(
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<IndexMap<String, Response>> {
    let mut responses = IndexMap::new();
    for response_type in &route.response_types {
        let response = generate_response(route, response_type, ctx, repository)?;
        responses.insert(response_type.key(), response);
    }
    Ok(responses)
}

/// Give schema-less media types of hand-written responses the payload schema
/// of the response type with the same status code.
pub(super) fn backfill_responses(
    responses: &mut IndexMap<String, Response>,
    route: &RouteDescription,
    ctx: OperationContext<'_>,
    repository: &mut SchemaRepository,
) -> Result<()> {
    for (key, response) in responses.iter_mut() {
        let response_type = route
            .response_types
            .iter()
            .find(|candidate| candidate.key() == *key);

        if response.description.is_empty() {
            response.description = match response_type {
                Some(response_type) => description_for(response_type),
                None => key.parse().map_or_else(|_| "Error".to_string(), reason_phrase),
            };
        }

        let Some(ty) = response_type.and_then(|response_type| response_type.ty) else {
            continue;
        };
        if response.content.values().all(|media_type| media_type.schema.is_some()) {
            continue;
        }
        let schema = ctx
            .schema_generator
            .generate_schema(ty, ctx.types, repository)?;
        for media_type in response.content.values_mut() {
            if media_type.schema.is_none() {
                media_type.schema = Some(schema.clone());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::build;
    use super::*;
    use crate::description::EndpointMetadata;
    use crate::options::GeneratorOptions;
    use crate::types::{TypeCatalog, TypeDescriptor};
    use rstest::rstest;
    use swaggen_core::schema::SchemaRef;

    #[rstest]
    #[case(200, "OK")]
    #[case(201, "Created")]
    #[case(204, "No Content")]
    #[case(400, "Bad Request")]
    #[case(404, "Not Found")]
    #[case(413, "Content Too Large")]
    #[case(416, "Range Not Satisfiable")]
    #[case(422, "Unprocessable Content")]
    #[case(500, "Internal Server Error")]
    #[case(299, "Success")]
    #[case(499, "Client Error")]
    #[case(599, "Server Error")]
    fn reason_phrases(#[case] status_code: u16, #[case] expected: &str) {
        assert_eq!(reason_phrase(status_code), expected);
    }

    #[test]
    fn responses_are_keyed_and_described() {
        let mut types = TypeCatalog::new();
        let dto = types.register(TypeDescriptor::object("TestDto"));
        let route = RouteDescription::new("POST", "resource")
            .with_response(ResponseType::new(200).typed(dto))
            .with_response(ResponseType::new(400))
            .with_response(ResponseType::new(422))
            .with_response(ResponseType::default_response());

        let operation = build(&route, &types, &GeneratorOptions::default()).0.unwrap();

        let summary: Vec<_> = operation
            .responses
            .iter()
            .map(|(key, response)| {
                (
                    key.as_str(),
                    response.description.as_str(),
                    response.content.len(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("200", "OK", 1),
                ("400", "Bad Request", 0),
                ("422", "Unprocessable Content", 0),
                ("default", "Error", 0),
            ]
        );
        assert_eq!(
            operation.responses["200"].content["application/json"]
                .schema
                .as_ref()
                .and_then(SchemaRef::reference_id),
            Some("TestDto")
        );
    }

    #[test]
    fn produces_overrides_response_formats() {
        let mut types = TypeCatalog::new();
        let dto = types.register(TypeDescriptor::object("TestDto"));
        let route = RouteDescription::new("GET", "resource")
            .with_response(
                ResponseType::new(200)
                    .typed(dto)
                    .with_formats(["text/json", "application/xml"]),
            );

        let operation = build(&route, &types, &GeneratorOptions::default()).0.unwrap();
        assert_eq!(
            operation.responses["200"].content.keys().collect::<Vec<_>>(),
            vec!["text/json", "application/xml"]
        );

        let route = route.with_metadata(EndpointMetadata {
            produces: Some(vec!["application/someMediaType".to_string()]),
            ..EndpointMetadata::default()
        });
        let operation = build(&route, &types, &GeneratorOptions::default()).0.unwrap();
        assert_eq!(
            operation.responses["200"].content.keys().collect::<Vec<_>>(),
            vec!["application/someMediaType"]
        );
    }
}
