//! Route selection and path grouping for one document.

use std::borrow::Cow;

use indexmap::IndexMap;
use swaggen_core::route::HttpMethod;
use tracing::debug;

use crate::description::RouteDescription;
use crate::error::{GeneratorError, Result};
use crate::options::GeneratorOptions;
use crate::path::normalize_path;

/// Routes sharing one normalized path, at most one per method
#[derive(Debug, Clone)]
pub struct PathGroup<'a> {
    pub path: String,
    /// Methods in first-seen order
    pub operations: Vec<(HttpMethod, Cow<'a, RouteDescription>)>,
}

/// Whether `route` belongs in the document at all
fn is_included(document_name: &str, route: &RouteDescription, options: &GeneratorOptions) -> bool {
    let metadata = &route.action.metadata;
    if metadata.ignored {
        debug!(action = %route.action.id, "excluding ignored action");
        return false;
    }
    if !(options.doc_inclusion_predicate)(document_name, route) {
        debug!(action = %route.action.id, document_name, "excluding action from document");
        return false;
    }
    if metadata.obsolete && options.ignore_obsolete_actions {
        debug!(action = %route.action.id, "excluding obsolete action");
        return false;
    }
    true
}

fn http_method(route: &RouteDescription) -> Result<HttpMethod> {
    let Some(method) = route.http_method.as_deref() else {
        return Err(GeneratorError::generation(format!(
            "Ambiguous HTTP method for action - {}. Actions require an explicit HttpMethod binding for Swagger/OpenAPI 3.0",
            route.action.id
        )));
    };
    HttpMethod::try_from(method).map_err(|_| {
        GeneratorError::generation(format!("The \"{method}\" HTTP method is not supported."))
    })
}

/// Select the routes of `document_name` and group them by path and method.
///
/// # Errors
///
/// Fails on routes without a (supported) HTTP method, and on several routes
/// sharing a method and path when no conflict resolver is configured.
pub fn group_routes<'a>(
    document_name: &str,
    routes: &'a [RouteDescription],
    options: &GeneratorOptions,
) -> Result<Vec<PathGroup<'a>>> {
    let mut included = Vec::new();
    for route in routes {
        if is_included(document_name, route, options) {
            included.push((http_method(route)?, route));
        }
    }

    if let Some(sort_key) = &options.sort_key_selector {
        included.sort_by_cached_key(|&(_, route)| sort_key(route));
    }

    let mut paths: IndexMap<String, IndexMap<HttpMethod, Vec<&'a RouteDescription>>> =
        IndexMap::new();
    for (method, route) in included {
        paths
            .entry(normalize_path(&route.relative_path))
            .or_default()
            .entry(method)
            .or_default()
            .push(route);
    }

    let mut groups = Vec::with_capacity(paths.len());
    for (path, methods) in paths {
        let mut operations = Vec::with_capacity(methods.len());
        for (method, candidates) in methods {
            operations.push((method, resolve_conflict(method, candidates, options)?));
        }
        groups.push(PathGroup { path, operations });
    }
    Ok(groups)
}

fn resolve_conflict<'a>(
    method: HttpMethod,
    candidates: Vec<&'a RouteDescription>,
    options: &GeneratorOptions,
) -> Result<Cow<'a, RouteDescription>> {
    if let [single] = candidates.as_slice() {
        return Ok(Cow::Borrowed(*single));
    }

    if let Some(resolver) = &options.conflicting_actions_resolver {
        debug!(
            %method,
            path = %candidates[0].relative_path,
            candidates = candidates.len(),
            "resolving conflicting actions"
        );
        return Ok(Cow::Owned(resolver(candidates.as_slice())));
    }

    let actions: Vec<&str> = candidates.iter().map(|route| route.action.id.as_str()).collect();
    Err(GeneratorError::generation(format!(
        "Conflicting method/path combination \"{method} {}\" for actions - {}. Actions require a unique method/path combination for Swagger/OpenAPI 2.0 and 3.0. Use a conflicting actions resolver as a workaround.",
        candidates[0].relative_path,
        actions.join(", ")
    )))
}
