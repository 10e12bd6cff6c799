//! Operation text taken from source documentation comments.

mod humanize;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use swaggen_core::route::{Operation, Response};

use crate::error::FilterError;
use crate::filters::{OperationFilter, OperationFilterContext};

pub use humanize::humanize;

/// Documentation of one member (an action or a controller), still in raw
/// doc-comment markup
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemberDocs {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Status code -> response text
    #[serde(default)]
    pub responses: IndexMap<String, String>,
}

/// Looks up documentation by member id.
///
/// Actions are looked up by [`ActionDescriptor::id`], controllers by their name.
///
/// [`ActionDescriptor::id`]: crate::description::ActionDescriptor::id
pub trait DocumentationProvider: Send + Sync {
    fn member(&self, member_id: &str) -> Option<&MemberDocs>;
}

impl DocumentationProvider for HashMap<String, MemberDocs> {
    fn member(&self, member_id: &str) -> Option<&MemberDocs> {
        self.get(member_id)
    }
}

impl DocumentationProvider for IndexMap<String, MemberDocs> {
    fn member(&self, member_id: &str) -> Option<&MemberDocs> {
        self.get(member_id)
    }
}

/// Fills operation summary, description and response descriptions from
/// documentation comments.
///
/// Controller-level response text applies first and action-level text
/// overrides it. A documented status code the route does not declare is added
/// as a new response.
#[derive(Debug, Clone)]
pub struct DocumentationOperationFilter<D> {
    docs: D,
}

impl<D: DocumentationProvider> DocumentationOperationFilter<D> {
    pub const fn new(docs: D) -> Self {
        Self { docs }
    }
}

fn apply_responses(operation: &mut Operation, docs: &MemberDocs) {
    for (code, text) in &docs.responses {
        let response = operation
            .responses
            .entry(code.clone())
            .or_insert_with(Response::default);
        response.description = humanize(text);
    }
}

impl<D: DocumentationProvider> OperationFilter for DocumentationOperationFilter<D> {
    fn apply(
        &self,
        operation: &mut Operation,
        context: &mut OperationFilterContext<'_>,
    ) -> Result<(), FilterError> {
        let action = &context.route.action;
        if let Some(controller) = &action.controller
            && let Some(docs) = self.docs.member(controller)
        {
            apply_responses(operation, docs);
        }

        let Some(docs) = self.docs.member(&action.id) else {
            return Ok(());
        };
        if let Some(summary) = &docs.summary {
            operation.summary = Some(humanize(summary));
        }
        if let Some(remarks) = &docs.remarks {
            operation.description = Some(humanize(remarks));
        }
        apply_responses(operation, docs);
        Ok(())
    }
}
