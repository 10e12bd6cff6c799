//! OpenAPI document generator

use std::collections::HashSet;
use std::sync::Arc;

use swaggen_core::openapi::{OpenApi, Tag};
use swaggen_core::route::PathItem;
use tracing::{debug, warn};

use crate::description::{ApiDescriptionProvider, RouteDescription};
use crate::error::{GeneratorError, Result};
use crate::filters::{DocumentFilterContext, FilterMode, run_document_filters};
use crate::grouping::group_routes;
use crate::operation::{OperationContext, build_operation};
use crate::options::GeneratorOptions;
use crate::repository::SchemaRepository;
use crate::schema::SchemaGenerator;
use crate::security::{AuthenticationSchemeProvider, security_schemes};

/// Produces one `OpenAPI` document per registered document name.
///
/// Every call works on its own schema repository, so a generator can be shared
/// between threads and asked for several documents concurrently.
pub struct SwaggerGenerator<P> {
    options: GeneratorOptions,
    schema_generator: SchemaGenerator,
    provider: P,
    authentication: Option<Arc<dyn AuthenticationSchemeProvider>>,
}

impl<P: ApiDescriptionProvider> SwaggerGenerator<P> {
    #[must_use]
    pub fn new(options: GeneratorOptions, provider: P) -> Self {
        let schema_generator = SchemaGenerator::new(options.schema_generator.clone());
        Self {
            options,
            schema_generator,
            provider,
            authentication: None,
        }
    }

    /// Source of authentication scheme names for security scheme inference
    #[must_use]
    pub fn with_authentication_schemes(
        mut self,
        provider: impl AuthenticationSchemeProvider + 'static,
    ) -> Self {
        self.authentication = Some(Arc::new(provider));
        self
    }

    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Registered document names, in registration order
    pub fn document_names(&self) -> impl Iterator<Item = &str> {
        self.options.documents.keys().map(String::as_str)
    }

    /// Generate a document, running only synchronous filters.
    ///
    /// # Errors
    ///
    /// Fails for unknown document names, unsupported or conflicting routes,
    /// schema id conflicts and failing filters.
    pub fn get_document(&self, document_name: &str) -> Result<OpenApi> {
        if self.options.has_async_filters() {
            warn!(
                document_name,
                "async filters are registered but skipped on the synchronous path; use get_document_async"
            );
        }
        futures::executor::block_on(self.generate(document_name, FilterMode::SyncOnly))
    }

    /// Generate a document, awaiting every filter in registration order.
    ///
    /// # Errors
    ///
    /// Same as [`get_document`](Self::get_document).
    pub async fn get_document_async(&self, document_name: &str) -> Result<OpenApi> {
        self.generate(document_name, FilterMode::All).await
    }

    async fn generate(&self, document_name: &str, mode: FilterMode) -> Result<OpenApi> {
        let Some(info) = self.options.documents.get(document_name) else {
            return Err(GeneratorError::UnknownDocument {
                name: document_name.to_string(),
                known: self.options.documents.keys().cloned().collect(),
            });
        };
        debug!(document_name, "generating document");

        let types = self.provider.types();
        let groups = group_routes(document_name, self.provider.routes(), &self.options)?;
        let mut repository = SchemaRepository::new();
        let ctx = OperationContext {
            document_name,
            types,
            options: &self.options,
            schema_generator: &self.schema_generator,
            mode,
        };

        let mut document = OpenApi::new(info.clone());
        let mut tags: Vec<String> = Vec::new();
        for group in &groups {
            let mut path_item = PathItem::default();
            for (method, route) in &group.operations {
                let operation = build_operation(route, ctx, &mut repository).await?;
                for tag in &operation.tags {
                    if !tags.contains(tag) {
                        tags.push(tag.clone());
                    }
                }
                path_item.set_operation(*method, operation);
            }
            document.paths.insert(group.path.clone(), path_item);
        }

        document.servers.clone_from(&self.options.servers);
        document.tags = tags.into_iter().map(Tag::new).collect();
        document.components.security_schemes =
            security_schemes(&self.options, self.authentication.as_deref());
        document
            .security
            .clone_from(&self.options.security_requirements);

        // Filters see, edit and remove generated definitions on the document itself.
        document.components.schemas = repository.schemas().clone();
        let generated: HashSet<String> = document.components.schemas.keys().cloned().collect();

        let routes: Vec<&RouteDescription> = groups
            .iter()
            .flat_map(|group| group.operations.iter().map(|(_, route)| &**route))
            .collect();
        let mut context = DocumentFilterContext {
            routes,
            document_name,
            types,
            schema_generator: &self.schema_generator,
            repository: &mut repository,
        };
        run_document_filters(&self.options.document_filters, mode, &mut document, &mut context)
            .await?;

        // Definitions filters generated through the repository
        for (schema_id, schema) in repository.into_schemas() {
            if !generated.contains(&schema_id) {
                document.components.schemas.entry(schema_id).or_insert(schema);
            }
        }
        if let Some(comparer) = &self.options.schema_comparer {
            document.components.schemas.sort_by(|a, _, b, _| comparer(a.as_str(), b.as_str()));
        }

        debug!(
            document_name,
            paths = document.paths.len(),
            schemas = document.components.schemas.len(),
            "generated document"
        );
        Ok(document)
    }
}

impl<P> std::fmt::Debug for SwaggerGenerator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwaggerGenerator")
            .field("options", &self.options)
            .field("authentication", &self.authentication.is_some())
            .finish_non_exhaustive()
    }
}
