//! Swaggen - OpenAPI document generation from route and type descriptions
//!
//! The host describes its routes ([`RouteDescription`]) and the types they
//! exchange ([`TypeCatalog`]); a [`SwaggerGenerator`] turns them into one
//! OpenAPI 3.0 document per registered document name.

pub mod description;
pub mod docs;
pub mod error;
pub mod filters;
mod grouping;
mod identity;
pub mod openapi_generator;
mod operation;
pub mod options;
mod path;
pub mod repository;
pub mod schema;
pub mod security;
pub mod settings;
pub mod types;

// Re-export the document model so hosts don't need to depend on swaggen_core directly
pub use swaggen_core::schema as model;
pub use swaggen_core::{openapi, route};

pub use swaggen_core::openapi::OpenApi;

pub use description::{ApiDescriptionProvider, ApiDescriptions, RouteDescription};
pub use error::{GeneratorError, Result};
pub use identity::default_schema_id;
pub use openapi_generator::SwaggerGenerator;
pub use operation::{reason_phrase, to_camel_case};
pub use options::{GeneratorOptions, SchemaGeneratorOptions};
pub use path::normalize_path;
pub use settings::GeneratorSettings;
pub use types::{TypeCatalog, TypeDescriptor, TypeId};
