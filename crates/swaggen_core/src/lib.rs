//! OpenAPI 3.0 object model shared by the swaggen generator.
//!
//! Every type serializes with serde into the OpenAPI wire shape; maps keep
//! insertion order so generated documents are deterministic.

pub mod openapi;
pub mod route;
pub mod schema;

pub use schema::{Schema, SchemaRef, SchemaType};
