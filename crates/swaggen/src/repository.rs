//! Per-document store of generated component schemas.

use std::collections::HashMap;

use indexmap::IndexMap;
use swaggen_core::schema::{Schema, SchemaRef};
use tracing::trace;

use crate::error::{GeneratorError, Result};
use crate::types::{TypeHandle, TypeId};

/// Memoizes component schemas by type identity.
///
/// A schema id is reserved before its schema is generated, so a type that
/// refers to itself (directly or through other types) receives a reference to
/// the reserved id instead of recursing forever. Definitions keep reservation
/// order.
#[derive(Debug, Default)]
pub struct SchemaRepository {
    ids: HashMap<TypeId, String>,
    owners: HashMap<String, (TypeId, String)>,
    schemas: IndexMap<String, Schema>,
}

impl SchemaRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a reference to the schema of `ty`, generating it on first use.
    ///
    /// # Errors
    ///
    /// Fails when `schema_id` already belongs to a different type, or when
    /// `generate` fails.
    pub fn get_or_add<F>(
        &mut self,
        ty: TypeHandle<'_>,
        schema_id: String,
        generate: F,
    ) -> Result<SchemaRef>
    where
        F: FnOnce(&mut Self) -> Result<Schema>,
    {
        if let Some(existing) = self.ids.get(&ty.id()) {
            return Ok(SchemaRef::reference(existing));
        }

        self.reserve(ty, &schema_id)?;
        let schema = generate(self)?;
        self.schemas.insert(schema_id.clone(), schema);
        Ok(SchemaRef::reference(&schema_id))
    }

    fn reserve(&mut self, ty: TypeHandle<'_>, schema_id: &str) -> Result<()> {
        if let Some((owner, owner_name)) = self.owners.get(schema_id)
            && *owner != ty.id()
        {
            return Err(GeneratorError::SchemaIdConflict {
                schema_id: schema_id.to_string(),
                existing: owner_name.clone(),
                conflicting: ty.full_name(),
            });
        }

        trace!(schema_id, ty = ?ty, "reserving schema id");
        self.ids.insert(ty.id(), schema_id.to_string());
        self.owners.insert(schema_id.to_string(), (ty.id(), ty.full_name()));
        self.schemas.insert(schema_id.to_string(), Schema::default());
        Ok(())
    }

    /// Add or replace a definition that is not tied to a described type
    pub fn add_definition(&mut self, schema_id: impl Into<String>, schema: Schema) -> SchemaRef {
        let schema_id = schema_id.into();
        let reference = SchemaRef::reference(&schema_id);
        self.schemas.insert(schema_id, schema);
        reference
    }

    /// Schema id already assigned to `ty`
    #[must_use]
    pub fn schema_id_for(&self, ty: TypeId) -> Option<&str> {
        self.ids.get(&ty).map(String::as_str)
    }

    #[must_use]
    pub fn definition(&self, schema_id: &str) -> Option<&Schema> {
        self.schemas.get(schema_id)
    }

    pub fn definition_mut(&mut self, schema_id: &str) -> Option<&mut Schema> {
        self.schemas.get_mut(schema_id)
    }

    /// Inline schema itself, or the definition a component reference points to
    #[must_use]
    pub fn resolve<'a>(&'a self, schema: &'a SchemaRef) -> Option<&'a Schema> {
        match schema {
            SchemaRef::Inline(inline) => Some(inline),
            SchemaRef::Ref(reference) => reference
                .schema_id()
                .and_then(|schema_id| self.definition(schema_id)),
        }
    }

    #[must_use]
    pub const fn schemas(&self) -> &IndexMap<String, Schema> {
        &self.schemas
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Final `schema id -> schema` mapping
    #[must_use]
    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}
