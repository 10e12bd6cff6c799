//! Type -> schema generation.
//!
//! Generation follows a fixed priority: custom mappings, primitives, nullable
//! wrappers, enums, dictionaries, collections, then complex objects (with
//! inheritance and polymorphism). Enums and objects become component schemas
//! in the [`SchemaRepository`] and are returned as references; everything else
//! is returned inline.

mod enum_schema;
mod struct_schema;
mod type_schema;

use serde_json::Value;
use swaggen_core::schema::{Schema, SchemaRef};

use crate::error::{FilterKind, GeneratorError, Result};
use crate::filters::SchemaFilterContext;
use crate::options::SchemaGeneratorOptions;
use crate::repository::SchemaRepository;
use crate::types::{PrimitiveType, PropertyDescriptor, TypeCatalog, TypeHandle, TypeId, TypeKind};

pub use type_schema::primitive_schema;

/// Annotations a use site adds on top of a type's schema
#[derive(Debug, Clone, Default)]
struct MemberMetadata {
    nullable: bool,
    default: Option<Value>,
    deprecated: bool,
    description: Option<String>,
}

impl MemberMetadata {
    const fn is_empty(&self) -> bool {
        !self.nullable && self.default.is_none() && !self.deprecated && self.description.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaGenerator {
    options: SchemaGeneratorOptions,
}

impl SchemaGenerator {
    #[must_use]
    pub const fn new(options: SchemaGeneratorOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &SchemaGeneratorOptions {
        &self.options
    }

    /// Schema describing `ty`, registering component schemas in `repository`.
    ///
    /// # Errors
    ///
    /// Fails on schema id conflicts and when a schema filter fails.
    pub fn generate_schema(
        &self,
        ty: TypeId,
        types: &TypeCatalog,
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        if let Some(factory) = self.options.custom_type_mappings.get(&ty) {
            return Ok(SchemaRef::inline(factory()));
        }

        let handle = types.handle(ty);
        match &handle.descriptor().kind {
            TypeKind::Primitive(primitive) => {
                self.finish_inline(primitive_schema(*primitive), handle, repository)
            }
            TypeKind::File => self.finish_inline(Schema::binary(), handle, repository),
            TypeKind::Any => self.finish_inline(Schema::default(), handle, repository),
            TypeKind::Nullable(inner) => {
                let schema = self.generate_schema(*inner, types, repository)?;
                let metadata = MemberMetadata {
                    nullable: true,
                    ..MemberMetadata::default()
                };
                Ok(self.apply_member_metadata(schema, metadata))
            }
            TypeKind::Enum(descriptor) => self.generate_enum(handle, descriptor, repository),
            TypeKind::Dictionary { key, value } => {
                self.generate_dictionary(handle, *key, *value, repository)
            }
            TypeKind::Array(element) => self.generate_array(handle, *element, false, repository),
            TypeKind::Set(element) => self.generate_array(handle, *element, true, repository),
            TypeKind::Object => self.generate_object(handle, repository),
        }
    }

    /// Schema of a property, carrying the property's own annotations
    ///
    /// # Errors
    ///
    /// Propagates [`generate_schema`](Self::generate_schema) failures.
    pub fn generate_member_schema(
        &self,
        property: &PropertyDescriptor,
        types: &TypeCatalog,
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        let schema = self.generate_schema(property.ty, types, repository)?;

        let mut description = property.description.clone();
        if description.is_none() && self.options.use_all_of_to_extend_reference_schemas {
            description = schema
                .reference_id()
                .and_then(|id| repository.definition(id))
                .and_then(|definition| definition.description.clone());
        }

        let metadata = MemberMetadata {
            nullable: self.is_nullable_member(property, types),
            default: property.default.clone(),
            deprecated: property.obsolete,
            description,
        };
        Ok(self.apply_member_metadata(schema, metadata))
    }

    /// Whether a property is listed in its object's `required`
    fn is_required_member(&self, property: &PropertyDescriptor, types: &TypeCatalog) -> bool {
        property.required
            || (self.options.non_nullable_reference_types_as_required
                && !property.nullable
                && is_reference_like(&types.get(property.ty).kind))
    }

    fn is_nullable_member(&self, property: &PropertyDescriptor, types: &TypeCatalog) -> bool {
        let kind = &types.get(property.ty).kind;
        if matches!(kind, TypeKind::Nullable(_)) {
            // already marked while generating the wrapped type
            return false;
        }
        property.nullable
            || (!self.options.support_non_nullable_reference_types && is_reference_like(kind))
    }

    /// Add use-site annotations. References can only carry them through an
    /// `allOf` wrapper, and only when that is enabled.
    fn apply_member_metadata(&self, schema: SchemaRef, metadata: MemberMetadata) -> SchemaRef {
        if metadata.is_empty() {
            return schema;
        }
        match schema {
            SchemaRef::Inline(mut inline) => {
                apply_metadata(&mut inline, metadata);
                SchemaRef::Inline(inline)
            }
            SchemaRef::Ref(reference) if self.options.use_all_of_to_extend_reference_schemas => {
                let mut wrapper = Schema {
                    all_of: vec![SchemaRef::Ref(reference)],
                    ..Schema::default()
                };
                apply_metadata(&mut wrapper, metadata);
                SchemaRef::inline(wrapper)
            }
            reference @ SchemaRef::Ref(_) => reference,
        }
    }

    /// Component schema for `ty`, built by `build` on first use
    fn generate_referenced<F>(
        &self,
        ty: TypeHandle<'_>,
        repository: &mut SchemaRepository,
        build: F,
    ) -> Result<SchemaRef>
    where
        F: FnOnce(&mut SchemaRepository) -> Result<Schema>,
    {
        if let Some(schema_id) = repository.schema_id_for(ty.id()) {
            return Ok(SchemaRef::reference(schema_id));
        }

        let schema_id = (self.options.schema_id_selector)(ty);
        repository.get_or_add(ty, schema_id, |repository| {
            let mut schema = build(repository)?;
            self.apply_filters(&mut schema, ty, repository)?;
            Ok(schema)
        })
    }

    fn finish_inline(
        &self,
        mut schema: Schema,
        ty: TypeHandle<'_>,
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        self.apply_filters(&mut schema, ty, repository)?;
        Ok(SchemaRef::inline(schema))
    }

    fn apply_filters(
        &self,
        schema: &mut Schema,
        ty: TypeHandle<'_>,
        repository: &mut SchemaRepository,
    ) -> Result<()> {
        if self.options.schema_filters.is_empty() {
            return Ok(());
        }
        let mut context = SchemaFilterContext {
            ty,
            schema_generator: self,
            repository,
        };
        for filter in &self.options.schema_filters {
            filter
                .apply(schema, &mut context)
                .map_err(GeneratorError::filter(FilterKind::Schema))?;
        }
        Ok(())
    }
}

fn apply_metadata(schema: &mut Schema, metadata: MemberMetadata) {
    if metadata.nullable {
        schema.nullable = Some(true);
    }
    if metadata.default.is_some() {
        schema.default = metadata.default;
    }
    if metadata.deprecated {
        schema.deprecated = Some(true);
    }
    if schema.description.is_none() {
        schema.description = metadata.description;
    }
}

/// Types whose values may be absent unless annotated otherwise
const fn is_reference_like(kind: &TypeKind) -> bool {
    match kind {
        TypeKind::Primitive(primitive) => matches!(
            primitive,
            PrimitiveType::String | PrimitiveType::Uri | PrimitiveType::Bytes
        ),
        TypeKind::Array(_)
        | TypeKind::Set(_)
        | TypeKind::Dictionary { .. }
        | TypeKind::Object
        | TypeKind::Any
        | TypeKind::File => true,
        TypeKind::Enum(_) | TypeKind::Nullable(_) => false,
    }
}
