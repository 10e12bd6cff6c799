use swaggen_core::schema::{AdditionalProperties, Schema, SchemaRef, SchemaType};

use super::SchemaGenerator;
use crate::error::Result;
use crate::repository::SchemaRepository;
use crate::types::{PrimitiveType, TypeHandle, TypeId, TypeKind};

/// Fixed inline schema of a primitive type
#[must_use]
pub fn primitive_schema(primitive: PrimitiveType) -> Schema {
    use PrimitiveType as P;

    match primitive {
        P::Boolean => Schema::boolean(),
        P::Byte | P::SByte | P::Int16 | P::UInt16 | P::Int32 | P::UInt32 => {
            Schema::formatted(SchemaType::Integer, "int32")
        }
        P::Int64 | P::UInt64 => Schema::formatted(SchemaType::Integer, "int64"),
        P::Single => Schema::formatted(SchemaType::Number, "float"),
        P::Double | P::Decimal => Schema::formatted(SchemaType::Number, "double"),
        P::Char | P::String => Schema::string(),
        P::DateTime | P::DateTimeOffset => Schema::formatted(SchemaType::String, "date-time"),
        P::Date => Schema::formatted(SchemaType::String, "date"),
        P::Time => Schema::formatted(SchemaType::String, "time"),
        P::TimeSpan => Schema::formatted(SchemaType::String, "date-span"),
        P::Guid => Schema::formatted(SchemaType::String, "uuid"),
        P::Uri => Schema::formatted(SchemaType::String, "uri"),
        P::Bytes => Schema::formatted(SchemaType::String, "byte"),
    }
}

impl SchemaGenerator {
    pub(super) fn generate_array(
        &self,
        ty: TypeHandle<'_>,
        element: TypeId,
        unique: bool,
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        let items = self.generate_schema(element, ty.catalog(), repository)?;
        let mut schema = Schema::array(items);
        if unique {
            schema.unique_items = Some(true);
        }
        self.finish_inline(schema, ty, repository)
    }

    /// Dictionaries keyed by an enum list every member as a property; other
    /// keys are free-form.
    pub(super) fn generate_dictionary(
        &self,
        ty: TypeHandle<'_>,
        key: TypeId,
        value: TypeId,
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        let types = ty.catalog();
        let value_schema = self.generate_schema(value, types, repository)?;

        let mut schema = Schema::object();
        if let TypeKind::Enum(descriptor) = &types.get(key).kind {
            for member in &descriptor.members {
                schema
                    .properties
                    .insert(member.name.clone(), value_schema.clone());
            }
            schema.additional_properties = Some(AdditionalProperties::Allowed(false));
        } else {
            schema.additional_properties =
                Some(AdditionalProperties::Schema(Box::new(value_schema)));
        }
        self.finish_inline(schema, ty, repository)
    }
}
