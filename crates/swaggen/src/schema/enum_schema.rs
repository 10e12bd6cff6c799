use swaggen_core::schema::{Schema, SchemaRef, SchemaType};

use super::SchemaGenerator;
use crate::error::Result;
use crate::repository::SchemaRepository;
use crate::types::{EnumDescriptor, EnumRepr, TypeHandle};

/// Schema listing the enum's values in declaration order
#[must_use]
pub fn enum_schema(descriptor: &EnumDescriptor) -> Schema {
    let mut schema = match descriptor.repr {
        EnumRepr::Int32 => Schema::formatted(SchemaType::Integer, "int32"),
        EnumRepr::Int64 => Schema::formatted(SchemaType::Integer, "int64"),
        EnumRepr::String => Schema::string(),
    };
    schema.r#enum = descriptor
        .members
        .iter()
        .map(|member| member.value.clone())
        .collect();
    schema
}

impl SchemaGenerator {
    pub(super) fn generate_enum(
        &self,
        ty: TypeHandle<'_>,
        descriptor: &EnumDescriptor,
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        if self.options.use_inline_definitions_for_enums {
            return self.finish_inline(enum_schema(descriptor), ty, repository);
        }
        self.generate_referenced(ty, repository, |_| Ok(enum_schema(descriptor)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::generate;
    use super::*;
    use crate::options::SchemaGeneratorOptions;
    use crate::types::{EnumMember, TypeCatalog, TypeDescriptor};
    use serde_json::json;

    #[test]
    fn enums_are_referenced_by_default() {
        let mut types = TypeCatalog::new();
        let status = types.register(TypeDescriptor::enumeration(
            "Status",
            EnumDescriptor::integer([("Active", 1), ("Suspended", 4), ("Closed", 2)]),
        ));

        let (schema, repository) = generate(&SchemaGenerator::default(), &types, status);

        assert_eq!(schema.reference_id(), Some("Status"));
        let definition = repository.definition("Status").unwrap();
        assert_eq!(
            serde_json::to_value(definition).unwrap(),
            json!({ "type": "integer", "format": "int32", "enum": [1, 4, 2] })
        );
    }

    #[test]
    fn inline_enums_are_not_registered() {
        let mut types = TypeCatalog::new();
        let color = types.register(TypeDescriptor::enumeration(
            "Color",
            EnumDescriptor::strings(["Red", "Green", "Blue"]),
        ));
        let generator = SchemaGenerator::new(
            SchemaGeneratorOptions::default().use_inline_definitions_for_enums(),
        );

        let (schema, repository) = generate(&generator, &types, color);

        assert!(repository.is_empty());
        let inline = schema.as_inline().unwrap();
        assert_eq!(inline.schema_type, Some(SchemaType::String));
        assert_eq!(inline.r#enum, vec![json!("Red"), json!("Green"), json!("Blue")]);
    }

    #[test]
    fn wide_enums_use_int64() {
        let descriptor = EnumDescriptor {
            repr: EnumRepr::Int64,
            members: vec![EnumMember {
                name: "Huge".to_string(),
                value: json!(5_000_000_000_i64),
            }],
        };

        let schema = enum_schema(&descriptor);

        assert_eq!(schema.format.as_deref(), Some("int64"));
        assert_eq!(schema.r#enum, vec![json!(5_000_000_000_i64)]);
    }
}
