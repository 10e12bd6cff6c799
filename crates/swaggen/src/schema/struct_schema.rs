use indexmap::IndexMap;
use swaggen_core::schema::{Discriminator, SCHEMA_REF_PREFIX, Schema, SchemaRef};

use super::SchemaGenerator;
use crate::error::Result;
use crate::repository::SchemaRepository;
use crate::types::{PropertyDescriptor, TypeHandle, TypeId};

impl SchemaGenerator {
    /// Objects are always components. With polymorphism enabled, a base type
    /// with known subtypes is described at its use sites as a `oneOf` over the
    /// concrete candidates.
    pub(super) fn generate_object(
        &self,
        ty: TypeHandle<'_>,
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        if self.options.use_one_of_for_polymorphism {
            let subtypes = (self.options.sub_types_selector)(ty);
            if !subtypes.is_empty() {
                return self.generate_polymorphic(ty, &subtypes, repository);
            }
        }
        self.generate_concrete(ty, repository)
    }

    fn generate_concrete(
        &self,
        ty: TypeHandle<'_>,
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        self.generate_referenced(ty, repository, |repository| {
            self.object_definition(ty, repository)
        })
    }

    fn generate_polymorphic(
        &self,
        ty: TypeHandle<'_>,
        subtypes: &[TypeId],
        repository: &mut SchemaRepository,
    ) -> Result<SchemaRef> {
        let types = ty.catalog();
        let candidates: Vec<TypeHandle<'_>> = (!ty.is_abstract)
            .then_some(ty)
            .into_iter()
            .chain(subtypes.iter().map(|id| types.handle(*id)))
            .collect();

        let mut schema = Schema::default();
        for candidate in &candidates {
            schema
                .one_of
                .push(self.generate_concrete(*candidate, repository)?);
        }
        schema.discriminator = self.discriminator(ty, &candidates, repository);

        self.finish_inline(schema, ty, repository)
    }

    fn object_definition(
        &self,
        ty: TypeHandle<'_>,
        repository: &mut SchemaRepository,
    ) -> Result<Schema> {
        let types = ty.catalog();
        let mut schema = Schema::object();

        let known_base = self.known_base(ty);
        let properties = if known_base.is_some() {
            ty.properties.iter().collect()
        } else {
            flattened_properties(ty)
        };

        for property in properties {
            if property.excluded || (property.obsolete && self.options.ignore_obsolete_properties)
            {
                continue;
            }
            let member = self.generate_member_schema(property, types, repository)?;
            schema.properties.insert(property.name.clone(), member);
            if self.is_required_member(property, types) && !schema.required.contains(&property.name)
            {
                schema.required.push(property.name.clone());
            }
        }

        if let Some(base) = known_base {
            schema.all_of.push(self.generate_concrete(base, repository)?);
        }

        if self.options.use_all_of_for_inheritance || self.options.use_one_of_for_polymorphism {
            let subtypes = (self.options.sub_types_selector)(ty);
            if !subtypes.is_empty() {
                let candidates: Vec<TypeHandle<'_>> = std::iter::once(ty)
                    .chain(subtypes.iter().map(|id| types.handle(*id)))
                    .collect();
                if let Some(discriminator) = self.discriminator(ty, &candidates, repository) {
                    let name = discriminator.property_name.clone();
                    schema
                        .properties
                        .entry(name.clone())
                        .or_insert_with(|| SchemaRef::inline(Schema::string()));
                    if !schema.required.contains(&name) {
                        schema.required.push(name);
                    }
                    schema.discriminator = Some(discriminator);
                }
            }
        }

        Ok(schema)
    }

    /// Base type that lists `ty` among its subtypes, when inheritance is
    /// expressed through `allOf`
    fn known_base<'a>(&self, ty: TypeHandle<'a>) -> Option<TypeHandle<'a>> {
        if !self.options.use_all_of_for_inheritance {
            return None;
        }
        let base = ty.base()?;
        (base.is_object() && (self.options.sub_types_selector)(base).contains(&ty.id()))
            .then_some(base)
    }

    /// Discriminator for a base type, mapping each candidate's value to its
    /// component schema. Candidates without a value are left out.
    fn discriminator(
        &self,
        base: TypeHandle<'_>,
        candidates: &[TypeHandle<'_>],
        repository: &SchemaRepository,
    ) -> Option<Discriminator> {
        let property_name = (self.options.discriminator_name_selector)(base)?;
        let mut mapping = IndexMap::new();
        for candidate in candidates {
            let Some(value) = (self.options.discriminator_value_selector)(*candidate) else {
                continue;
            };
            let schema_id = repository
                .schema_id_for(candidate.id())
                .map_or_else(|| (self.options.schema_id_selector)(*candidate), str::to_string);
            mapping.insert(value, format!("{SCHEMA_REF_PREFIX}{schema_id}"));
        }
        Some(Discriminator {
            property_name,
            mapping,
        })
    }
}

/// Properties of `ty` and all of its ancestors, ancestors first
fn flattened_properties<'a>(ty: TypeHandle<'a>) -> Vec<&'a PropertyDescriptor> {
    let mut chain = vec![ty];
    let mut current = ty.base();
    while let Some(base) = current {
        if chain.iter().any(|seen| seen.id() == base.id()) {
            break;
        }
        chain.push(base);
        current = base.base();
    }

    let mut properties: Vec<&'a PropertyDescriptor> = Vec::new();
    for handle in chain.into_iter().rev() {
        for property in &handle.descriptor().properties {
            if let Some(idx) = properties.iter().position(|p| p.name == property.name) {
                properties[idx] = property;
            } else {
                properties.push(property);
            }
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::super::tests::generate;
    use super::*;
    use crate::options::SchemaGeneratorOptions;
    use crate::types::{PrimitiveType, TypeCatalog, TypeDescriptor};
    use serde_json::json;

    fn pets() -> (TypeCatalog, TypeId, TypeId, TypeId) {
        let mut types = TypeCatalog::new();
        let string = types.primitive(PrimitiveType::String);
        let int = types.primitive(PrimitiveType::Int32);
        let animal = types.register(
            TypeDescriptor::object("Animal")
                .into_abstract()
                .with_property(PropertyDescriptor::new("Name", string).required()),
        );
        let dog = types.register(
            TypeDescriptor::object("Dog")
                .with_base(animal)
                .with_property(PropertyDescriptor::new("Barks", int)),
        );
        let cat = types.register(
            TypeDescriptor::object("Cat")
                .with_base(animal)
                .with_property(PropertyDescriptor::new("Lives", int)),
        );
        (types, animal, dog, cat)
    }

    #[test]
    fn object_properties_and_required_follow_declaration_order() {
        let mut types = TypeCatalog::new();
        let string = types.primitive(PrimitiveType::String);
        let int = types.primitive(PrimitiveType::Int32);
        let widget = types.register(
            TypeDescriptor::object("Widget")
                .with_property(PropertyDescriptor::new("Name", string).required())
                .with_property(PropertyDescriptor::new("Secret", string).excluded())
                .with_property(PropertyDescriptor::new("Count", int))
                .with_property(PropertyDescriptor::new("Id", int).required()),
        );

        let (schema, repository) = generate(&SchemaGenerator::default(), &types, widget);

        assert_eq!(schema.reference_id(), Some("Widget"));
        let definition = repository.definition("Widget").unwrap();
        assert_eq!(
            serde_json::to_value(definition).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "Name": { "type": "string", "nullable": true },
                    "Count": { "type": "integer", "format": "int32" },
                    "Id": { "type": "integer", "format": "int32" }
                },
                "required": ["Name", "Id"]
            })
        );
    }

    #[test]
    fn obsolete_properties_are_deprecated_or_dropped() {
        let mut types = TypeCatalog::new();
        let int = types.primitive(PrimitiveType::Int32);
        let legacy = types.register(
            TypeDescriptor::object("Legacy")
                .with_property(PropertyDescriptor::new("Old", int).obsolete())
                .with_property(PropertyDescriptor::new("New", int)),
        );

        let (_, repository) = generate(&SchemaGenerator::default(), &types, legacy);
        let definition = repository.definition("Legacy").unwrap();
        assert_eq!(
            definition.properties["Old"].as_inline().unwrap().deprecated,
            Some(true)
        );

        let generator =
            SchemaGenerator::new(SchemaGeneratorOptions::default().ignore_obsolete_properties());
        let (_, repository) = generate(&generator, &types, legacy);
        let definition = repository.definition("Legacy").unwrap();
        assert!(!definition.properties.contains_key("Old"));
        assert!(definition.properties.contains_key("New"));
    }

    #[test]
    fn self_referencing_type_terminates() {
        let mut types = TypeCatalog::new();
        let node = types.register(TypeDescriptor::object("Node"));
        let children = types.array(node);
        types
            .get_mut(node)
            .properties
            .push(PropertyDescriptor::new("Children", children));

        let (schema, repository) = generate(&SchemaGenerator::default(), &types, node);

        assert_eq!(schema.reference_id(), Some("Node"));
        assert_eq!(repository.len(), 1);
        let children = repository.definition("Node").unwrap().properties["Children"]
            .as_inline()
            .unwrap();
        assert_eq!(
            children.items.as_deref().and_then(SchemaRef::reference_id),
            Some("Node")
        );
    }

    #[test]
    fn non_nullable_reference_types_can_be_required() {
        let mut types = TypeCatalog::new();
        let string = types.primitive(PrimitiveType::String);
        let int = types.primitive(PrimitiveType::Int32);
        let person = types.register(
            TypeDescriptor::object("Person")
                .with_property(PropertyDescriptor::new("Name", string))
                .with_property(PropertyDescriptor::new("Nickname", string).nullable())
                .with_property(PropertyDescriptor::new("Age", int)),
        );
        let generator = SchemaGenerator::new(
            SchemaGeneratorOptions::default()
                .support_non_nullable_reference_types()
                .non_nullable_reference_types_as_required(),
        );

        let (_, repository) = generate(&generator, &types, person);

        let definition = repository.definition("Person").unwrap();
        assert_eq!(definition.required, vec!["Name".to_string()]);
        assert_eq!(definition.properties["Name"].as_inline().unwrap().nullable, None);
        assert_eq!(
            definition.properties["Nickname"].as_inline().unwrap().nullable,
            Some(true)
        );
    }

    #[test]
    fn non_nullable_references_are_required_without_changing_nullability() {
        let mut types = TypeCatalog::new();
        let string = types.primitive(PrimitiveType::String);
        let person = types.register(
            TypeDescriptor::object("Person")
                .with_property(PropertyDescriptor::new("Name", string))
                .with_property(PropertyDescriptor::new("Nickname", string).nullable()),
        );
        let generator = SchemaGenerator::new(
            SchemaGeneratorOptions::default().non_nullable_reference_types_as_required(),
        );

        let (_, repository) = generate(&generator, &types, person);

        let definition = repository.definition("Person").unwrap();
        assert_eq!(definition.required, vec!["Name".to_string()]);
        // Rendering still treats every reference type as nullable.
        assert_eq!(definition.properties["Name"].as_inline().unwrap().nullable, Some(true));
    }

    #[test]
    fn inherited_properties_are_flattened_by_default() {
        let (types, _, dog, _) = pets();

        let (_, repository) = generate(&SchemaGenerator::default(), &types, dog);

        let definition = repository.definition("Dog").unwrap();
        let names: Vec<_> = definition.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Name", "Barks"]);
        assert!(definition.all_of.is_empty());
        assert!(repository.definition("Animal").is_none());
    }

    #[test]
    fn all_of_inheritance_keeps_only_own_properties() {
        let (types, _, dog, _) = pets();
        let generator =
            SchemaGenerator::new(SchemaGeneratorOptions::default().use_all_of_for_inheritance());

        let (_, repository) = generate(&generator, &types, dog);

        let definition = repository.definition("Dog").unwrap();
        let names: Vec<_> = definition.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Barks"]);
        assert_eq!(definition.all_of, vec![SchemaRef::reference("Animal")]);
        let base = repository.definition("Animal").unwrap();
        assert!(base.properties.contains_key("Name"));
    }

    #[test]
    fn one_of_lists_concrete_subtypes() {
        let (types, animal, _, _) = pets();
        let generator =
            SchemaGenerator::new(SchemaGeneratorOptions::default().use_one_of_for_polymorphism());

        let (schema, repository) = generate(&generator, &types, animal);

        let inline = schema.as_inline().unwrap();
        assert_eq!(
            inline.one_of,
            vec![SchemaRef::reference("Dog"), SchemaRef::reference("Cat")]
        );
        assert!(inline.discriminator.is_none());
        // Without allOf the subtypes carry the inherited properties themselves.
        assert!(repository.definition("Animal").is_none());
        let dog = repository.definition("Dog").unwrap();
        assert!(dog.all_of.is_empty());
        let names: Vec<_> = dog.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Name", "Barks"]);
    }

    #[test]
    fn concrete_base_is_its_own_candidate() {
        let mut types = TypeCatalog::new();
        let shape = types.register(TypeDescriptor::object("Shape"));
        types.register(TypeDescriptor::object("Circle").with_base(shape));
        let generator =
            SchemaGenerator::new(SchemaGeneratorOptions::default().use_one_of_for_polymorphism());

        let (schema, _) = generate(&generator, &types, shape);

        assert_eq!(
            schema.as_inline().unwrap().one_of,
            vec![SchemaRef::reference("Shape"), SchemaRef::reference("Circle")]
        );
    }

    fn discriminating(options: SchemaGeneratorOptions) -> SchemaGenerator {
        SchemaGenerator::new(
            options
                .select_discriminator_name_using(|ty| {
                    (ty.name == "Animal").then(|| "kind".to_string())
                })
                .select_discriminator_value_using(|ty| match ty.name.as_str() {
                    "Dog" => Some("dog".to_string()),
                    "Cat" => Some("cat".to_string()),
                    _ => None,
                }),
        )
    }

    #[test]
    fn discriminator_maps_values_to_subtype_schemas() {
        let (types, animal, _, _) = pets();
        let generator = discriminating(
            SchemaGeneratorOptions::default()
                .use_all_of_for_inheritance()
                .use_one_of_for_polymorphism(),
        );

        let (schema, repository) = generate(&generator, &types, animal);

        let expected = json!({
            "propertyName": "kind",
            "mapping": {
                "dog": "#/components/schemas/Dog",
                "cat": "#/components/schemas/Cat"
            }
        });
        let inline = schema.as_inline().unwrap();
        assert_eq!(serde_json::to_value(&inline.discriminator).unwrap(), expected);

        let base = repository.definition("Animal").unwrap();
        assert_eq!(serde_json::to_value(&base.discriminator).unwrap(), expected);
        assert_eq!(
            base.properties["kind"],
            SchemaRef::inline(Schema::string())
        );
        assert!(base.required.contains(&"kind".to_string()));
    }

    #[test]
    fn one_of_at_use_sites_and_all_of_in_subtypes_combine() {
        let (types, animal, _, _) = pets();
        let generator = SchemaGenerator::new(
            SchemaGeneratorOptions::default()
                .use_all_of_for_inheritance()
                .use_one_of_for_polymorphism(),
        );

        let (schema, repository) = generate(&generator, &types, animal);

        assert_eq!(
            schema.as_inline().unwrap().one_of,
            vec![SchemaRef::reference("Dog"), SchemaRef::reference("Cat")]
        );
        for subtype in ["Dog", "Cat"] {
            let definition = repository.definition(subtype).unwrap();
            assert_eq!(definition.all_of, vec![SchemaRef::reference("Animal")]);
            assert!(!definition.properties.contains_key("Name"));
        }
    }
}
