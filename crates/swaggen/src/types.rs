//! Type descriptions consumed by the schema generator.
//!
//! Descriptors live in a [`TypeCatalog`] arena and point at each other through
//! [`TypeId`] handles, which lets recursive types (a `Node` holding a list of
//! `Node`s) be described without reference cycles. The catalog interns
//! descriptors by qualified name and generic arguments, so two handles are equal
//! exactly when they denote the same structural type.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use serde_json::Value;

/// Handle to a descriptor stored in a [`TypeCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

/// Scalar and well-known types with a fixed schema mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Char,
    String,
    DateTime,
    DateTimeOffset,
    Date,
    Time,
    TimeSpan,
    Guid,
    Uri,
    /// Raw byte content, serialized as base64
    Bytes,
}

impl PrimitiveType {
    /// Name used for identity and schema ids
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::SByte => "SByte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Char => "Char",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::Date => "DateOnly",
            Self::Time => "TimeOnly",
            Self::TimeSpan => "TimeSpan",
            Self::Guid => "Guid",
            Self::Uri => "Uri",
            Self::Bytes => "Byte[]",
        }
    }
}

/// Underlying representation of enum members
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRepr {
    Int32,
    Int64,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub repr: EnumRepr,
    /// Members in declaration order
    pub members: Vec<EnumMember>,
}

impl EnumDescriptor {
    /// Integer-backed enum from `(name, value)` pairs
    pub fn integer<'a>(members: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        Self {
            repr: EnumRepr::Int32,
            members: members
                .into_iter()
                .map(|(name, value)| EnumMember {
                    name: name.to_string(),
                    value: Value::from(value),
                })
                .collect(),
        }
    }

    /// Enum serialized by member name
    pub fn strings<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            repr: EnumRepr::String,
            members: names
                .into_iter()
                .map(|name| EnumMember {
                    name: name.to_string(),
                    value: Value::from(name),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Enum(EnumDescriptor),
    Array(TypeId),
    /// Collection without duplicates
    Set(TypeId),
    Dictionary {
        key: TypeId,
        value: TypeId,
    },
    /// Complex type described by its properties
    Object,
    /// Dynamic payload with no fixed shape
    Any,
    /// Uploaded file
    File,
    Nullable(TypeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeId,
    pub required: bool,
    pub nullable: bool,
    pub default: Option<Value>,
    /// Explicitly ignored for documentation purposes
    pub excluded: bool,
    pub obsolete: bool,
    pub description: Option<String>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            nullable: false,
            default: None,
            excluded: false,
            obsolete: false,
            description: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    #[must_use]
    pub fn obsolete(mut self) -> Self {
        self.obsolete = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Simple name; generic definitions may carry an arity marker (``Pair`2``)
    pub name: String,
    pub namespace: Option<String>,
    pub kind: TypeKind,
    pub generic_args: Vec<TypeId>,
    /// Declared properties, in declaration order
    pub properties: Vec<PropertyDescriptor>,
    pub base_type: Option<TypeId>,
    pub is_abstract: bool,
}

impl TypeDescriptor {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            kind,
            generic_args: Vec::new(),
            properties: Vec::new(),
            base_type: None,
            is_abstract: false,
        }
    }

    /// Complex type described by its properties
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Object)
    }

    pub fn enumeration(name: impl Into<String>, descriptor: EnumDescriptor) -> Self {
        Self::new(name, TypeKind::Enum(descriptor))
    }

    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn with_generic_args(mut self, args: impl IntoIterator<Item = TypeId>) -> Self {
        self.generic_args = args.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: TypeId) -> Self {
        self.base_type = Some(base);
        self
    }

    #[must_use]
    pub fn into_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Name without any generic arity marker
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.name
            .find(['`', '<'])
            .map_or(self.name.as_str(), |idx| &self.name[..idx])
    }

    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey {
    namespace: Option<String>,
    name: String,
    args: Vec<TypeId>,
}

impl TypeKey {
    fn of(descriptor: &TypeDescriptor) -> Self {
        Self {
            namespace: descriptor.namespace.clone(),
            name: descriptor.name.clone(),
            args: descriptor.generic_args.clone(),
        }
    }
}

/// Arena of type descriptors
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    descriptors: Vec<TypeDescriptor>,
    interned: HashMap<TypeKey, TypeId>,
}

impl TypeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, returning the existing handle when an identical
    /// qualified name and argument list was registered before.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let key = TypeKey::of(&descriptor);
        if let Some(id) = self.interned.get(&key) {
            return *id;
        }
        let id = TypeId(self.descriptors.len());
        self.descriptors.push(descriptor);
        self.interned.insert(key, id);
        id
    }

    pub fn primitive(&mut self, primitive: PrimitiveType) -> TypeId {
        self.register(TypeDescriptor::new(
            primitive.name(),
            TypeKind::Primitive(primitive),
        ))
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.register(
            TypeDescriptor::new("Array`1", TypeKind::Array(element)).with_generic_args([element]),
        )
    }

    pub fn set(&mut self, element: TypeId) -> TypeId {
        self.register(
            TypeDescriptor::new("Set`1", TypeKind::Set(element)).with_generic_args([element]),
        )
    }

    pub fn dictionary(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.register(
            TypeDescriptor::new("Dictionary`2", TypeKind::Dictionary { key, value })
                .with_generic_args([key, value]),
        )
    }

    pub fn nullable(&mut self, inner: TypeId) -> TypeId {
        self.register(
            TypeDescriptor::new("Nullable`1", TypeKind::Nullable(inner)).with_generic_args([inner]),
        )
    }

    pub fn file(&mut self) -> TypeId {
        self.register(TypeDescriptor::new("File", TypeKind::File))
    }

    pub fn any(&mut self) -> TypeId {
        self.register(TypeDescriptor::new("Object", TypeKind::Any))
    }

    /// Look a descriptor up.
    ///
    /// # Panics
    ///
    /// Panics when `id` was issued by another catalog.
    #[must_use]
    pub fn get(&self, id: TypeId) -> &TypeDescriptor {
        &self.descriptors[id.0]
    }

    /// Mutable access, used to add properties after registration so a type can
    /// refer to itself.
    ///
    /// # Panics
    ///
    /// Panics when `id` was issued by another catalog.
    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeDescriptor {
        &mut self.descriptors[id.0]
    }

    #[must_use]
    pub const fn handle(&self, id: TypeId) -> TypeHandle<'_> {
        TypeHandle { catalog: self, id }
    }

    /// Every registered type, in registration order
    pub fn iter(&self) -> impl Iterator<Item = TypeHandle<'_>> {
        (0..self.descriptors.len()).map(|idx| self.handle(TypeId(idx)))
    }

    /// Types deriving from `base`, directly or transitively, in registration order
    #[must_use]
    pub fn subtypes_of(&self, base: TypeId) -> Vec<TypeId> {
        self.iter()
            .filter(|candidate| candidate.id() != base && candidate.derives_from(base))
            .map(|candidate| candidate.id())
            .collect()
    }
}

/// Borrowed view of one descriptor that can walk to related types
#[derive(Clone, Copy)]
pub struct TypeHandle<'a> {
    catalog: &'a TypeCatalog,
    id: TypeId,
}

impl<'a> TypeHandle<'a> {
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub const fn catalog(&self) -> &'a TypeCatalog {
        self.catalog
    }

    #[must_use]
    pub fn descriptor(&self) -> &'a TypeDescriptor {
        self.catalog.get(self.id)
    }

    pub fn generic_args(&self) -> impl Iterator<Item = TypeHandle<'a>> + use<'a> {
        let catalog = self.catalog;
        self.descriptor()
            .generic_args
            .iter()
            .map(move |id| catalog.handle(*id))
    }

    #[must_use]
    pub fn base(&self) -> Option<TypeHandle<'a>> {
        self.descriptor()
            .base_type
            .map(|id| self.catalog.handle(id))
    }

    /// Whether `ancestor` appears anywhere in the base type chain
    #[must_use]
    pub fn derives_from(&self, ancestor: TypeId) -> bool {
        let mut current = self.base();
        // A malformed catalog could loop; the chain can never be longer than the arena.
        for _ in 0..self.catalog.descriptors.len() {
            match current {
                Some(base) if base.id == ancestor => return true,
                Some(base) => current = base.base(),
                None => return false,
            }
        }
        false
    }

    /// Dotted qualified name with generic arguments, used in error messages
    #[must_use]
    pub fn full_name(&self) -> String {
        let descriptor = self.descriptor();
        let mut name = match &descriptor.namespace {
            Some(namespace) => format!("{namespace}.{}", descriptor.base_name()),
            None => descriptor.base_name().to_string(),
        };
        if !descriptor.generic_args.is_empty() {
            let args: Vec<String> = self.generic_args().map(|arg| arg.full_name()).collect();
            name.push('[');
            name.push_str(&args.join(","));
            name.push(']');
        }
        name
    }
}

impl Deref for TypeHandle<'_> {
    type Target = TypeDescriptor;

    fn deref(&self) -> &Self::Target {
        self.descriptor()
    }
}

impl fmt::Debug for TypeHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeHandle").field(&self.full_name()).finish()
    }
}
