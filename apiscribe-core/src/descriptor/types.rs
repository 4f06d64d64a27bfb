use serde_json::Value;
use std::fmt;

/// Scalar shapes a [`TypeDescriptor`] can bottom out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Date,
    DateTime,
    Uuid,
    /// Base64-encoded bytes.
    Byte,
    /// Raw octets.
    Binary,
    /// Any JSON value.
    Any,
}

impl Primitive {
    /// Whether values of this primitive serialize as JSON strings.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            Primitive::String
                | Primitive::Date
                | Primitive::DateTime
                | Primitive::Uuid
                | Primitive::Byte
                | Primitive::Binary
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Primitive::Int32 | Primitive::Int64 | Primitive::UInt32 | Primitive::UInt64
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::Boolean => "boolean",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::UInt32 => "uint32",
            Primitive::UInt64 => "uint64",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Date => "date",
            Primitive::DateTime => "date-time",
            Primitive::Uuid => "uuid",
            Primitive::Byte => "byte",
            Primitive::Binary => "binary",
            Primitive::Any => "any",
        };
        f.write_str(name)
    }
}

/// Canonical identity of a named type.
///
/// `key` decides whether two descriptors denote the same type (it is never
/// derived from the shape), `name` is the human name used for the component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub key: String,
    pub name: String,
}

impl TypeName {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }

    /// Identity taken from the Rust type itself.
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(std::any::type_name::<T>(), name)
    }
}

/// A single property of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub deprecated: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            description: None,
            deprecated: false,
        }
    }

    /// Mark the field as omittable.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// A field lands in the parent's `required` list only when it is declared
    /// required, is not nullable and carries no default.
    pub fn is_required(&self) -> bool {
        self.required && !self.ty.is_nullable() && self.default.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    /// `None` for anonymous, inline-only objects.
    pub name: Option<TypeName>,
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

impl ObjectType {
    /// Start describing a named object whose identity is the Rust type `T`.
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> ObjectBuilder {
        ObjectBuilder::new(Some(TypeName::of::<T>(name)))
    }

    /// Start describing a named object with an explicit identity.
    pub fn with_name(name: TypeName) -> ObjectBuilder {
        ObjectBuilder::new(Some(name))
    }

    pub fn anonymous() -> ObjectBuilder {
        ObjectBuilder::new(None)
    }
}

/// Accumulates the fields of an [`ObjectType`] and finalizes it once.
#[derive(Debug)]
pub struct ObjectBuilder {
    name: Option<TypeName>,
    description: Option<String>,
    fields: Vec<Field>,
}

impl ObjectBuilder {
    fn new(name: Option<TypeName>) -> Self {
        Self {
            name,
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push(Field::new(name, ty));
        self
    }

    /// Add a field that may be omitted.
    pub fn optional_field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push(Field::new(name, ty).optional());
        self
    }

    /// Add a fully configured field.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::Object(ObjectType {
            name: self.name,
            description: self.description,
            fields: self.fields,
        })
    }
}

/// A closed set of string values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: Option<TypeName>,
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn named<T: ?Sized + 'static>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> TypeDescriptor {
        TypeDescriptor::Enum(EnumType {
            name: Some(TypeName::of::<T>(name)),
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn anonymous(values: impl IntoIterator<Item = impl Into<String>>) -> TypeDescriptor {
        TypeDescriptor::Enum(EnumType {
            name: None,
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        })
    }
}

/// One member of a polymorphic type, selected by `tag`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub tag: String,
    pub ty: TypeDescriptor,
}

/// A closed, discriminated set of variants.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub name: Option<TypeName>,
    pub description: Option<String>,
    pub discriminator: String,
    pub variants: Vec<Variant>,
}

impl UnionType {
    pub fn named<T: ?Sized + 'static>(
        name: impl Into<String>,
        discriminator: impl Into<String>,
    ) -> UnionBuilder {
        UnionBuilder {
            name: Some(TypeName::of::<T>(name)),
            description: None,
            discriminator: discriminator.into(),
            variants: Vec::new(),
        }
    }

    pub fn anonymous(discriminator: impl Into<String>) -> UnionBuilder {
        UnionBuilder {
            name: None,
            description: None,
            discriminator: discriminator.into(),
            variants: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct UnionBuilder {
    name: Option<TypeName>,
    description: Option<String>,
    discriminator: String,
    variants: Vec<Variant>,
}

impl UnionBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn variant(mut self, tag: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.variants.push(Variant {
            tag: tag.into(),
            ty,
        });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::Union(UnionType {
            name: self.name,
            description: self.description,
            discriminator: self.discriminator,
            variants: self.variants,
        })
    }
}

/// Reference to a named type described elsewhere.
///
/// `target` defers construction of the referenced descriptor, which is how
/// self-referential types are described without building an infinite value.
/// Without a target, the type must be reachable from some other descriptor
/// handed to the same document.
#[derive(Debug, Clone)]
pub struct NamedRef {
    pub name: TypeName,
    pub target: Option<fn() -> TypeDescriptor>,
}

impl PartialEq for NamedRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Shape of a type, as consumed by schema resolution.
///
/// Immutable once built; frontends (hand-written [`Describe`](crate::Describe)
/// impls, builders) produce these values and the engine never mutates them.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Object(ObjectType),
    Array {
        items: Box<TypeDescriptor>,
        unique: bool,
    },
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Enum(EnumType),
    Nullable(Box<TypeDescriptor>),
    Union(UnionType),
    Reference(NamedRef),
    /// An unbound generic parameter. Never resolvable.
    Generic(String),
}

impl TypeDescriptor {
    pub fn boolean() -> Self {
        Self::Primitive(Primitive::Boolean)
    }

    pub fn int32() -> Self {
        Self::Primitive(Primitive::Int32)
    }

    pub fn int64() -> Self {
        Self::Primitive(Primitive::Int64)
    }

    pub fn float() -> Self {
        Self::Primitive(Primitive::Float)
    }

    pub fn double() -> Self {
        Self::Primitive(Primitive::Double)
    }

    pub fn string() -> Self {
        Self::Primitive(Primitive::String)
    }

    pub fn date_time() -> Self {
        Self::Primitive(Primitive::DateTime)
    }

    pub fn binary() -> Self {
        Self::Primitive(Primitive::Binary)
    }

    pub fn any() -> Self {
        Self::Primitive(Primitive::Any)
    }

    pub fn array(items: TypeDescriptor) -> Self {
        Self::Array {
            items: Box::new(items),
            unique: false,
        }
    }

    /// An array whose items are distinct.
    pub fn set(items: TypeDescriptor) -> Self {
        Self::Array {
            items: Box::new(items),
            unique: true,
        }
    }

    /// A string-keyed map.
    pub fn map(value: TypeDescriptor) -> Self {
        Self::map_with_key(Self::string(), value)
    }

    pub fn map_with_key(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn nullable(inner: TypeDescriptor) -> Self {
        match inner {
            already @ Self::Nullable(_) => already,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Reference to `T` whose body is produced by `T::describe` when needed.
    pub fn recursive<T: crate::Describe + 'static>(name: impl Into<String>) -> Self {
        Self::Reference(NamedRef {
            name: TypeName::of::<T>(name),
            target: Some(T::describe),
        })
    }

    /// Reference by identity only; the definition must come from elsewhere.
    pub fn named_ref(name: TypeName) -> Self {
        Self::Reference(NamedRef { name, target: None })
    }

    pub fn generic(param: impl Into<String>) -> Self {
        Self::Generic(param.into())
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// The descriptor with any nullable wrapper removed.
    pub fn non_null(&self) -> &TypeDescriptor {
        match self {
            Self::Nullable(inner) => inner.non_null(),
            other => other,
        }
    }

    /// Identity of the type if it is a named kind.
    pub fn type_name(&self) -> Option<&TypeName> {
        match self {
            Self::Object(o) => o.name.as_ref(),
            Self::Enum(e) => e.name.as_ref(),
            Self::Union(u) => u.name.as_ref(),
            Self::Reference(r) => Some(&r.name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Object(ObjectType { name: Some(n), .. })
            | Self::Enum(EnumType { name: Some(n), .. })
            | Self::Union(UnionType { name: Some(n), .. }) => f.write_str(&n.name),
            Self::Reference(r) => f.write_str(&r.name.name),
            Self::Object(_) => f.write_str("object"),
            Self::Enum(_) => f.write_str("enum"),
            Self::Union(_) => f.write_str("union"),
            Self::Array { items, unique: false } => write!(f, "array<{items}>"),
            Self::Array { items, unique: true } => write!(f, "set<{items}>"),
            Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Nullable(inner) => write!(f, "{inner}?"),
            Self::Generic(param) => f.write_str(param),
        }
    }
}
