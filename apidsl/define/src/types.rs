//! The closed set of types a design can express.
//!
//! Named types (user types and media types) live in the
//! [`Registry`](crate::Registry) arenas and are referenced by stable handles,
//! so a type graph may contain cycles without any owning reference cycle.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::attribute::AttributeDefinition;

/// Built-in scalar types.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use apidsl_define::Primitive;
///
/// assert_eq!(Primitive::DateTime.to_string(), "datetime");
/// assert_eq!(Primitive::from_str("integer").unwrap(), Primitive::Integer);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Integer,
    Number,
    String,
    DateTime,
    Uuid,
    /// Any JSON value.
    Any,
    /// A file upload, represented as a file name in examples.
    File,
}

impl Primitive {
    pub fn is_numeric(self) -> bool {
        matches!(self, Primitive::Integer | Primitive::Number)
    }
}

/// Handle to a media type stored in the registry arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MediaTypeId(pub(crate) usize);

/// Handle to a user type stored in the registry arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserTypeId(pub(crate) usize);

/// Handle to a resource stored in the registry arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(pub(crate) usize);

impl MediaTypeId {
    /// Position in the arena (declaration order).
    pub fn index(self) -> usize {
        self.0
    }
}

impl UserTypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl ResourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identity of a named type, used to detect recursion during example synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Media(MediaTypeId),
    User(UserTypeId),
}

/// Ordered mapping of attribute name to attribute.
pub type Object = IndexMap<String, AttributeDefinition>;

/// Array type: every element is described by one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayType {
    pub element: Box<AttributeDefinition>,
}

/// Map type with typed keys and values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapType {
    pub key: Box<AttributeDefinition>,
    pub value: Box<AttributeDefinition>,
}

/// The semantic type of an attribute.
///
/// ## Examples
///
/// ```
/// use apidsl_define::{DataType, Primitive};
///
/// let tags = DataType::array_of(Primitive::String);
/// assert_eq!(tags.name(), "array");
///
/// let counts = DataType::hash_of(Primitive::String, Primitive::Integer);
/// assert_eq!(counts.name(), "hash");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Primitive(Primitive),
    Object(Object),
    Array(ArrayType),
    Map(MapType),
    User(UserTypeId),
    Media(MediaTypeId),
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Primitive(Primitive::String)
    }
}

impl DataType {
    /// An array whose elements have the given type.
    pub fn array_of(element: impl Into<DataType>) -> Self {
        DataType::Array(ArrayType {
            element: Box::new(AttributeDefinition::new(element)),
        })
    }

    /// A map from `key` to `value`.
    pub fn hash_of(key: impl Into<DataType>, value: impl Into<DataType>) -> Self {
        DataType::Map(MapType {
            key: Box::new(AttributeDefinition::new(key)),
            value: Box::new(AttributeDefinition::new(value)),
        })
    }

    /// Short name of the type kind.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Primitive(Primitive::Boolean) => "boolean",
            DataType::Primitive(Primitive::Integer) => "integer",
            DataType::Primitive(Primitive::Number) => "number",
            DataType::Primitive(Primitive::String) => "string",
            DataType::Primitive(Primitive::DateTime) => "datetime",
            DataType::Primitive(Primitive::Uuid) => "uuid",
            DataType::Primitive(Primitive::Any) => "any",
            DataType::Primitive(Primitive::File) => "file",
            DataType::Object(_) => "object",
            DataType::Array(_) => "array",
            DataType::Map(_) => "hash",
            DataType::User(_) => "user type",
            DataType::Media(_) => "media type",
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            DataType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.primitive().is_some_and(Primitive::is_numeric)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Primitive(Primitive::String))
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            DataType::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            DataType::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            DataType::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn media_type(&self) -> Option<MediaTypeId> {
        match self {
            DataType::Media(id) => Some(*id),
            _ => None,
        }
    }

    pub fn user_type(&self) -> Option<UserTypeId> {
        match self {
            DataType::User(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Primitive> for DataType {
    fn from(p: Primitive) -> Self {
        DataType::Primitive(p)
    }
}

impl From<MediaTypeId> for DataType {
    fn from(id: MediaTypeId) -> Self {
        DataType::Media(id)
    }
}

impl From<UserTypeId> for DataType {
    fn from(id: UserTypeId) -> Self {
        DataType::User(id)
    }
}

impl From<Object> for DataType {
    fn from(obj: Object) -> Self {
        DataType::Object(obj)
    }
}

/// A type as written in a declaration.
///
/// Identifiers are looked up in the registry while declaration bodies run,
/// when every top-level declaration has already been registered, so they may
/// name types declared later in the design.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Data(DataType),
    /// Media type identifier or user type name.
    Identifier(String),
}

impl From<DataType> for TypeRef {
    fn from(ty: DataType) -> Self {
        TypeRef::Data(ty)
    }
}

impl From<Primitive> for TypeRef {
    fn from(p: Primitive) -> Self {
        TypeRef::Data(DataType::Primitive(p))
    }
}

impl From<MediaTypeId> for TypeRef {
    fn from(id: MediaTypeId) -> Self {
        TypeRef::Data(DataType::Media(id))
    }
}

impl From<UserTypeId> for TypeRef {
    fn from(id: UserTypeId) -> Self {
        TypeRef::Data(DataType::User(id))
    }
}

impl From<&str> for TypeRef {
    fn from(identifier: &str) -> Self {
        TypeRef::Identifier(identifier.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(identifier: String) -> Self {
        TypeRef::Identifier(identifier)
    }
}

/// A media type given either as a live handle or by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaRef {
    Handle(MediaTypeId),
    Identifier(String),
}

impl From<MediaTypeId> for MediaRef {
    fn from(id: MediaTypeId) -> Self {
        MediaRef::Handle(id)
    }
}

impl From<&str> for MediaRef {
    fn from(identifier: &str) -> Self {
        MediaRef::Identifier(identifier.to_string())
    }
}

impl From<String> for MediaRef {
    fn from(identifier: String) -> Self {
        MediaRef::Identifier(identifier)
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRef::Handle(id) => write!(f, "media type #{}", id.0),
            MediaRef::Identifier(identifier) => write!(f, "{identifier:?}"),
        }
    }
}
