//! Attribute definitions, validation rules and example state.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

use crate::error::{DslError, ErrorCollector, MultiError};
use crate::registry::Registry;
use crate::types::{DataType, Object, Primitive};

/// Example state of an attribute.
///
/// "Explicitly no example" ([`Example::Absent`]) is a distinct state from
/// "not computed yet" ([`Example::NotComputed`]): the generator fills the
/// latter and never touches the former.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Example {
    #[default]
    NotComputed,
    /// Declared in the design, used verbatim.
    Explicit(Value),
    /// Declared as having no example.
    Absent,
    /// Synthesized by the example generator.
    Generated(Value),
}

impl Example {
    /// The example value, if there is one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Example::Explicit(v) | Example::Generated(v) => Some(v),
            Example::NotComputed | Example::Absent => None,
        }
    }

    /// `true` for examples fixed by the design (a value or an explicit absence).
    pub fn is_declared(&self) -> bool {
        matches!(self, Example::Explicit(_) | Example::Absent)
    }
}

/// String formats understood by validation and example synthesis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Format {
    Email,
    Uri,
    DateTime,
    Uuid,
    Ipv4,
    Hostname,
}

/// Validation rules attached to an attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    /// Names of object members that must be present.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ValidationDefinition {
    pub fn is_empty(&self) -> bool {
        *self == ValidationDefinition::default()
    }
}

/// A typed field of an object, or the root of a named type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDefinition {
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "ValidationDefinition::is_empty")]
    pub validation: ValidationDefinition,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    pub example: Example,
    /// View used to render the attribute when its type is a media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip)]
    pub(crate) explicit_type: bool,
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            data_type: DataType::default(),
            description: None,
            validation: ValidationDefinition::default(),
            default_value: None,
            example: Example::NotComputed,
            view: None,
            explicit_type: false,
        }
    }
}

impl AttributeDefinition {
    /// Creates an attribute with an explicit type.
    pub fn new(data_type: impl Into<DataType>) -> Self {
        Self {
            data_type: data_type.into(),
            explicit_type: true,
            ..Self::default()
        }
    }

    /// Creates an attribute holding an empty inline object.
    pub fn object() -> Self {
        Self::new(DataType::Object(Object::new()))
    }

    /// `false` when the type was left to defaults or inheritance.
    pub fn has_explicit_type(&self) -> bool {
        self.explicit_type
    }

    /// Members of an inline object type.
    pub fn members(&self) -> Option<&Object> {
        self.data_type.as_object()
    }

    pub fn member(&self, name: &str) -> Option<&AttributeDefinition> {
        self.members().and_then(|obj| obj.get(name))
    }

    pub fn member_mut(&mut self, name: &str) -> Option<&mut AttributeDefinition> {
        self.data_type.as_object_mut().and_then(|obj| obj.get_mut(name))
    }

    /// Fills what this attribute leaves unspecified from `base`.
    ///
    /// The type is only taken over when none was declared explicitly.
    pub fn inherit(&mut self, base: &AttributeDefinition) {
        if !self.explicit_type {
            self.data_type = base.data_type.clone();
            self.explicit_type = base.explicit_type;
        }
        if self.description.is_none() {
            self.description = base.description.clone();
        }
        if self.validation.is_empty() {
            self.validation = base.validation.clone();
        }
        if self.default_value.is_none() {
            self.default_value = base.default_value.clone();
        }
    }

    /// Checks the attribute and, recursively, its nested attributes.
    ///
    /// ## Errors
    ///
    /// Returns every structural and resolution problem found, each attached
    /// to `context` or to the nested attribute that caused it.
    ///
    /// ## Examples
    ///
    /// ```
    /// use apidsl_define::{AttributeDefinition, Primitive, Registry};
    ///
    /// let registry = Registry::default();
    /// let mut att = AttributeDefinition::new(Primitive::Integer);
    /// att.validation.minimum = Some(10.0);
    /// att.validation.maximum = Some(1.0);
    ///
    /// let err = att.validate("attribute \"count\"", &registry).unwrap_err();
    /// assert!(err.to_string().contains("greater than maximum"));
    /// ```
    pub fn validate(&self, context: &str, registry: &Registry) -> Result<(), MultiError> {
        let mut errors = ErrorCollector::default();
        self.validate_into(context, registry, &mut errors);
        errors.into_result()
    }

    pub(crate) fn validate_into(
        &self,
        context: &str,
        registry: &Registry,
        errors: &mut ErrorCollector,
    ) {
        let v = &self.validation;
        let ty = &self.data_type;
        let structural = |message: String| DslError::structural(context, message);

        if let (Some(min), Some(max)) = (v.minimum, v.maximum)
            && min > max
        {
            errors.push(structural(format!(
                "minimum {min} is greater than maximum {max}"
            )));
        }
        if let (Some(min), Some(max)) = (v.min_length, v.max_length)
            && min > max
        {
            errors.push(structural(format!(
                "min length {min} is greater than max length {max}"
            )));
        }
        if (v.minimum.is_some() || v.maximum.is_some()) && !ty.is_numeric() {
            errors.push(structural(format!(
                "minimum and maximum only apply to numbers, not to {}",
                ty.name()
            )));
        }
        if ty.primitive() == Some(Primitive::Integer) {
            // Integer examples are synthesized as i64.
            let out_of_range = |bound: f64| !(bound >= i64::MIN as f64 && bound < i64::MAX as f64);
            for (name, bound) in [("minimum", v.minimum), ("maximum", v.maximum)] {
                if let Some(bound) = bound
                    && out_of_range(bound)
                {
                    errors.push(structural(format!(
                        "{name} {bound} is outside the 64-bit integer range"
                    )));
                }
            }
        }
        if (v.min_length.is_some() || v.max_length.is_some())
            && !matches!(
                ty,
                DataType::Primitive(Primitive::String) | DataType::Array(_) | DataType::Map(_)
            )
        {
            errors.push(structural(format!(
                "length validations only apply to strings, arrays and hashes, not to {}",
                ty.name()
            )));
        }
        if let Some(pattern) = &v.pattern {
            if !ty.is_string() {
                errors.push(structural(format!(
                    "pattern only applies to strings, not to {}",
                    ty.name()
                )));
            }
            if let Err(e) = Regex::new(pattern) {
                errors.push(structural(format!("invalid pattern {pattern:?}: {e}")));
            }
        }
        if let Some(format) = v.format
            && !ty.is_string()
        {
            errors.push(structural(format!(
                "format {format} only applies to strings, not to {}",
                ty.name()
            )));
        }
        for value in &v.enum_values {
            if !value_matches(value, ty) {
                errors.push(structural(format!(
                    "enum value {value} is not a valid {}",
                    ty.name()
                )));
            }
        }
        if let Some(default) = &self.default_value {
            self.validate_default(default, context, errors);
        }
        if !v.required.is_empty() {
            self.validate_required(context, registry, errors);
        }
        if let Some(view) = &self.view {
            match ty.media_type() {
                Some(target) => {
                    let target = registry.media_type(target);
                    if !target.views.contains_key(view) {
                        errors.push(DslError::resolution(
                            context,
                            format!("view {view:?} is not defined on {}", target.context()),
                        ));
                    }
                }
                None => errors.push(structural(format!(
                    "view {view:?} can only be used on media type attributes, not on {}",
                    ty.name()
                ))),
            }
        }

        match ty {
            DataType::Object(obj) => {
                for (name, member) in obj {
                    member.validate_into(
                        &format!("attribute {name:?} of {context}"),
                        registry,
                        errors,
                    );
                }
            }
            DataType::Array(arr) => {
                arr.element
                    .validate_into(&format!("element of {context}"), registry, errors);
            }
            DataType::Map(map) => {
                map.key
                    .validate_into(&format!("key of {context}"), registry, errors);
                map.value
                    .validate_into(&format!("value of {context}"), registry, errors);
            }
            DataType::Primitive(_) | DataType::User(_) | DataType::Media(_) => {}
        }
    }

    fn validate_default(&self, default: &Value, context: &str, errors: &mut ErrorCollector) {
        let v = &self.validation;
        if !value_matches(default, &self.data_type) {
            errors.push(DslError::structural(
                context,
                format!(
                    "default value {default} is not a valid {}",
                    self.data_type.name()
                ),
            ));
            return;
        }
        if !v.enum_values.is_empty() && !v.enum_values.contains(default) {
            errors.push(DslError::structural(
                context,
                format!("default value {default} is not one of the enum values"),
            ));
        }
        if let Some(n) = default.as_f64() {
            let below = v.minimum.is_some_and(|min| n < min);
            let above = v.maximum.is_some_and(|max| n > max);
            if below || above {
                errors.push(DslError::structural(
                    context,
                    format!("default value {default} is outside of the allowed range"),
                ));
            }
        }
    }

    fn validate_required(&self, context: &str, registry: &Registry, errors: &mut ErrorCollector) {
        let members = match &self.data_type {
            DataType::Object(obj) => Some(obj),
            DataType::User(id) => registry.user_type(*id).attribute.members(),
            DataType::Media(id) => registry.media_type(*id).attribute.members(),
            _ => None,
        };
        let Some(members) = members else {
            errors.push(DslError::structural(
                context,
                format!(
                    "required only applies to objects, not to {}",
                    self.data_type.name()
                ),
            ));
            return;
        };
        for name in &self.validation.required {
            if !members.contains_key(name) {
                errors.push(DslError::structural(
                    context,
                    format!("required attribute {name:?} is not defined"),
                ));
            }
        }
    }
}

/// Whether a JSON value fits a type, shallowly.
pub(crate) fn value_matches(value: &Value, ty: &DataType) -> bool {
    match ty {
        DataType::Primitive(Primitive::Boolean) => value.is_boolean(),
        DataType::Primitive(Primitive::Integer) => {
            value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        DataType::Primitive(Primitive::Number) => value.is_number(),
        DataType::Primitive(
            Primitive::String | Primitive::DateTime | Primitive::Uuid | Primitive::File,
        ) => value.is_string(),
        DataType::Primitive(Primitive::Any) => true,
        DataType::Object(_) | DataType::Map(_) | DataType::User(_) => value.is_object(),
        DataType::Array(_) => value.is_array(),
        DataType::Media(_) => value.is_object() || value.is_array(),
    }
}
