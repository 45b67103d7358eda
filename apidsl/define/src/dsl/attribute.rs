use serde_json::Value;

use super::Scope;
use crate::attribute::{AttributeDefinition, Example, Format};
use crate::error::DslError;
use crate::types::{DataType, Object, TypeRef};

/// Declares the members of an object.
pub struct AttributesDsl<'a> {
    owner: &'a mut AttributeDefinition,
    scope: Scope<'a>,
    context: String,
}

impl<'a> AttributesDsl<'a> {
    pub(crate) fn new(owner: &'a mut AttributeDefinition, scope: Scope<'a>, context: String) -> Self {
        Self {
            owner,
            scope,
            context,
        }
    }

    /// Declares (or reopens) the member `name`.
    pub fn attribute(&mut self, name: &str) -> AttributeDsl<'_> {
        member(self.owner, self.scope.reborrow(), &self.context, name)
    }

    /// Marks members as required.
    pub fn required<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_required(self.owner, names);
    }
}

/// Opens member `name` of `owner`, turning `owner` into an object first when
/// it holds another type.
pub(crate) fn member<'s>(
    owner: &'s mut AttributeDefinition,
    mut scope: Scope<'s>,
    context: &str,
    name: &str,
) -> AttributeDsl<'s> {
    if owner.members().is_none() {
        scope.errors.push(DslError::structural(
            context,
            format!(
                "cannot declare attribute {name:?} on a {}",
                owner.data_type.name()
            ),
        ));
        owner.data_type = DataType::Object(Object::new());
    }
    let context = format!("attribute {name:?} of {context}");
    let attribute = match owner.data_type.as_object_mut() {
        Some(obj) => obj.entry(name.to_string()).or_default(),
        None => unreachable!("owner was just turned into an object"),
    };
    AttributeDsl::new(attribute, scope, context)
}

pub(crate) fn extend_required<I, S>(owner: &mut AttributeDefinition, names: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for name in names {
        let name = name.into();
        if !owner.validation.required.contains(&name) {
            owner.validation.required.push(name);
        }
    }
}

/// Chained declaration of a single attribute.
///
/// ## Examples
///
/// ```
/// use apidsl_define::{Design, Format, Primitive};
///
/// let mut design = Design::new();
/// let account = design.media_type("application/vnd.account+json", |m| {
///     m.attribute("id").of(Primitive::Integer).minimum(0).example(1);
///     m.attribute("email").format(Format::Email).no_example();
///     m.view("default", |v| {
///         v.attribute("id");
///         v.attribute("email");
///     });
/// });
/// design.run().unwrap();
///
/// let mt = design.registry().media_type(account);
/// assert_eq!(mt.attribute_named("id").unwrap().example.value(), Some(&1.into()));
/// assert!(mt.attribute_named("email").unwrap().example.value().is_none());
/// ```
pub struct AttributeDsl<'a> {
    attribute: &'a mut AttributeDefinition,
    scope: Scope<'a>,
    context: String,
}

impl<'a> AttributeDsl<'a> {
    pub(crate) fn new(attribute: &'a mut AttributeDefinition, scope: Scope<'a>, context: String) -> Self {
        Self {
            attribute,
            scope,
            context,
        }
    }

    /// Sets the attribute type. Names are looked up as media type identifiers
    /// first, then as user type names.
    pub fn of(mut self, ty: impl Into<TypeRef>) -> Self {
        if let Some(data) = self.scope.resolve_type(ty.into(), &self.context) {
            self.attribute.data_type = data;
            self.attribute.explicit_type = true;
        }
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.attribute.description = Some(description.into());
        self
    }

    /// Uses `value` verbatim as the example.
    pub fn example(mut self, value: impl Into<Value>) -> Self {
        self.attribute.example = Example::Explicit(value.into());
        self
    }

    /// Declares that the attribute has no example.
    pub fn no_example(mut self) -> Self {
        self.attribute.example = Example::Absent;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.attribute.default_value = Some(value.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.attribute.validation.pattern = Some(pattern.into());
        self
    }

    pub fn minimum(mut self, minimum: impl Into<f64>) -> Self {
        self.attribute.validation.minimum = Some(minimum.into());
        self
    }

    pub fn maximum(mut self, maximum: impl Into<f64>) -> Self {
        self.attribute.validation.maximum = Some(maximum.into());
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.attribute.validation.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.attribute.validation.max_length = Some(max_length);
        self
    }

    pub fn enum_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.attribute.validation.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.attribute.validation.format = Some(format);
        self
    }

    /// Marks members of this (object) attribute as required.
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_required(self.attribute, names);
        self
    }

    /// View used to render this media type attribute.
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.attribute.view = Some(view.into());
        self
    }

    /// Declares nested members, making the attribute an inline object unless
    /// it already is one.
    pub fn attributes(mut self, body: impl FnOnce(&mut AttributesDsl<'_>)) -> Self {
        if self.attribute.members().is_none() {
            if self.attribute.explicit_type {
                self.scope.errors.push(DslError::structural(
                    &self.context,
                    format!(
                        "cannot declare nested attributes on a {}",
                        self.attribute.data_type.name()
                    ),
                ));
            }
            self.attribute.data_type = DataType::Object(Object::new());
            self.attribute.explicit_type = true;
        }
        let mut nested = AttributesDsl::new(
            &mut *self.attribute,
            self.scope.reborrow(),
            self.context.clone(),
        );
        body(&mut nested);
        self
    }
}
