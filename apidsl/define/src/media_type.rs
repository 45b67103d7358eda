//! Media type definitions with their views and links.

use indexmap::IndexMap;
use serde::Serialize;

use crate::attribute::AttributeDefinition;
use crate::error::{DslError, ErrorCollector, MultiError};
use crate::registry::Registry;
use crate::types::{MediaRef, MediaTypeId, Object};

/// Name of the view rendered when none is requested.
pub const DEFAULT_VIEW: &str = "default";

/// Name of the view preferred by links that do not pick one.
pub const LINK_VIEW: &str = "link";

/// A named projection of a media type's attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDefinition {
    pub name: String,
    /// Media type owning the view.
    pub parent: MediaTypeId,
    /// Object holding the projected attributes (an array for collections).
    pub attribute: AttributeDefinition,
}

impl ViewDefinition {
    /// Projected attributes, in view declaration order.
    pub fn attributes(&self) -> Option<&Object> {
        self.attribute.members()
    }
}

/// An attribute rendered as a reduced view of another media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDefinition {
    /// Name of the linked attribute on the parent.
    pub name: String,
    /// View of the target used to render the link.
    pub view: String,
    pub parent: MediaTypeId,
    pub target: MediaTypeId,
}

/// Element binding of a CollectionOf wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionDefinition {
    /// The element as declared.
    pub element: MediaRef,
    /// The element once resolved by the run.
    pub resolved: Option<MediaTypeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct PendingView {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, Option<String>)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct PendingLink {
    pub(crate) name: String,
    pub(crate) view: Option<String>,
}

/// A media type: an object type plus named views and links.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MediaTypeDefinition {
    pub id: MediaTypeId,
    pub identifier: String,
    /// Name used by code generators, derived from the identifier by default.
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Root attribute: an object, or an array for collections.
    pub attribute: AttributeDefinition,
    pub views: IndexMap<String, ViewDefinition>,
    pub links: IndexMap<String, LinkDefinition>,
    /// Media type untyped attributes inherit from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<MediaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionDefinition>,
    pub is_error: bool,
    #[serde(skip)]
    pub(crate) pending_views: Vec<PendingView>,
    #[serde(skip)]
    pub(crate) pending_links: Vec<PendingLink>,
}

impl MediaTypeDefinition {
    pub(crate) fn new(identifier: String, type_name: String) -> Self {
        Self {
            identifier,
            type_name,
            attribute: AttributeDefinition::object(),
            ..Self::default()
        }
    }

    pub(crate) fn collection_placeholder(element: MediaRef, identifier: String) -> Self {
        Self {
            identifier,
            collection: Some(CollectionDefinition {
                element,
                resolved: None,
            }),
            ..Self::default()
        }
    }

    /// Human readable name used in error messages.
    pub fn context(&self) -> String {
        format!("media type {:?}", self.identifier)
    }

    /// Declared attributes, `None` for collections.
    pub fn attributes(&self) -> Option<&Object> {
        self.attribute.members()
    }

    pub fn attribute_named(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attribute.member(name)
    }

    pub fn is_collection(&self) -> bool {
        self.collection.is_some()
    }

    /// Resolved element of a collection.
    pub fn element(&self) -> Option<MediaTypeId> {
        self.collection.as_ref().and_then(|c| c.resolved)
    }

    pub fn view(&self, name: &str) -> Option<&ViewDefinition> {
        self.views.get(name)
    }

    pub fn default_view(&self) -> Option<&ViewDefinition> {
        self.view(DEFAULT_VIEW)
    }

    /// View a link renders when it does not name one: `link` when defined,
    /// `default` otherwise.
    pub fn preferred_link_view(&self) -> &'static str {
        if self.views.contains_key(LINK_VIEW) {
            LINK_VIEW
        } else {
            DEFAULT_VIEW
        }
    }

    /// Checks the media type and everything it owns.
    ///
    /// ## Errors
    ///
    /// Fails when the identifier is empty, when attributes exist without a
    /// `default` view, when a collection element never resolved, and for
    /// every invalid attribute, view or link.
    pub fn validate(&self, registry: &Registry) -> Result<(), MultiError> {
        let mut errors = ErrorCollector::default();
        self.validate_into(registry, &mut errors);
        errors.into_result()
    }

    pub(crate) fn validate_into(&self, registry: &Registry, errors: &mut ErrorCollector) {
        let context = self.context();

        if self.identifier.trim().is_empty() {
            errors.push(DslError::structural(&context, "identifier cannot be empty"));
        }
        if self.type_name.is_empty() && !self.is_collection() {
            errors.push(DslError::structural(&context, "type name cannot be empty"));
        }
        if let Some(collection) = &self.collection
            && collection.resolved.is_none()
        {
            errors.push(DslError::resolution(
                &context,
                format!(
                    "collection element {} is not a known media type",
                    collection.element
                ),
            ));
            return;
        }
        if self.attributes().is_some_and(|obj| !obj.is_empty()) && self.default_view().is_none() {
            errors.push(DslError::structural(
                &context,
                format!("media type does not define a {DEFAULT_VIEW:?} view"),
            ));
        }

        self.attribute.validate_into(&context, registry, errors);

        for view in self.views.values() {
            view.attribute.validate_into(
                &format!("view {:?} of {context}", view.name),
                registry,
                errors,
            );
        }

        for link in self.links.values() {
            let target = registry.media_type(link.target);
            if !target.views.contains_key(&link.view) {
                errors.push(DslError::resolution(
                    format!("link {:?} of {context}", link.name),
                    format!("view {:?} is not defined on {}", link.view, target.context()),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    fn media_type_with_attribute() -> MediaTypeDefinition {
        let mut mt = MediaTypeDefinition::new("application/foo".to_string(), "Foo".to_string());
        mt.attribute
            .data_type
            .as_object_mut()
            .unwrap()
            .insert("att".to_string(), AttributeDefinition::new(Primitive::String));
        mt
    }

    fn add_view(mt: &mut MediaTypeDefinition, name: &str) {
        let view = ViewDefinition {
            name: name.to_string(),
            parent: mt.id,
            attribute: mt.attribute.clone(),
        };
        mt.views.insert(name.to_string(), view);
    }

    #[test]
    fn empty_identifier_fails() {
        let mt = MediaTypeDefinition::new(String::new(), "MediaType1".to_string());
        let err = mt.validate(&Registry::default()).unwrap_err();
        assert!(err.to_string().contains("identifier cannot be empty"));
    }

    #[test]
    fn attributes_without_default_view_fail() {
        let mt = media_type_with_attribute();
        let err = mt.validate(&Registry::default()).unwrap_err();
        assert!(err.to_string().contains("\"default\" view"));
    }

    #[test]
    fn attributes_with_default_view_pass() {
        let mut mt = media_type_with_attribute();
        add_view(&mut mt, DEFAULT_VIEW);
        assert!(mt.validate(&Registry::default()).is_ok());
    }

    #[test]
    fn empty_media_type_passes() {
        let mt = MediaTypeDefinition::new("application/empty".to_string(), "Empty".to_string());
        assert!(mt.validate(&Registry::default()).is_ok());
    }

    #[test]
    fn unresolved_collection_fails() {
        let mt = MediaTypeDefinition::collection_placeholder(
            MediaRef::from("application/missing"),
            "application/missing; type=collection".to_string(),
        );
        let err = mt.validate(&Registry::default()).unwrap_err();
        assert!(err.to_string().contains("\"application/missing\""));
    }

    #[test]
    fn preferred_link_view_falls_back_to_default() {
        let mut mt = media_type_with_attribute();
        add_view(&mut mt, DEFAULT_VIEW);
        assert_eq!(mt.preferred_link_view(), DEFAULT_VIEW);

        add_view(&mut mt, LINK_VIEW);
        assert_eq!(mt.preferred_link_view(), LINK_VIEW);
    }
}
