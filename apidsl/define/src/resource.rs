//! Resources, their actions and the media types actions respond with.
//!
//! Routing is left to downstream generators: a resource here only records
//! which media types it renders so that references to them are resolved and
//! checked with the rest of the design.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{DslError, ErrorCollector, MultiError};
use crate::registry::Registry;
use crate::types::{MediaRef, MediaTypeId, ResourceId};

/// A response an action may produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDefinition {
    pub name: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Media as declared; `None` inherits the resource media.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_media: Option<MediaTypeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

impl ResponseDefinition {
    pub(crate) fn new(name: String, status: u16) -> Self {
        Self {
            name,
            status,
            description: None,
            media: None,
            resolved_media: None,
            view: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub responses: IndexMap<String, ResponseDefinition>,
}

/// A resource and the actions it exposes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResourceDefinition {
    pub id: ResourceId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default media of the resource's responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_media: Option<MediaTypeId>,
    pub actions: IndexMap<String, ActionDefinition>,
}

impl ResourceDefinition {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn context(&self) -> String {
        format!("resource {:?}", self.name)
    }

    /// ## Errors
    ///
    /// Fails on empty names, unknown media types, status codes outside of
    /// 100..=599 and response views the media type does not define.
    pub fn validate(&self, registry: &Registry) -> Result<(), MultiError> {
        let mut errors = ErrorCollector::default();
        self.validate_into(registry, &mut errors);
        errors.into_result()
    }

    pub(crate) fn validate_into(&self, registry: &Registry, errors: &mut ErrorCollector) {
        let context = self.context();
        if self.name.trim().is_empty() {
            errors.push(DslError::structural(&context, "resource name cannot be empty"));
        }
        if let Some(media) = &self.media
            && self.resolved_media.is_none()
        {
            errors.push(DslError::resolution(
                &context,
                format!("media type {media} is not defined"),
            ));
        }

        for action in self.actions.values() {
            let action_context = format!("action {:?} of {context}", action.name);
            if action.name.trim().is_empty() {
                errors.push(DslError::structural(&action_context, "action name cannot be empty"));
            }
            for response in action.responses.values() {
                let response_context = format!("response {:?} of {action_context}", response.name);
                if !(100..=599).contains(&response.status) {
                    errors.push(DslError::structural(
                        &response_context,
                        format!("invalid status code {}", response.status),
                    ));
                }
                if let Some(media) = &response.media
                    && response.resolved_media.is_none()
                {
                    errors.push(DslError::resolution(
                        &response_context,
                        format!("media type {media} is not defined"),
                    ));
                }
                if let Some(view) = &response.view {
                    match response.resolved_media {
                        Some(id) => {
                            let mt = registry.media_type(id);
                            if !mt.views.contains_key(view) {
                                errors.push(DslError::resolution(
                                    &response_context,
                                    format!("view {view:?} is not defined on {}", mt.context()),
                                ));
                            }
                        }
                        None => errors.push(DslError::structural(
                            &response_context,
                            format!("view {view:?} is set but the response has no media type"),
                        )),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_with_response(response: ResponseDefinition) -> ResourceDefinition {
        let mut action = ActionDefinition {
            name: "show".to_string(),
            ..ActionDefinition::default()
        };
        action.responses.insert(response.name.clone(), response);
        let mut resource = ResourceDefinition::new("bottle".to_string());
        resource.actions.insert("show".to_string(), action);
        resource
    }

    #[test]
    fn bodiless_response_passes() {
        let resource = resource_with_response(ResponseDefinition::new("NoContent".into(), 204));
        assert!(resource.validate(&Registry::default()).is_ok());
    }

    #[test]
    fn status_out_of_range_fails() {
        let resource = resource_with_response(ResponseDefinition::new("Weird".into(), 42));
        let err = resource.validate(&Registry::default()).unwrap_err();
        assert!(err.to_string().contains("invalid status code 42"));
    }

    #[test]
    fn unresolved_media_fails() {
        let mut response = ResponseDefinition::new("OK".into(), 200);
        response.media = Some(MediaRef::from("application/vnd.missing"));
        let resource = resource_with_response(response);
        let err = resource.validate(&Registry::default()).unwrap_err();
        assert_eq!(
            err.errors()[0].context,
            "response \"OK\" of action \"show\" of resource \"bottle\""
        );
    }

    #[test]
    fn view_without_media_fails() {
        let mut response = ResponseDefinition::new("OK".into(), 200);
        response.view = Some("tiny".to_string());
        let resource = resource_with_response(response);
        assert!(resource.validate(&Registry::default()).is_err());
    }
}
