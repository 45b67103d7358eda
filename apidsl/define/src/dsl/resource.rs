use super::Scope;
use crate::error::{DslError, ErrorCollector};
use crate::resource::{ActionDefinition, ResourceDefinition, ResponseDefinition};
use crate::types::MediaRef;

/// Body context of a resource declaration.
pub struct ResourceDsl<'a> {
    def: &'a mut ResourceDefinition,
    scope: Scope<'a>,
}

impl<'a> ResourceDsl<'a> {
    pub(crate) fn new(def: &'a mut ResourceDefinition, scope: Scope<'a>) -> Self {
        Self { def, scope }
    }

    pub fn description(&mut self, description: impl Into<String>) {
        self.def.description = Some(description.into());
    }

    /// Default media of responses that do not set one.
    pub fn media(&mut self, media: impl Into<MediaRef>) {
        self.def.media = Some(media.into());
    }

    pub fn action(&mut self, name: &str, body: impl FnOnce(&mut ActionDsl<'_>)) {
        let context = format!("action {name:?} of {}", self.def.context());
        if self.def.actions.contains_key(name) {
            self.scope
                .errors
                .push(DslError::duplicate(context, "action is defined twice"));
            return;
        }
        let mut action = ActionDefinition {
            name: name.to_string(),
            ..ActionDefinition::default()
        };
        body(&mut ActionDsl {
            action: &mut action,
            errors: &mut *self.scope.errors,
            context,
        });
        self.def.actions.insert(name.to_string(), action);
    }
}

/// Body context of an action declaration.
pub struct ActionDsl<'a> {
    action: &'a mut ActionDefinition,
    errors: &'a mut ErrorCollector,
    context: String,
}

impl ActionDsl<'_> {
    pub fn description(&mut self, description: impl Into<String>) {
        self.action.description = Some(description.into());
    }

    /// Declares a response; a duplicate name replaces the earlier response
    /// and is reported.
    pub fn response(&mut self, name: &str, status: u16) -> ResponseDsl<'_> {
        if self.action.responses.contains_key(name) {
            self.errors.push(DslError::duplicate(
                format!("response {name:?} of {}", self.context),
                "response is defined twice",
            ));
        }
        let (index, _) = self
            .action
            .responses
            .insert_full(name.to_string(), ResponseDefinition::new(name.to_string(), status));
        ResponseDsl {
            response: &mut self.action.responses[index],
        }
    }
}

/// Chained declaration of a response.
pub struct ResponseDsl<'a> {
    response: &'a mut ResponseDefinition,
}

impl ResponseDsl<'_> {
    pub fn media(mut self, media: impl Into<MediaRef>) -> Self {
        self.response.media = Some(media.into());
        self
    }

    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.response.view = Some(view.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.response.description = Some(description.into());
        self
    }
}
