use super::Scope;
use super::attribute::{AttributeDsl, AttributesDsl, extend_required, member};
use crate::types::{TypeRef, UserTypeId};
use crate::user_type::UserTypeDefinition;

/// Body context of a user type declaration.
pub struct TypeDsl<'a> {
    def: &'a mut UserTypeDefinition,
    scope: Scope<'a>,
}

impl<'a> TypeDsl<'a> {
    pub(crate) fn new(def: &'a mut UserTypeDefinition, scope: Scope<'a>) -> Self {
        Self { def, scope }
    }

    /// Handle of the type being declared.
    pub fn id(&self) -> UserTypeId {
        self.def.id
    }

    pub fn description(&mut self, description: impl Into<String>) {
        self.def.description = Some(description.into());
    }

    /// Makes the type a named wrapper around `ty` instead of an object.
    pub fn of(&mut self, ty: impl Into<TypeRef>) {
        let context = self.def.context();
        if let Some(data) = self.scope.resolve_type(ty.into(), &context) {
            self.def.attribute.data_type = data;
            self.def.attribute.explicit_type = true;
        }
    }

    pub fn attributes(&mut self, body: impl FnOnce(&mut AttributesDsl<'_>)) {
        let context = self.def.context();
        let mut attributes =
            AttributesDsl::new(&mut self.def.attribute, self.scope.reborrow(), context);
        body(&mut attributes);
    }

    pub fn attribute(&mut self, name: &str) -> AttributeDsl<'_> {
        let context = self.def.context();
        member(&mut self.def.attribute, self.scope.reborrow(), &context, name)
    }

    pub fn required<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_required(&mut self.def.attribute, names);
    }
}
