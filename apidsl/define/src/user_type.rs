//! Named user types.

use serde::Serialize;

use crate::attribute::AttributeDefinition;
use crate::error::{DslError, ErrorCollector, MultiError};
use crate::registry::Registry;
use crate::types::UserTypeId;

/// A named wrapper around a type, usually an object.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UserTypeDefinition {
    pub id: UserTypeId,
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub attribute: AttributeDefinition,
}

impl UserTypeDefinition {
    pub(crate) fn new(type_name: String) -> Self {
        Self {
            type_name,
            attribute: AttributeDefinition::object(),
            ..Self::default()
        }
    }

    pub fn context(&self) -> String {
        format!("type {:?}", self.type_name)
    }

    /// ## Errors
    ///
    /// Fails on an empty name and on every invalid attribute.
    pub fn validate(&self, registry: &Registry) -> Result<(), MultiError> {
        let mut errors = ErrorCollector::default();
        self.validate_into(registry, &mut errors);
        errors.into_result()
    }

    pub(crate) fn validate_into(&self, registry: &Registry, errors: &mut ErrorCollector) {
        let context = self.context();
        if self.type_name.trim().is_empty() {
            errors.push(DslError::structural(&context, "type name cannot be empty"));
        }
        self.attribute.validate_into(&context, registry, errors);
    }
}
