//! Declaration contexts.
//!
//! Every declaration body receives the context of the definition it
//! decorates, so nested calls always know their receiver. Contexts hold a
//! [`Scope`] giving access to the registry (for type lookups) and to the
//! error collector of the running design.

mod attribute;
mod media_type;
mod resource;
mod user_type;

pub use attribute::{AttributeDsl, AttributesDsl};
pub use media_type::{LinksDsl, MediaTypeDsl, ViewDsl};
pub use resource::{ActionDsl, ResourceDsl, ResponseDsl};
pub use user_type::TypeDsl;

use crate::error::{DslError, ErrorCollector};
use crate::identifier::collection_identifier;
use crate::media_type::MediaTypeDefinition;
use crate::registry::Registry;
use crate::types::{DataType, MediaRef, MediaTypeId, TypeRef};

/// Mutable design state shared by nested declaration contexts.
pub(crate) struct Scope<'a> {
    pub(crate) registry: &'a mut Registry,
    pub(crate) errors: &'a mut ErrorCollector,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(registry: &'a mut Registry, errors: &'a mut ErrorCollector) -> Self {
        Self { registry, errors }
    }

    pub(crate) fn reborrow(&mut self) -> Scope<'_> {
        Scope {
            registry: &mut *self.registry,
            errors: &mut *self.errors,
        }
    }

    /// Resolves a declared type, reporting unknown names against `context`.
    pub(crate) fn resolve_type(&mut self, ty: TypeRef, context: &str) -> Option<DataType> {
        match ty {
            TypeRef::Data(data) => Some(data),
            TypeRef::Identifier(name) => {
                let found = self.registry.lookup_type(&name);
                if found.is_none() {
                    self.errors.push(DslError::resolution(
                        context,
                        format!("unknown type {name:?}"),
                    ));
                }
                found
            }
        }
    }

    pub(crate) fn collection_of(&mut self, element: MediaRef) -> MediaTypeId {
        collection_of(self.registry, element)
    }
}

/// Returns the collection wrapping `element`, declaring it on first use.
///
/// The wrapper is a placeholder until the run binds its element.
pub(crate) fn collection_of(registry: &mut Registry, element: MediaRef) -> MediaTypeId {
    if let Some(existing) = registry.known_collection(&element) {
        return existing;
    }
    let identifier = match &element {
        MediaRef::Identifier(identifier) => collection_identifier(identifier),
        MediaRef::Handle(_) => String::new(),
    };
    let id = registry.add_media_type(MediaTypeDefinition::collection_placeholder(
        element.clone(),
        identifier,
    ));
    registry.remember_collection(&element, id);
    tracing::debug!(collection = id.index(), element = %element, "declared collection");
    id
}
