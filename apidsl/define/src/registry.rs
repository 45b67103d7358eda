//! The Declaration Registry.
//!
//! The registry owns every declared definition in per-kind arenas. Handles
//! index the arenas and stay valid for the lifetime of the design, while the
//! lookup indexes map a canonical identifier (or a type/resource name) to the
//! first definition that claimed it. A duplicate declaration is still stored
//! in its arena, so a handle obtained for it keeps working, but lookups by
//! identifier always return the first declaration.

use std::collections::HashMap;
use std::mem;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use crate::identifier::canonical_identifier;
use crate::media_type::MediaTypeDefinition;
use crate::resource::ResourceDefinition;
use crate::types::{DataType, MediaRef, MediaTypeId, ResourceId, UserTypeId};
use crate::user_type::UserTypeDefinition;

/// Arena storage and lookup indexes for one design.
///
/// ## Panics
///
/// The handle-based accessors ([`Registry::media_type`],
/// [`Registry::user_type`], [`Registry::resource`]) index the arenas directly
/// and panic when given a handle issued by a different design.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registry {
    media_types: Vec<MediaTypeDefinition>,
    user_types: Vec<UserTypeDefinition>,
    resources: Vec<ResourceDefinition>,
    #[serde(skip)]
    media_index: IndexMap<String, MediaTypeId>,
    #[serde(skip)]
    type_index: IndexMap<String, UserTypeId>,
    #[serde(skip)]
    resource_index: IndexMap<String, ResourceId>,
    #[serde(skip)]
    collections: HashMap<MediaTypeId, MediaTypeId>,
    #[serde(skip)]
    collections_by_identifier: HashMap<String, MediaTypeId>,
    #[serde(skip)]
    anonymous: usize,
}

impl Registry {
    pub fn media_type(&self, id: MediaTypeId) -> &MediaTypeDefinition {
        &self.media_types[id.0]
    }

    /// Looks a media type up by identifier, ignoring case, the `+suffix` and
    /// any `view` parameter.
    ///
    /// ## Examples
    ///
    /// ```
    /// use apidsl_define::Design;
    ///
    /// let mut design = Design::new();
    /// let id = design.media_type("application/vnd.example+json", |_| {});
    /// design.run().unwrap();
    ///
    /// let registry = design.registry();
    /// assert_eq!(registry.find_media_type("application/vnd.example"), Some(id));
    /// assert_eq!(registry.find_media_type("application/vnd.missing"), None);
    /// ```
    pub fn find_media_type(&self, identifier: &str) -> Option<MediaTypeId> {
        self.media_index
            .get(&canonical_identifier(identifier))
            .copied()
    }

    /// Resolves a handle or an identifier to a media type of this registry.
    pub fn resolve_media(&self, media: &MediaRef) -> Option<MediaTypeId> {
        match media {
            MediaRef::Handle(id) => (id.0 < self.media_types.len()).then_some(*id),
            MediaRef::Identifier(identifier) => self.find_media_type(identifier),
        }
    }

    /// Media types reachable by identifier, in registration order.
    pub fn media_types(&self) -> impl Iterator<Item = &MediaTypeDefinition> {
        self.media_index.values().map(|id| self.media_type(*id))
    }

    /// Every media type ever declared, duplicates included, in arena order.
    pub fn all_media_types(&self) -> &[MediaTypeDefinition] {
        &self.media_types
    }

    /// `true` when `id` is the media type its identifier resolves to.
    pub fn is_registered(&self, id: MediaTypeId) -> bool {
        self.find_media_type(&self.media_type(id).identifier) == Some(id)
    }

    pub fn user_type(&self, id: UserTypeId) -> &UserTypeDefinition {
        &self.user_types[id.0]
    }

    pub fn find_user_type(&self, name: &str) -> Option<UserTypeId> {
        self.type_index.get(name).copied()
    }

    pub fn user_types(&self) -> impl Iterator<Item = &UserTypeDefinition> {
        self.type_index.values().map(|id| self.user_type(*id))
    }

    pub fn all_user_types(&self) -> &[UserTypeDefinition] {
        &self.user_types
    }

    pub fn resource(&self, id: ResourceId) -> &ResourceDefinition {
        &self.resources[id.0]
    }

    pub fn find_resource(&self, name: &str) -> Option<ResourceId> {
        self.resource_index.get(name).copied()
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resource_index.values().map(|id| self.resource(*id))
    }

    pub fn all_resources(&self) -> &[ResourceDefinition] {
        &self.resources
    }

    /// Resolves a type name used in a declaration.
    ///
    /// Media type identifiers are tried first, then user type names.
    pub fn lookup_type(&self, name: &str) -> Option<DataType> {
        self.find_media_type(name)
            .map(DataType::Media)
            .or_else(|| self.find_user_type(name).map(DataType::User))
    }

    pub(crate) fn add_media_type(&mut self, mut def: MediaTypeDefinition) -> MediaTypeId {
        let id = MediaTypeId(self.media_types.len());
        def.id = id;
        self.media_types.push(def);
        id
    }

    /// Claims the canonical identifier of `id`.
    ///
    /// Returns the current owner when the identifier is already taken.
    pub(crate) fn register_media_type(&mut self, id: MediaTypeId) -> Result<(), MediaTypeId> {
        let key = canonical_identifier(&self.media_types[id.0].identifier);
        match self.media_index.entry(key) {
            Entry::Occupied(owner) => Err(*owner.get()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    pub(crate) fn media_type_mut(&mut self, id: MediaTypeId) -> &mut MediaTypeDefinition {
        &mut self.media_types[id.0]
    }

    /// Moves a definition out of its arena slot while its body runs.
    pub(crate) fn take_media_type(&mut self, id: MediaTypeId) -> MediaTypeDefinition {
        mem::take(&mut self.media_types[id.0])
    }

    pub(crate) fn restore_media_type(&mut self, def: MediaTypeDefinition) {
        let id = def.id;
        self.media_types[id.0] = def;
    }

    pub(crate) fn add_user_type(&mut self, mut def: UserTypeDefinition) -> UserTypeId {
        let id = UserTypeId(self.user_types.len());
        def.id = id;
        self.user_types.push(def);
        id
    }

    pub(crate) fn register_user_type(&mut self, id: UserTypeId) -> Result<(), UserTypeId> {
        let key = self.user_types[id.0].type_name.clone();
        match self.type_index.entry(key) {
            Entry::Occupied(owner) => Err(*owner.get()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    pub(crate) fn take_user_type(&mut self, id: UserTypeId) -> UserTypeDefinition {
        mem::take(&mut self.user_types[id.0])
    }

    pub(crate) fn restore_user_type(&mut self, def: UserTypeDefinition) {
        let id = def.id;
        self.user_types[id.0] = def;
    }

    pub(crate) fn user_type_mut(&mut self, id: UserTypeId) -> &mut UserTypeDefinition {
        &mut self.user_types[id.0]
    }

    pub(crate) fn add_resource(&mut self, mut def: ResourceDefinition) -> ResourceId {
        let id = ResourceId(self.resources.len());
        def.id = id;
        self.resources.push(def);
        id
    }

    pub(crate) fn register_resource(&mut self, id: ResourceId) -> Result<(), ResourceId> {
        let key = self.resources[id.0].name.clone();
        match self.resource_index.entry(key) {
            Entry::Occupied(owner) => Err(*owner.get()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    pub(crate) fn take_resource(&mut self, id: ResourceId) -> ResourceDefinition {
        mem::take(&mut self.resources[id.0])
    }

    pub(crate) fn restore_resource(&mut self, def: ResourceDefinition) {
        let id = def.id;
        self.resources[id.0] = def;
    }

    pub(crate) fn resource_mut(&mut self, id: ResourceId) -> &mut ResourceDefinition {
        &mut self.resources[id.0]
    }

    /// Collection already wrapping `element`, if any.
    pub(crate) fn known_collection(&self, element: &MediaRef) -> Option<MediaTypeId> {
        match element {
            MediaRef::Handle(id) => self.collections.get(id).copied(),
            MediaRef::Identifier(identifier) => self
                .collections_by_identifier
                .get(&canonical_identifier(identifier))
                .copied(),
        }
    }

    pub(crate) fn remember_collection(&mut self, element: &MediaRef, collection: MediaTypeId) {
        match element {
            MediaRef::Handle(id) => {
                self.collections.insert(*id, collection);
            }
            MediaRef::Identifier(identifier) => {
                self.collections_by_identifier
                    .insert(canonical_identifier(identifier), collection);
            }
        }
    }

    /// Next number for media types whose identifier yields no type name.
    pub(crate) fn next_anonymous(&mut self) -> usize {
        self.anonymous += 1;
        self.anonymous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(identifier: &str) -> MediaTypeDefinition {
        MediaTypeDefinition::new(identifier.to_string(), "T".to_string())
    }

    #[test]
    fn first_registration_owns_the_identifier() {
        let mut registry = Registry::default();
        let first = registry.add_media_type(media("application/vnd.a+json"));
        let second = registry.add_media_type(media("application/vnd.a"));

        assert!(registry.register_media_type(first).is_ok());
        assert_eq!(registry.register_media_type(second), Err(first));

        assert_eq!(registry.find_media_type("application/vnd.a"), Some(first));
        assert!(registry.is_registered(first));
        assert!(!registry.is_registered(second));
        assert_eq!(registry.media_types().count(), 1);
        assert_eq!(registry.all_media_types().len(), 2);
        assert_eq!(registry.media_type(second).id, second);
    }

    #[test]
    fn take_and_restore_keep_the_slot() {
        let mut registry = Registry::default();
        let id = registry.add_media_type(media("application/vnd.a"));

        let mut def = registry.take_media_type(id);
        assert!(registry.media_type(id).identifier.is_empty());
        def.description = Some("restored".to_string());
        registry.restore_media_type(def);

        assert_eq!(
            registry.media_type(id).description.as_deref(),
            Some("restored")
        );
    }

    #[test]
    fn lookup_type_prefers_media_types() {
        let mut registry = Registry::default();
        let mt = registry.add_media_type(media("application/vnd.user"));
        registry.register_media_type(mt).unwrap();
        let ut = registry.add_user_type(UserTypeDefinition::new("User".to_string()));
        registry.register_user_type(ut).unwrap();

        assert_eq!(
            registry.lookup_type("application/vnd.user+json"),
            Some(DataType::Media(mt))
        );
        assert_eq!(registry.lookup_type("User"), Some(DataType::User(ut)));
        assert_eq!(registry.lookup_type("Nope"), None);
    }

    #[test]
    fn resolve_media_rejects_foreign_handles() {
        let registry = Registry::default();
        assert_eq!(registry.resolve_media(&MediaRef::Handle(MediaTypeId(3))), None);
    }

    #[test]
    fn anonymous_counter_increments() {
        let mut registry = Registry::default();
        assert_eq!(registry.next_anonymous(), 1);
        assert_eq!(registry.next_anonymous(), 2);
    }
}
