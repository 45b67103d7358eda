//! The design session and its two-phase run.
//!
//! Top-level declarations register a bare definition immediately and queue
//! their body. [`Design::run`] then executes every body and resolves the
//! resulting graph in a fixed order:
//!
//! 1. user type bodies, media type bodies, resource bodies
//! 2. reference inheritance
//! 3. view projection
//! 4. CollectionOf binding
//! 5. link resolution
//! 6. resource media resolution
//! 7. validation of every definition
//! 8. example generation, when nothing failed

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

use crate::attribute::AttributeDefinition;
use crate::config::DesignConfig;
use crate::dsl::{self, MediaTypeDsl, ResourceDsl, Scope, TypeDsl};
use crate::error::{DslError, ErrorCollector, MultiError};
use crate::example;
use crate::identifier::{
    canonical_identifier, collection_identifier, collection_type_name, type_name_from_identifier,
};
use crate::media_type::{LinkDefinition, MediaTypeDefinition, ViewDefinition};
use crate::registry::Registry;
use crate::resource::ResourceDefinition;
use crate::types::{ArrayType, DataType, MediaRef, MediaTypeId, Object, ResourceId, UserTypeId};
use crate::user_type::UserTypeDefinition;

type MediaTypeBody = Box<dyn FnOnce(&mut MediaTypeDsl<'_>)>;
type TypeBody = Box<dyn FnOnce(&mut TypeDsl<'_>)>;
type ResourceBody = Box<dyn FnOnce(&mut ResourceDsl<'_>)>;

/// One design compilation: registry, error collector and queued bodies.
///
/// ## Examples
///
/// ```
/// use apidsl_define::{Design, DesignConfig, Primitive};
///
/// let mut design = Design::with_config(DesignConfig::seeded(7));
/// let bottle = design.media_type("application/vnd.bottle+json", |m| {
///     m.attribute("vintage").of(Primitive::Integer).minimum(1900);
///     m.view("default", |v| v.attribute("vintage"));
/// });
/// let bottles = design.collection_of(bottle);
/// design.run().unwrap();
///
/// let registry = design.registry();
/// let vintage = registry.media_type(bottle).attribute_named("vintage").unwrap();
/// assert!(vintage.example.value().unwrap().as_i64().unwrap() > 1900);
///
/// let collection = registry.media_type(bottles);
/// assert_eq!(collection.identifier, "application/vnd.bottle+json; type=collection");
/// assert_eq!(collection.type_name, "BottleCollection");
/// ```
pub struct Design {
    config: DesignConfig,
    registry: Registry,
    errors: ErrorCollector,
    type_bodies: Vec<(UserTypeId, TypeBody)>,
    media_type_bodies: Vec<(MediaTypeId, MediaTypeBody)>,
    resource_bodies: Vec<(ResourceId, ResourceBody)>,
    outcome: Option<Result<(), MultiError>>,
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

impl Design {
    pub fn new() -> Self {
        Self::with_config(DesignConfig::default())
    }

    pub fn with_config(config: DesignConfig) -> Self {
        Self {
            config,
            registry: Registry::default(),
            errors: ErrorCollector::default(),
            type_bodies: Vec::new(),
            media_type_bodies: Vec::new(),
            resource_bodies: Vec::new(),
            outcome: None,
        }
    }

    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Errors collected so far.
    pub fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    /// Declares a media type.
    ///
    /// The returned handle is valid immediately, even when the identifier
    /// turns out to be a duplicate.
    ///
    /// ## Panics
    ///
    /// Panics when the design has already run.
    pub fn media_type<F>(&mut self, identifier: impl Into<String>, body: F) -> MediaTypeId
    where
        F: FnOnce(&mut MediaTypeDsl<'_>) + 'static,
    {
        self.assert_open("media type");
        let identifier = identifier.into();
        let type_name = match type_name_from_identifier(&identifier) {
            name if name.is_empty() => format!("MediaType{}", self.registry.next_anonymous()),
            name => name,
        };
        let id = self
            .registry
            .add_media_type(MediaTypeDefinition::new(identifier, type_name));
        self.register_media_type(id);
        self.media_type_bodies.push((id, Box::new(body)));
        id
    }

    /// Declares a user type.
    ///
    /// ## Panics
    ///
    /// Panics when the design has already run.
    pub fn user_type<F>(&mut self, name: impl Into<String>, body: F) -> UserTypeId
    where
        F: FnOnce(&mut TypeDsl<'_>) + 'static,
    {
        self.assert_open("type");
        let id = self
            .registry
            .add_user_type(UserTypeDefinition::new(name.into()));
        if let Err(first) = self.registry.register_user_type(id) {
            let def = self.registry.user_type(id);
            self.errors.push(DslError::duplicate(
                def.context(),
                format!(
                    "type name is defined twice (first declaration #{}, duplicate #{})",
                    first.index(),
                    id.index()
                ),
            ));
        }
        self.type_bodies.push((id, Box::new(body)));
        id
    }

    /// Declares a resource.
    ///
    /// ## Panics
    ///
    /// Panics when the design has already run.
    pub fn resource<F>(&mut self, name: impl Into<String>, body: F) -> ResourceId
    where
        F: FnOnce(&mut ResourceDsl<'_>) + 'static,
    {
        self.assert_open("resource");
        let id = self
            .registry
            .add_resource(ResourceDefinition::new(name.into()));
        if let Err(first) = self.registry.register_resource(id) {
            let def = self.registry.resource(id);
            self.errors.push(DslError::duplicate(
                def.context(),
                format!(
                    "resource name is defined twice (first declaration #{}, duplicate #{})",
                    first.index(),
                    id.index()
                ),
            ));
        }
        self.resource_bodies.push((id, Box::new(body)));
        id
    }

    /// Collection media type wrapping `element`, given as a handle or an
    /// identifier. Wrapping the same element twice returns the same handle.
    ///
    /// ## Panics
    ///
    /// Panics when the design has already run.
    pub fn collection_of(&mut self, element: impl Into<MediaRef>) -> MediaTypeId {
        self.assert_open("collection");
        dsl::collection_of(&mut self.registry, element.into())
    }

    /// Executes every queued body, resolves, validates and generates examples.
    ///
    /// Every problem found is collected; the run never stops at the first one.
    /// Running a design a second time does nothing and returns the outcome of
    /// the first run.
    ///
    /// ## Errors
    ///
    /// Returns every collected error when the design is invalid. The registry
    /// stays inspectable, but failed definitions may miss views or links and
    /// no examples are generated.
    #[instrument(skip_all)]
    pub fn run(&mut self) -> Result<(), MultiError> {
        if let Some(outcome) = &self.outcome {
            debug!("design already ran");
            return outcome.clone();
        }

        self.execute_bodies();
        self.inherit_references();
        self.project_views();
        self.resolve_collections();
        self.resolve_links();
        self.resolve_resources();
        self.validate_all();

        if self.errors.is_empty() && self.config.generate_examples {
            let mut rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            example::populate(&mut self.registry, &mut rng, &self.config);
        }

        info!(
            media_types = self.registry.all_media_types().len(),
            user_types = self.registry.all_user_types().len(),
            resources = self.registry.all_resources().len(),
            errors = self.errors.len(),
            "design run complete"
        );
        let outcome = self.errors.to_result();
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn assert_open(&self, what: &str) {
        assert!(
            self.outcome.is_none(),
            "cannot declare a {what} after the design ran"
        );
    }

    fn register_media_type(&mut self, id: MediaTypeId) {
        let def = self.registry.media_type(id);
        if def.identifier.trim().is_empty() {
            return;
        }
        if let Err(first) = self.registry.register_media_type(id) {
            let def = self.registry.media_type(id);
            self.errors.push(DslError::duplicate(
                def.context(),
                format!(
                    "canonical identifier {:?} is defined twice (first declaration #{}, duplicate #{})",
                    canonical_identifier(&def.identifier),
                    first.index(),
                    id.index()
                ),
            ));
        }
    }

    fn execute_bodies(&mut self) {
        debug!(
            types = self.type_bodies.len(),
            media_types = self.media_type_bodies.len(),
            resources = self.resource_bodies.len(),
            "executing declaration bodies"
        );

        for (id, body) in std::mem::take(&mut self.type_bodies) {
            let mut def = self.registry.take_user_type(id);
            body(&mut TypeDsl::new(
                &mut def,
                Scope::new(&mut self.registry, &mut self.errors),
            ));
            self.registry.restore_user_type(def);
        }

        for (id, body) in std::mem::take(&mut self.media_type_bodies) {
            let mut def = self.registry.take_media_type(id);
            body(&mut MediaTypeDsl::new(
                &mut def,
                Scope::new(&mut self.registry, &mut self.errors),
            ));
            self.registry.restore_media_type(def);
        }

        for (id, body) in std::mem::take(&mut self.resource_bodies) {
            let mut def = self.registry.take_resource(id);
            body(&mut ResourceDsl::new(
                &mut def,
                Scope::new(&mut self.registry, &mut self.errors),
            ));
            self.registry.restore_resource(def);
        }
    }

    /// Untyped attributes take type, description, validations and default
    /// from the same-named attribute of the referenced media type.
    fn inherit_references(&mut self) {
        let mut inherited = 0usize;
        for index in 0..self.registry.all_media_types().len() {
            let id = MediaTypeId(index);
            let def = self.registry.media_type(id);
            let Some(reference) = def.reference.clone() else {
                continue;
            };
            let Some(target) = self.registry.resolve_media(&reference) else {
                self.errors.push(DslError::resolution(
                    def.context(),
                    format!("referenced media type {reference} is not defined"),
                ));
                continue;
            };
            if target == id {
                continue;
            }
            let Some(base) = self.registry.media_type(target).attributes().cloned() else {
                continue;
            };
            let def = self.registry.media_type_mut(id);
            if let Some(members) = def.attribute.data_type.as_object_mut() {
                for (name, member) in members.iter_mut() {
                    if let Some(base_member) = base.get(name) {
                        member.inherit(base_member);
                        inherited += 1;
                    }
                }
            }
        }
        debug!(inherited, "inherited referenced attributes");
    }

    /// Turns declared views into object definitions projecting the parent's
    /// attributes.
    fn project_views(&mut self) {
        let mut projected = 0usize;
        for index in 0..self.registry.all_media_types().len() {
            let def = self.registry.media_type_mut(MediaTypeId(index));
            let pending = std::mem::take(&mut def.pending_views);
            for view in pending {
                let view_context = format!("view {:?} of {}", view.name, def.context());
                let mut members = Object::new();
                for (name, nested_view) in view.attributes {
                    let Some(parent) = def.attribute_named(&name) else {
                        self.errors.push(DslError::resolution(
                            &view_context,
                            format!("attribute {name:?} is not defined"),
                        ));
                        continue;
                    };
                    let mut attribute = parent.clone();
                    if nested_view.is_some() {
                        attribute.view = nested_view;
                    }
                    members.insert(name, attribute);
                }
                let definition = ViewDefinition {
                    name: view.name.clone(),
                    parent: def.id,
                    attribute: AttributeDefinition::new(members),
                };
                def.views.insert(view.name, definition);
                projected += 1;
            }
        }
        debug!(projected, "projected views");
    }

    /// Binds collection wrappers to their elements. Collections of
    /// collections wait until their element is bound.
    fn resolve_collections(&mut self) {
        let mut pending: Vec<MediaTypeId> = self
            .registry
            .all_media_types()
            .iter()
            .filter(|def| def.is_collection())
            .map(|def| def.id)
            .collect();
        let mut bound = 0usize;

        loop {
            let before = pending.len();
            pending.retain(|&id| {
                let Some(element) = self.element_ready(id) else {
                    return true;
                };
                self.bind_collection(id, element);
                bound += 1;
                false
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
        debug!(bound, unresolved = pending.len(), "bound collections");
    }

    /// Element of collection `id` when it can be bound now.
    fn element_ready(&self, id: MediaTypeId) -> Option<MediaTypeId> {
        let collection = self.registry.media_type(id).collection.as_ref()?;
        let element = self.registry.resolve_media(&collection.element)?;
        let element_def = self.registry.media_type(element);
        match &element_def.collection {
            Some(inner) if inner.resolved.is_none() => None,
            _ => Some(element),
        }
    }

    fn bind_collection(&mut self, id: MediaTypeId, element: MediaTypeId) {
        let element_def = self.registry.media_type(element);
        let identifier = collection_identifier(&element_def.identifier);
        let type_name = collection_type_name(&element_def.type_name);
        let view_names: Vec<String> = element_def.views.keys().cloned().collect();

        let array_of = |view: Option<String>| {
            let mut item = AttributeDefinition::new(DataType::Media(element));
            item.view = view;
            AttributeDefinition::new(DataType::Array(ArrayType {
                element: Box::new(item),
            }))
        };

        let def = self.registry.media_type_mut(id);
        def.identifier = identifier;
        def.type_name = type_name;
        def.attribute = array_of(None);
        for name in view_names {
            let view = ViewDefinition {
                name: name.clone(),
                parent: id,
                attribute: array_of(Some(name.clone())),
            };
            def.views.insert(name, view);
        }
        if let Some(collection) = def.collection.as_mut() {
            collection.resolved = Some(element);
        }

        if let Err(owner) = self.registry.register_media_type(id)
            && !self.registry.media_type(owner).is_collection()
        {
            let def = self.registry.media_type(id);
            self.errors.push(DslError::duplicate(
                def.context(),
                format!(
                    "collection identifier is already used by {}",
                    self.registry.media_type(owner).context()
                ),
            ));
        }
    }

    /// Resolves declared links against the parent attributes.
    fn resolve_links(&mut self) {
        let mut resolved = 0usize;
        for index in 0..self.registry.all_media_types().len() {
            let id = MediaTypeId(index);
            let pending = std::mem::take(&mut self.registry.media_type_mut(id).pending_links);
            let mut links = Vec::with_capacity(pending.len());
            {
                let def = self.registry.media_type(id);
                for link in pending {
                    let link_context = format!("link {:?} of {}", link.name, def.context());
                    let Some(attribute) = def.attribute_named(&link.name) else {
                        self.errors.push(DslError::resolution(
                            link_context,
                            format!("attribute {:?} is not defined", link.name),
                        ));
                        continue;
                    };
                    let Some(target) = attribute.data_type.media_type() else {
                        self.errors.push(DslError::resolution(
                            link_context,
                            format!(
                                "attribute {:?} is a {}, not a media type",
                                link.name,
                                attribute.data_type.name()
                            ),
                        ));
                        continue;
                    };
                    let view = link.view.unwrap_or_else(|| {
                        self.registry
                            .media_type(target)
                            .preferred_link_view()
                            .to_string()
                    });
                    links.push(LinkDefinition {
                        name: link.name,
                        view,
                        parent: id,
                        target,
                    });
                }
            }
            resolved += links.len();
            let def = self.registry.media_type_mut(id);
            for link in links {
                def.links.insert(link.name.clone(), link);
            }
        }
        debug!(resolved, "resolved links");
    }

    fn resolve_resources(&mut self) {
        for index in 0..self.registry.all_resources().len() {
            let id = ResourceId(index);
            let resource = self.registry.resource(id);
            let default_media = resource
                .media
                .as_ref()
                .and_then(|media| self.registry.resolve_media(media));
            let responses: Vec<Vec<Option<MediaTypeId>>> = resource
                .actions
                .values()
                .map(|action| {
                    action
                        .responses
                        .values()
                        .map(|response| match &response.media {
                            Some(media) => self.registry.resolve_media(media),
                            None => default_media,
                        })
                        .collect()
                })
                .collect();

            let resource = self.registry.resource_mut(id);
            resource.resolved_media = default_media;
            for (action, resolved) in resource.actions.values_mut().zip(responses) {
                for (response, media) in action.responses.values_mut().zip(resolved) {
                    response.resolved_media = media;
                }
            }
        }
        debug!(resources = self.registry.all_resources().len(), "resolved resource media");
    }

    fn validate_all(&mut self) {
        let before = self.errors.len();
        let registry = &self.registry;
        for def in registry.all_user_types() {
            def.validate_into(registry, &mut self.errors);
        }
        for def in registry.all_media_types() {
            def.validate_into(registry, &mut self.errors);
        }
        for def in registry.all_resources() {
            def.validate_into(registry, &mut self.errors);
        }
        debug!(found = self.errors.len() - before, "validated definitions");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::Primitive;
    use tracing_test::traced_test;

    #[test]
    fn empty_design_runs() {
        let mut design = Design::new();
        assert!(design.run().is_ok());
        assert!(design.is_finalized());
    }

    #[test]
    fn second_run_returns_first_outcome() {
        let mut design = Design::new();
        design.media_type("application/vnd.a", |m| {
            m.attribute("x");
        });
        let first = design.run().unwrap_err();
        let second = design.run().unwrap_err();
        assert_eq!(first, second);
        assert_eq!(design.errors().len(), first.len());
    }

    #[test]
    #[should_panic(expected = "after the design ran")]
    fn declaring_after_run_panics() {
        let mut design = Design::new();
        design.run().unwrap();
        design.media_type("application/vnd.late", |_| {});
    }

    #[test]
    fn plain_identifiers_are_accepted() {
        let mut design = Design::new();
        let foo = design.media_type("foo", |m| {
            m.attribute("att");
            m.view("default", |v| v.attribute("att"));
        });
        design.run().unwrap();

        let registry = design.registry();
        assert_eq!(registry.find_media_type("Foo"), Some(foo));
        assert_eq!(registry.media_type(foo).type_name, "Foo");
        assert!(registry.media_type(foo).attribute_named("att").unwrap().example.value().is_some());
    }

    #[test]
    fn plain_identifier_media_types_link() {
        let mut design = Design::new();
        let foo = design.media_type("foo", |m| {
            m.attribute("att");
            m.view("default", |v| v.attribute("att"));
            m.view("link", |v| v.attribute("att"));
        });
        let bar = design.media_type("bar", |m| {
            m.attribute("foo").of("foo");
            m.links(|l| l.link("foo"));
            m.view("default", |v| v.attribute("foo"));
        });
        design.run().unwrap();

        let link = &design.registry().media_type(bar).links["foo"];
        assert_eq!(link.target, foo);
        assert_eq!(link.view, "link");
        assert_eq!(link.parent, bar);
    }

    #[test]
    fn anonymous_type_names_are_numbered() {
        let mut design = Design::new();
        let id = design.media_type("", |_| {});
        let _ = design.run();
        assert_eq!(design.registry().media_type(id).type_name, "MediaType1");
    }

    #[test]
    fn unknown_attribute_type_is_resolution_error() {
        let mut design = Design::new();
        design.media_type("application/vnd.a", |m| {
            m.attribute("x").of("application/vnd.missing");
            m.view("default", |v| v.attribute("x"));
        });
        let err = design.run().unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.has_kind(ErrorKind::Resolution));
        assert!(err.to_string().contains("unknown type \"application/vnd.missing\""));
    }

    #[test]
    fn forward_references_resolve_by_identifier() {
        let mut design = Design::new();
        let a = design.media_type("application/vnd.a", |m| {
            m.attribute("b").of("application/vnd.b+json");
            m.view("default", |v| v.attribute("b"));
        });
        let b = design.media_type("application/vnd.b+json", |m| {
            m.attribute("name").of(Primitive::String);
            m.view("default", |v| v.attribute("name"));
        });
        design.run().unwrap();
        let attribute = design.registry().media_type(a).attribute_named("b").unwrap();
        assert_eq!(attribute.data_type.media_type(), Some(b));
    }

    #[test]
    fn view_of_unknown_attribute_is_reported() {
        let mut design = Design::new();
        design.media_type("application/vnd.a", |m| {
            m.attribute("x");
            m.view("default", |v| {
                v.attribute("x");
                v.attribute("y");
            });
        });
        let err = design.run().unwrap_err();
        assert_eq!(
            err.errors()[0].context,
            "view \"default\" of media type \"application/vnd.a\""
        );
    }

    #[test]
    fn duplicate_view_is_reported() {
        let mut design = Design::new();
        design.media_type("application/vnd.a", |m| {
            m.attribute("x");
            m.view("default", |v| v.attribute("x"));
            m.view("default", |v| v.attribute("x"));
        });
        let err = design.run().unwrap_err();
        assert!(err.has_kind(ErrorKind::Duplicate));
    }

    #[test]
    fn reference_fills_untyped_attributes() {
        let mut design = Design::new();
        let base = design.media_type("application/vnd.base", |m| {
            m.attribute("id").of(Primitive::Integer).description("identifier");
            m.view("default", |v| v.attribute("id"));
        });
        let derived = design.media_type("application/vnd.derived", move |m| {
            m.reference(base);
            m.attribute("id");
            m.view("default", |v| v.attribute("id"));
        });
        design.run().unwrap();

        let id = design.registry().media_type(derived).attribute_named("id").unwrap();
        assert_eq!(id.data_type.primitive(), Some(Primitive::Integer));
        assert_eq!(id.description.as_deref(), Some("identifier"));
    }

    #[test]
    fn resource_response_inherits_media() {
        let mut design = Design::new();
        let bottle = design.media_type("application/vnd.bottle", |m| {
            m.attribute("name");
            m.view("default", |v| v.attribute("name"));
        });
        let resource = design.resource("bottle", |r| {
            r.media("application/vnd.bottle+json");
            r.action("show", |a| {
                a.response("OK", 200).view("default");
            });
        });
        design.run().unwrap();

        let response = &design.registry().resource(resource).actions["show"].responses["OK"];
        assert_eq!(response.resolved_media, Some(bottle));
    }

    #[test]
    fn no_examples_when_disabled() {
        let mut design = Design::with_config(DesignConfig {
            generate_examples: false,
            ..DesignConfig::default()
        });
        let id = design.media_type("application/vnd.a", |m| {
            m.attribute("x");
            m.view("default", |v| v.attribute("x"));
        });
        design.run().unwrap();
        let x = design.registry().media_type(id).attribute_named("x").unwrap();
        assert!(x.example.value().is_none());
    }

    #[traced_test]
    #[test]
    fn collected_errors_are_logged() {
        let mut design = Design::new();
        design.media_type("application/vnd.a", |m| {
            m.attribute("x");
        });
        let _ = design.run();
        assert!(logs_contain("does not define a \"default\" view"));
        assert!(logs_contain("design run complete"));
    }
}
