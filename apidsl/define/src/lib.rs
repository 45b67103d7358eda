//! apidsl Design Engine
//!
//! This crate turns declarative API designs into a resolved, validated graph
//! of media types, user types and resources, enriched with example values.
//! The resolved graph is what downstream generators (documentation, clients,
//! servers) consume; `apidsl-gen` exports it as JSON.
//!
//! ## Core Types
//!
//! - [`Design`] - A compilation session: declarations, the two-phase run, results
//! - [`Registry`] - Arena storage of every definition plus identifier lookup
//! - [`MediaTypeDefinition`] - An object type with named views and links
//! - [`ViewDefinition`] / [`LinkDefinition`] - Projections and embedded references
//! - [`UserTypeDefinition`] - A named type
//! - [`ResourceDefinition`] - A resource with actions and responses
//! - [`AttributeDefinition`] - A typed field with validations and an example
//! - [`DataType`] / [`Primitive`] - The closed type system
//! - [`ErrorCollector`] / [`MultiError`] / [`DslError`] - Collected design errors
//! - [`ExampleGenerator`] - Validation-aware example synthesis
//!
//! ## Two-phase run
//!
//! Declaring a media type, user type, resource or collection registers a bare
//! definition right away and queues its body. [`Design::run`] executes the
//! bodies once everything is registered, so declarations may reference types
//! declared later, then resolves views, collections and links, validates
//! every definition and finally generates examples.
//!
//! ## Examples
//!
//! ```
//! use apidsl_define::prelude::*;
//!
//! let mut design = Design::with_config(DesignConfig::seeded(1));
//! let node = design.media_type("application/vnd.node+json", |m| {
//!     let me = m.id();
//!     m.attribute("value").of(Primitive::Integer).minimum(0);
//!     m.attribute("next").of(me);
//!     m.view("default", |v| {
//!         v.attribute("value");
//!         v.attribute("next");
//!     });
//! });
//! design.run().unwrap();
//!
//! let mt = design.registry().media_type(node);
//! assert_eq!(mt.type_name, "Node");
//! let example = mt.attribute_named("next").unwrap().example.value().unwrap();
//! assert!(example.get("value").is_some());
//! ```
//!
//! ## Design Definitions
//!
//! Complete designs live in the separate `apidsl-definitions` crate.

pub mod attribute;
pub mod config;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod example;
pub mod identifier;
pub mod media_type;
pub mod prelude;
pub mod registry;
pub mod resource;
pub mod types;
pub mod user_type;

// Re-export main types at crate root
pub use attribute::{AttributeDefinition, Example, Format, ValidationDefinition};
pub use config::DesignConfig;
pub use dsl::{
    ActionDsl, AttributeDsl, AttributesDsl, LinksDsl, MediaTypeDsl, ResourceDsl, ResponseDsl,
    TypeDsl, ViewDsl,
};
pub use engine::Design;
pub use error::{DslError, ErrorCollector, ErrorKind, MultiError};
pub use example::ExampleGenerator;
pub use media_type::{
    CollectionDefinition, DEFAULT_VIEW, LINK_VIEW, LinkDefinition, MediaTypeDefinition,
    ViewDefinition,
};
pub use registry::Registry;
pub use resource::{ActionDefinition, ResourceDefinition, ResponseDefinition};
pub use types::{
    ArrayType, DataType, MapType, MediaRef, MediaTypeId, Object, Primitive, ResourceId, TypeKey,
    TypeRef, UserTypeId,
};
pub use user_type::UserTypeDefinition;
