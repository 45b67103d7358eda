//! Convenient re-exports for authoring designs.
//!
//! ## Examples
//!
//! ```
//! use apidsl_define::prelude::*;
//!
//! let mut design = Design::new();
//! design.user_type("Address", |t| {
//!     t.attribute("city").of(Primitive::String).min_length(1);
//! });
//! design.resource("health", |r| {
//!     r.action("ping", |a| {
//!         a.response("NoContent", 204);
//!     });
//! });
//! assert!(design.run().is_ok());
//! ```

pub use crate::attribute::{Example, Format};
pub use crate::config::DesignConfig;
pub use crate::dsl::{
    ActionDsl, AttributeDsl, AttributesDsl, LinksDsl, MediaTypeDsl, ResourceDsl, ResponseDsl,
    TypeDsl, ViewDsl,
};
pub use crate::engine::Design;
pub use crate::error::{ErrorKind, MultiError};
pub use crate::types::{DataType, MediaRef, MediaTypeId, Primitive, TypeRef, UserTypeId};
