//! apidsl generator library.
//!
//! This crate runs designs authored with `apidsl-define` and exports the
//! resolved graph (media types with their views, links and examples, user
//! types and resources) as JSON for downstream code generators.
//!
//! ## Modules
//!
//! - [`export`] - Design loading, JSON rendering and atomic file writing
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```
//! use apidsl_define::DesignConfig;
//! use apidsl_gen::export::{load_design, render_json};
//!
//! let mut design = load_design("org-chart", DesignConfig::seeded(7)).unwrap();
//! let json = render_json(&mut design).unwrap();
//! assert!(json.contains("\"EmployeeCollection\""));
//! ```

pub mod errors;
pub mod export;

pub use errors::GeneratorError;
