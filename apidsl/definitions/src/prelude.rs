//! Convenient re-exports for working with bundled designs.
//!
//! ## Examples
//!
//! ```
//! use apidsl_definitions::prelude::*;
//!
//! let mut design = define_org_chart_design();
//! assert!(design.run().is_ok());
//! ```

// Design functions
pub use crate::cellar::{define_cellar_design, define_cellar_design_with};
pub use crate::org_chart::{define_org_chart_design, define_org_chart_design_with};
pub use crate::{DESIGN_NAMES, design_by_name};

// Identifiers used by the designs
pub use crate::cellar::{ACCOUNT, BOTTLE, ERROR};
pub use crate::org_chart::EMPLOYEE;
