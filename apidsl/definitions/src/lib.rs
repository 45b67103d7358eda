//! apidsl Design Definitions
//!
//! This crate contains complete API designs authored with `apidsl-define`.
//! Each design is organized in its own module.
//!
//! ## Available Designs
//!
//! - [`cellar`] - Wine cellar accounts and bottles
//! - [`org_chart`] - Self-referential employees and departments
//!
//! ## Examples
//!
//! ```
//! use apidsl_definitions::design_by_name;
//! use apidsl_define::DesignConfig;
//!
//! let mut design = design_by_name("cellar", DesignConfig::seeded(1)).unwrap();
//! assert!(design.run().is_ok());
//! assert!(design_by_name("nope", DesignConfig::default()).is_none());
//! ```

pub mod cellar;
pub mod org_chart;
pub mod prelude;

use apidsl_define::{Design, DesignConfig};

// Re-export design functions for convenience
pub use cellar::{define_cellar_design, define_cellar_design_with};
pub use org_chart::{define_org_chart_design, define_org_chart_design_with};

/// Names accepted by [`design_by_name`].
pub const DESIGN_NAMES: [&str; 2] = ["cellar", "org-chart"];

/// Builds a bundled design by name.
pub fn design_by_name(name: &str, config: DesignConfig) -> Option<Design> {
    match name {
        "cellar" => Some(define_cellar_design_with(config)),
        "org-chart" | "org_chart" => Some(define_org_chart_design_with(config)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_design_builds_and_runs() {
        for name in DESIGN_NAMES {
            let mut design = design_by_name(name, DesignConfig::seeded(0)).unwrap();
            assert!(design.run().is_ok(), "{name} failed");
        }
    }
}
