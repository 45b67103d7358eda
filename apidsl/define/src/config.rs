//! Run configuration.

use serde::Serialize;

/// Knobs for a design run.
///
/// ## Examples
///
/// ```
/// use apidsl_define::DesignConfig;
///
/// let config = DesignConfig::seeded(42);
/// assert_eq!(config.seed, Some(42));
/// assert!(config.generate_examples);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesignConfig {
    /// Seed for example synthesis. `None` draws a fresh seed for every run.
    pub seed: Option<u64>,
    /// Upper bound on synthesized array, collection and map sizes when the
    /// attribute has no `max_length`.
    pub max_collection_length: usize,
    /// Extra repetitions allowed for unbounded pattern quantifiers (`*`, `+`).
    pub max_pattern_repeat: u32,
    /// Whether the run ends with example generation.
    pub generate_examples: bool,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_collection_length: 3,
            max_pattern_repeat: 5,
            generate_examples: true,
        }
    }
}

impl DesignConfig {
    /// Default configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}
