/// Bound on the number of repairs [`crate::Grammar::left_factor`] may apply.
pub const DEFAULT_MAX_STEPS: usize = 64;

/// Configuration for left factoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorConfig {
    /// Maximum number of repair steps before giving up
    pub max_steps: usize,
}

impl FactorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}
