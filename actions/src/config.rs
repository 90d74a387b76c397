use serde::{Deserialize, Serialize};

/// Settings applied when a [`crate::Controller`] builds its registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Action names that are never registered.
    pub exclude_actions: Vec<String>,
    /// Fail startup when an excluded action is registered instead of skipping it.
    pub strict_exclusions: bool,
    /// How long `open_app` waits for a launched process to show up.
    pub launch_settle_delay_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            exclude_actions: Vec::new(),
            strict_exclusions: false,
            launch_settle_delay_ms: 1000,
        }
    }
}

impl ControllerConfig {
    pub fn with_exclusions<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_actions = exclude.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_launch_settle_delay_ms(mut self, delay_ms: u64) -> Self {
        self.launch_settle_delay_ms = delay_ms;
        self
    }
}
