use crate::{AutomationError, RunningApplication, UIElement};
use std::sync::Arc;

pub mod system;

pub use system::SystemEngine;

/// The side-effecting primitives built-in actions are written against.
///
/// Each call reports plain success (`Ok(true)`), a clean refusal
/// (`Ok(false)`), or a failure. Actions turn both of the latter into a
/// recoverable [`crate::ActionResult`] error.
#[async_trait::async_trait]
pub trait AutomationEngine: Send + Sync {
    /// Click the given element
    async fn click(&self, element: &UIElement) -> Result<bool, AutomationError>;

    /// Type text into the given element, optionally pressing return afterwards
    async fn type_into(
        &self,
        element: &UIElement,
        text: &str,
        submit: bool,
    ) -> Result<bool, AutomationError>;

    /// Launch an application by name
    async fn launch_application(&self, app_name: &str) -> Result<bool, AutomationError>;

    /// Enumerate running applications
    async fn running_applications(&self) -> Result<Vec<RunningApplication>, AutomationError>;
}

/// Create the capability provider for the current platform
pub fn create_engine() -> Result<Arc<dyn AutomationEngine>, AutomationError> {
    #[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
    {
        Ok(Arc::new(SystemEngine::new()))
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        Err(AutomationError::UnsupportedPlatform(
            "Current platform is not supported".to_string(),
        ))
    }
}
