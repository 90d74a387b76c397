//! Named desktop automation actions with schema-validated parameters.
//!
//! A [`Registry`] maps action names to descriptors and implementations. The
//! [`Controller`] owns a registry populated with the built-in actions and
//! dispatches planner-issued [`ActionRequest`]s against it, one at a time,
//! halting a sequence on the first terminal [`ActionResult`].

pub mod actions;
pub mod config;
pub mod controller;
pub mod element;
pub mod errors;
pub mod plan;
pub mod platforms;
pub mod registry;
pub mod types;

pub use config::ControllerConfig;
pub use controller::Controller;
pub use element::{ElementCache, ElementContext, UIElement, UITreeCache};
pub use errors::{ActionError, AutomationError};
pub use platforms::AutomationEngine;
pub use registry::{ActionDescriptor, RegisterOutcome, Registry};
pub use types::{ActionOutput, ActionRequest, ActionResult, RunningApplication};
