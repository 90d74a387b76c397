//! Built-in actions: completion, element interaction and application control.

use crate::config::ControllerConfig;
use crate::errors::ActionError;
use crate::platforms::AutomationEngine;
use crate::registry::Registry;
use crate::types::{ClickElementAction, InputTextAction, NoParamsAction, OpenAppAction};
use std::sync::Arc;
use std::time::Duration;

mod apps;
mod done;
mod element;

pub use apps::{list_running_apps, open_app};
pub use done::done;
pub use element::{click_element, input_text};

/// Register the default action set, in the order it is offered to planners.
pub fn register_default_actions(
    registry: &mut Registry,
    engine: Arc<dyn AutomationEngine>,
    config: &ControllerConfig,
) -> Result<(), ActionError> {
    registry.action("done", "Complete task with text for the user", done)?;

    let input_engine = engine.clone();
    registry.context_action(
        "input_text",
        "Input text",
        move |params: InputTextAction, context| {
            input_text(input_engine.clone(), params, context)
        },
    )?;

    let click_engine = engine.clone();
    registry.context_action(
        "click_element",
        "Click element",
        move |params: ClickElementAction, context| {
            click_element(click_engine.clone(), params, context)
        },
    )?;

    let open_engine = engine.clone();
    let settle_delay = Duration::from_millis(config.launch_settle_delay_ms);
    registry.action("open_app", "Open a mac app", move |params: OpenAppAction| {
        open_app(open_engine.clone(), params, settle_delay)
    })?;

    registry.action(
        "list_running_apps",
        "List running mac apps (returns localized name, bundle id, and app path)",
        move |_: NoParamsAction| list_running_apps(engine.clone()),
    )?;

    Ok(())
}
