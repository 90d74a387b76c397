use crate::element::ElementContext;
use crate::errors::ActionError;
use crate::platforms::AutomationEngine;
use crate::types::{ActionResult, ClickElementAction, InputTextAction};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn invalid_index(index: usize) -> ActionResult {
    let msg = format!("Invalid index {index}: no element with this index in the current UI tree");
    warn!("{}", msg);
    ActionResult::failure(msg)
}

/// Type text into the element at `params.index`.
///
/// Bad indices and capability failures come back as a failed
/// [`ActionResult`]; nothing here propagates an error.
pub async fn input_text(
    engine: Arc<dyn AutomationEngine>,
    params: InputTextAction,
    context: ElementContext,
) -> Result<ActionResult, ActionError> {
    let InputTextAction {
        index,
        text,
        submit,
    } = params;
    info!("Inputting text {} into element with index {}", text, index);

    let Some(element) = context.get(index) else {
        return Ok(invalid_index(index));
    };
    debug!("Attempting to input text into {}", element);

    let result = match engine.type_into(&element, &text, submit).await {
        Ok(true) => ActionResult::content(format!(
            "Input text '{text}' into element with index {index}"
        )),
        Ok(false) => ActionResult::failure(format!(
            "Failed to input text into element with index {index}"
        )),
        Err(e) => {
            warn!("Typing into element {} failed: {}", index, e);
            ActionResult::failure(format!(
                "An error occurred while inputting text into element with index {index}: {e}"
            ))
        }
    };
    Ok(result)
}

/// Click the element at `params.index`.
pub async fn click_element(
    engine: Arc<dyn AutomationEngine>,
    params: ClickElementAction,
    context: ElementContext,
) -> Result<ActionResult, ActionError> {
    let index = params.index;
    info!("Clicking element {}", index);

    let Some(element) = context.get(index) else {
        return Ok(invalid_index(index));
    };
    debug!("Attempting to click {}", element);

    let result = match engine.click(&element).await {
        Ok(true) => ActionResult::content(format!("Clicked element with index {index}")),
        Ok(false) => ActionResult::failure(format!("Failed to click element with index {index}")),
        Err(e) => {
            warn!("Clicking element {} failed: {}", index, e);
            ActionResult::failure(format!(
                "An error occurred while clicking element with index {index}: {e}"
            ))
        }
    };
    Ok(result)
}
