use crate::errors::ActionError;
use crate::types::{ActionResult, DoneAction};

/// Finish the task and hand the final text back to the user.
pub async fn done(params: DoneAction) -> Result<ActionResult, ActionError> {
    Ok(ActionResult::done(params.text))
}
