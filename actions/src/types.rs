use crate::errors::ActionError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Outcome of a single action, as seen by the sequence runner and the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Human readable outcome of the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_content: Option<String>,
    /// Recoverable failure message; halts a running sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Signals that the task is complete
    #[serde(default)]
    pub is_done: bool,
    /// Process id of the application an action brought up, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_app_pid: Option<u32>,
}

impl ActionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn content(text: impl Into<String>) -> Self {
        Self {
            extracted_content: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn done(text: impl Into<String>) -> Self {
        Self {
            extracted_content: Some(text.into()),
            is_done: true,
            ..Default::default()
        }
    }

    /// A recoverable failure. The message is reported both as content and as
    /// the error so it reaches the planner and halts the sequence.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            extracted_content: Some(message.clone()),
            error: Some(message),
            ..Default::default()
        }
    }

    pub fn with_app_pid(mut self, pid: u32) -> Self {
        self.current_app_pid = Some(pid);
        self
    }

    /// A terminal result stops a running sequence.
    pub fn is_terminal(&self) -> bool {
        self.is_done || self.error.is_some()
    }

    /// Completed without a recorded error. `is_done` alone does not count.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A single structured action request: action name mapped to its parameters.
///
/// Exactly one entry is expected to be populated. Entries whose value is
/// `null` count as unset, and an empty request is a valid no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionRequest(BTreeMap<String, Value>);

impl ActionRequest {
    pub fn new(action: impl Into<String>, params: Value) -> Self {
        Self::default().with(action, params)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: impl Into<String>, params: Value) -> Self {
        self.0.insert(action.into(), params);
        self
    }

    pub fn get(&self, action: &str) -> Option<&Value> {
        self.0.get(action).filter(|v| !v.is_null())
    }

    /// Populated entries only.
    pub fn populated(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(_, params)| !params.is_null())
            .map(|(name, params)| (name.as_str(), params))
    }

    pub fn is_empty(&self) -> bool {
        self.populated().next().is_none()
    }
}

/// What an action implementation handed back, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput {
    Text(String),
    Result(ActionResult),
    Nothing,
    /// Untyped output from a dynamic handler
    Raw(Value),
}

impl ActionOutput {
    /// Normalize into an [`ActionResult`]: text becomes content, results pass
    /// through, nothing becomes an empty result. Any other raw JSON shape is
    /// rejected.
    pub fn into_result(self, action: &str) -> Result<ActionResult, ActionError> {
        match self {
            ActionOutput::Text(text) => Ok(ActionResult::content(text)),
            ActionOutput::Result(result) => Ok(result),
            ActionOutput::Nothing => Ok(ActionResult::empty()),
            ActionOutput::Raw(Value::String(text)) => Ok(ActionResult::content(text)),
            ActionOutput::Raw(Value::Null) => Ok(ActionResult::empty()),
            ActionOutput::Raw(other) => Err(ActionError::InvalidResultType {
                action: action.to_string(),
                found: format!("{} ({})", json_kind(&other), other),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<String> for ActionOutput {
    fn from(text: String) -> Self {
        ActionOutput::Text(text)
    }
}

impl From<&'static str> for ActionOutput {
    fn from(text: &'static str) -> Self {
        ActionOutput::Text(text.to_string())
    }
}

impl From<ActionResult> for ActionOutput {
    fn from(result: ActionResult) -> Self {
        ActionOutput::Result(result)
    }
}

impl From<()> for ActionOutput {
    fn from(_: ()) -> Self {
        ActionOutput::Nothing
    }
}

impl From<Value> for ActionOutput {
    fn from(value: Value) -> Self {
        ActionOutput::Raw(value)
    }
}

impl<T: Into<ActionOutput>> From<Option<T>> for ActionOutput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ActionOutput::Nothing)
    }
}

// ===== Built-in action parameters =====

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DoneAction {
    #[schemars(description = "Final answer or summary for the user")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InputTextAction {
    #[schemars(description = "Index of the target element in the current UI tree")]
    pub index: usize,
    #[schemars(description = "Text to type into the element")]
    pub text: String,
    #[schemars(description = "Press return after typing. Defaults to false.")]
    #[serde(default)]
    pub submit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClickElementAction {
    #[schemars(description = "Index of the element to click in the current UI tree")]
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OpenAppAction {
    #[schemars(description = "Application name, e.g. 'Safari' or 'Calculator'")]
    pub app_name: String,
}

/// Parameter model for actions that take no arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoParamsAction {}

/// A running application as reported by the capability provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningApplication {
    pub pid: u32,
    pub localized_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl RunningApplication {
    /// Substring match on the bundle id, or on the localized name for
    /// processes that have no bundle id. `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        match &self.bundle_id {
            Some(bundle_id) => bundle_id.to_lowercase().contains(needle),
            None => self.localized_name.to_lowercase().contains(needle),
        }
    }
}

impl fmt::Display for RunningApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Path not available".to_string());
        write!(
            f,
            "{} => {} => Path: {}",
            self.localized_name,
            self.bundle_id.as_deref().unwrap_or("unknown"),
            path
        )
    }
}
