//! Named action registry: registration, lookup, parameter validation and
//! context injection.

use crate::element::ElementContext;
use crate::errors::ActionError;
use crate::types::{ActionOutput, ActionResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use schemars::{JsonSchema, Schema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Future produced by a prepared action call.
pub type ActionFuture = BoxFuture<'static, Result<ActionOutput, ActionError>>;

/// An action whose parameters have been validated, waiting for its context.
pub type PreparedAction = Box<dyn FnOnce(Option<ElementContext>) -> ActionFuture + Send>;

/// Type-erased action implementation: validates raw parameters and returns a
/// call ready to be invoked.
pub type ActionHandler =
    Arc<dyn Fn(Value) -> Result<PreparedAction, serde_json::Error> + Send + Sync>;

/// Registered metadata for one named action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_schema: Schema,
    pub requires_context: bool,
}

impl ActionDescriptor {
    /// Descriptor whose schema is derived from the parameter type `P`.
    pub fn for_params<P: JsonSchema>(
        name: impl Into<String>,
        description: impl Into<String>,
        requires_context: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema: schemars::schema_for!(P),
            requires_context,
        }
    }
}

/// Whether a registration made it into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    Excluded,
}

struct RegisteredAction {
    descriptor: ActionDescriptor,
    handler: ActionHandler,
}

/// Ordered collection of actions keyed by unique name.
///
/// Populated once during startup; dispatch only reads from it.
pub struct Registry {
    actions: Vec<RegisteredAction>,
    by_name: HashMap<String, usize>,
    exclude: HashSet<String>,
    strict_exclusions: bool,
}

impl Registry {
    pub fn new<I, S>(exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: Vec::new(),
            by_name: HashMap::new(),
            exclude: exclude.into_iter().map(Into::into).collect(),
            strict_exclusions: false,
        }
    }

    /// Fail registration of excluded names instead of skipping them.
    pub fn with_strict_exclusions(mut self, strict: bool) -> Self {
        self.strict_exclusions = strict;
        self
    }

    /// Register an action under `descriptor.name`.
    ///
    /// Excluded names are skipped (or rejected in strict mode) and never become
    /// callable. Registering a name twice is an error.
    pub fn register(
        &mut self,
        descriptor: ActionDescriptor,
        handler: ActionHandler,
    ) -> Result<RegisterOutcome, ActionError> {
        let name = descriptor.name.clone();
        if self.exclude.contains(&name) {
            if self.strict_exclusions {
                return Err(ActionError::ExcludedAction(name));
            }
            debug!("Skipping excluded action '{}'", name);
            return Ok(RegisterOutcome::Excluded);
        }
        if self.by_name.contains_key(&name) {
            return Err(ActionError::DuplicateAction(name));
        }

        debug!(
            requires_context = descriptor.requires_context,
            "Registered action '{}'", name
        );
        self.by_name.insert(name, self.actions.len());
        self.actions.push(RegisteredAction {
            descriptor,
            handler,
        });
        Ok(RegisterOutcome::Registered)
    }

    /// Register an action that takes typed parameters and no context.
    pub fn action<P, F, Fut, O>(
        &mut self,
        name: &str,
        description: &str,
        f: F,
    ) -> Result<RegisterOutcome, ActionError>
    where
        P: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ActionError>> + Send + 'static,
        O: Into<ActionOutput> + 'static,
    {
        let f = Arc::new(f);
        let handler: ActionHandler = Arc::new(
            move |raw: Value| -> Result<PreparedAction, serde_json::Error> {
                let params: P = serde_json::from_value(raw)?;
                let f = f.clone();
                let prepared: PreparedAction =
                    Box::new(move |_context: Option<ElementContext>| -> ActionFuture {
                        f(params)
                            .map(|out| out.map(Into::<ActionOutput>::into))
                            .boxed()
                    });
                Ok(prepared)
            },
        );
        self.register(
            ActionDescriptor::for_params::<P>(name, description, false),
            handler,
        )
    }

    /// Register an action that needs the UI element context injected.
    pub fn context_action<P, F, Fut, O>(
        &mut self,
        name: &str,
        description: &str,
        f: F,
    ) -> Result<RegisterOutcome, ActionError>
    where
        P: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(P, ElementContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ActionError>> + Send + 'static,
        O: Into<ActionOutput> + 'static,
    {
        let f = Arc::new(f);
        let action_name = name.to_string();
        let handler: ActionHandler = Arc::new(
            move |raw: Value| -> Result<PreparedAction, serde_json::Error> {
                let params: P = serde_json::from_value(raw)?;
                let f = f.clone();
                let action_name = action_name.clone();
                let prepared: PreparedAction =
                    Box::new(move |context: Option<ElementContext>| -> ActionFuture {
                        match context {
                            Some(context) => f(params, context)
                                .map(|out| out.map(Into::<ActionOutput>::into))
                                .boxed(),
                            None => futures::future::ready(Err(ActionError::MissingContext(
                                action_name,
                            )))
                            .boxed(),
                        }
                    });
                Ok(prepared)
            },
        );
        self.register(
            ActionDescriptor::for_params::<P>(name, description, true),
            handler,
        )
    }

    pub fn get(&self, name: &str) -> Option<&ActionDescriptor> {
        self.by_name
            .get(name)
            .map(|&idx| &self.actions[idx].descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.actions.iter().map(|a| &a.descriptor)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Look up, validate, inject context, invoke and normalize.
    pub async fn execute(
        &self,
        name: &str,
        raw_parameters: Value,
        context: Option<ElementContext>,
    ) -> Result<ActionResult, ActionError> {
        let action = self
            .by_name
            .get(name)
            .map(|&idx| &self.actions[idx])
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;

        // A missing payload means "no arguments".
        let raw_parameters = match raw_parameters {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let prepared =
            (action.handler)(raw_parameters).map_err(|e| ActionError::InvalidParameters {
                action: name.to_string(),
                reason: e.to_string(),
            })?;

        let context = if action.descriptor.requires_context {
            Some(context.ok_or_else(|| ActionError::MissingContext(name.to_string()))?)
        } else {
            None
        };

        prepared(context).await?.into_result(name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{UIElement, UITreeCache};
    use crate::types::{ClickElementAction, DoneAction, NoParamsAction};
    use serde_json::json;

    fn registry_with_done(exclude: &[&str]) -> Registry {
        let mut registry = Registry::new(exclude.iter().copied());
        registry
            .action("done", "Complete task", |p: DoneAction| async move {
                Ok::<_, ActionError>(ActionResult::done(p.text))
            })
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_execute_valid_parameters() {
        let registry = registry_with_done(&[]);
        let result = registry
            .execute("done", json!({"text": "all good"}), None)
            .await
            .unwrap();
        assert!(result.is_done);
        assert_eq!(result.extracted_content.as_deref(), Some("all good"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = registry_with_done(&[]);
        let err = registry
            .action("done", "Again", |_: NoParamsAction| async { Ok::<_, ActionError>(()) })
            .unwrap_err();
        assert!(matches!(err, ActionError::DuplicateAction(name) if name == "done"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_excluded_action_is_skipped_and_unknown() {
        let mut registry = Registry::new(["done"]);
        let outcome = registry
            .action("done", "Complete task", |p: DoneAction| async move {
                Ok::<_, ActionError>(ActionResult::done(p.text))
            })
            .unwrap();
        assert_eq!(outcome, RegisterOutcome::Excluded);
        assert!(registry.is_empty());

        let err = registry
            .execute("done", json!({"text": "x"}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::UnknownAction(name) if name == "done"));
    }

    #[test]
    fn test_strict_exclusion_fails_registration() {
        let mut registry = Registry::new(["done"]).with_strict_exclusions(true);
        let err = registry
            .action("done", "Complete task", |_: DoneAction| async { Ok::<_, ActionError>(()) })
            .unwrap_err();
        assert!(matches!(err, ActionError::ExcludedAction(name) if name == "done"));
    }

    #[tokio::test]
    async fn test_invalid_parameters_report_first_violation() {
        let registry = registry_with_done(&[]);
        let err = registry
            .execute("done", json!({"txt": "typo"}), None)
            .await
            .unwrap_err();
        match err {
            ActionError::InvalidParameters { action, reason } => {
                assert_eq!(action, "done");
                assert!(reason.contains("text"), "reason was: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_context_action_requires_context() {
        let mut registry = Registry::default();
        registry
            .context_action(
                "click_element",
                "Click element",
                |p: ClickElementAction, ctx: ElementContext| async move {
                    Ok::<_, ActionError>(ctx.get(p.index).map(|e| e.to_string()))
                },
            )
            .unwrap();
        assert!(registry.get("click_element").unwrap().requires_context);

        let err = registry
            .execute("click_element", json!({"index": 1}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::MissingContext(name) if name == "click_element"));

        let cache: UITreeCache = [(1, UIElement::new("AXButton").with_name("Go"))]
            .into_iter()
            .collect();
        let result = registry
            .execute("click_element", json!({"index": 1}), Some(Arc::new(cache)))
            .await
            .unwrap();
        assert_eq!(result.extracted_content.as_deref(), Some("[AXButton] Go"));
    }

    #[tokio::test]
    async fn test_parameters_validated_before_context_check() {
        let mut registry = Registry::default();
        registry
            .context_action(
                "click_element",
                "Click element",
                |_: ClickElementAction, _ctx: ElementContext| async { Ok::<_, ActionError>(()) },
            )
            .unwrap();
        let err = registry
            .execute("click_element", json!({"index": "three"}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidParameters { .. }));
    }

    #[tokio::test]
    async fn test_null_payload_means_no_parameters() {
        let mut registry = Registry::default();
        registry
            .action("ping", "No-op", |_: NoParamsAction| async { Ok::<_, ActionError>("pong") })
            .unwrap();
        let result = registry.execute("ping", Value::Null, None).await.unwrap();
        assert_eq!(result.extracted_content.as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn test_invalid_result_type_is_fatal() {
        let mut registry = Registry::default();
        registry
            .action("numbers", "Returns a list", |_: NoParamsAction| async {
                Ok::<_, ActionError>(json!([1, 2, 3]))
            })
            .unwrap();
        let err = registry
            .execute("numbers", json!({}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidResultType { .. }));
    }

    #[test]
    fn test_descriptors_keep_registration_order() {
        let mut registry = Registry::default();
        for name in ["open_app", "done", "click_element"] {
            registry
                .action(name, "test", |_: NoParamsAction| async { Ok::<_, ActionError>(()) })
                .unwrap();
        }
        let names: Vec<_> = registry.descriptors().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["open_app", "done", "click_element"]);
        assert!(registry.contains("done"));
        assert!(!registry.contains("list_running_apps"));
    }

    #[test]
    fn test_schema_is_derived_from_parameters() {
        let registry = registry_with_done(&[]);
        let schema = serde_json::to_value(&registry.get("done").unwrap().parameter_schema).unwrap();
        assert_eq!(schema["properties"]["text"]["type"], "string");
        assert_eq!(schema["required"], json!(["text"]));
    }
}
