use crate::actions::register_default_actions;
use crate::config::ControllerConfig;
use crate::element::ElementContext;
use crate::errors::ActionError;
use crate::platforms::{self, AutomationEngine};
use crate::registry::Registry;
use crate::types::{ActionRequest, ActionResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Entry point for running planner-issued actions.
///
/// Owns the action registry, whose built-in actions hold the capability
/// provider. Actions run strictly one at a time, in the order they are
/// submitted.
pub struct Controller {
    registry: Registry,
}

impl Controller {
    /// Build a controller with the default actions registered against `engine`.
    pub fn new(
        engine: Arc<dyn AutomationEngine>,
        config: ControllerConfig,
    ) -> Result<Self, ActionError> {
        let mut registry = Registry::new(config.exclude_actions.iter().cloned())
            .with_strict_exclusions(config.strict_exclusions);
        register_default_actions(&mut registry, engine, &config)?;
        debug!(actions = registry.len(), "Controller ready");
        Ok(Self { registry })
    }

    /// Controller backed by the capability provider for the current platform.
    pub fn for_current_platform(config: ControllerConfig) -> Result<Self, ActionError> {
        let engine = platforms::create_engine()?;
        Self::new(engine, config)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access for registering custom actions before the first dispatch.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Execute the single populated action in `request`.
    ///
    /// An empty request is a no-op. Every populated entry must name a registered
    /// action. When more than one entry is populated, the first in registration
    /// order runs and the rest are ignored.
    #[instrument(skip(self, request, context))]
    pub async fn dispatch(
        &self,
        request: &ActionRequest,
        context: Option<ElementContext>,
    ) -> Result<ActionResult, ActionError> {
        let populated: Vec<(&str, &serde_json::Value)> = request.populated().collect();
        if populated.is_empty() {
            return Ok(ActionResult::empty());
        }
        if let Some((unknown, _)) = populated
            .iter()
            .find(|(n, _)| !self.registry.contains(n))
        {
            return Err(ActionError::UnknownAction(unknown.to_string()));
        }

        let Some((name, params)) = self
            .registry
            .descriptors()
            .find_map(|d| request.get(&d.name).map(|p| (d.name.as_str(), p)))
        else {
            return Ok(ActionResult::empty());
        };

        if populated.len() > 1 {
            let ignored: Vec<&str> = populated
                .iter()
                .map(|(n, _)| *n)
                .filter(|n| *n != name)
                .collect();
            warn!(
                "Action request has {} populated entries; running '{}' and ignoring {:?}",
                populated.len(),
                name,
                ignored
            );
        }

        let start = Instant::now();
        let result = self.registry.execute(name, params.clone(), context).await;
        debug!(
            action = name,
            duration_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Action finished"
        );
        result
    }

    /// Execute `requests` in order, stopping after the first result that is
    /// done or carries an error.
    ///
    /// A registry or dispatch failure aborts the sequence; the results produced
    /// before it are carried in [`ActionError::SequenceAborted`].
    #[instrument(skip(self, requests, context), fields(steps = requests.len()))]
    pub async fn run_sequence(
        &self,
        requests: &[ActionRequest],
        context: Option<ElementContext>,
    ) -> Result<Vec<ActionResult>, ActionError> {
        let mut results = Vec::with_capacity(requests.len());

        for (i, request) in requests.iter().enumerate() {
            match self.dispatch(request, context.clone()).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Action {} / {} failed: {}", i + 1, requests.len(), e);
                    return Err(ActionError::SequenceAborted {
                        step: i,
                        completed: results,
                        source: Box::new(e),
                    });
                }
            }

            debug!("Executed action {} / {}", i + 1, requests.len());
            if results.last().is_some_and(ActionResult::is_terminal) {
                break;
            }
        }

        Ok(results)
    }
}
