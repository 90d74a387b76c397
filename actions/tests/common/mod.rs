#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use terminator_actions::{
    AutomationEngine, AutomationError, Controller, ControllerConfig, ElementContext,
    RunningApplication, UIElement, UITreeCache,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Click(UIElement),
    TypeInto {
        element: UIElement,
        text: String,
        submit: bool,
    },
    Launch(String),
    ListApps,
}

/// How the mock answers element interaction calls.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Succeed,
    Refuse,
    Fail,
}

/// Capability provider that records every call and answers from fixtures.
pub struct MockEngine {
    calls: Mutex<Vec<Call>>,
    interaction: Outcome,
    launchable: HashMap<String, bool>,
    apps: Vec<RunningApplication>,
    listing_fails: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            interaction: Outcome::Succeed,
            launchable: HashMap::new(),
            apps: Vec::new(),
            listing_fails: false,
        }
    }

    pub fn with_interaction(mut self, outcome: Outcome) -> Self {
        self.interaction = outcome;
        self
    }

    /// Names not listed here fail to launch.
    pub fn with_launchable(mut self, name: &str) -> Self {
        self.launchable.insert(name.to_string(), true);
        self
    }

    pub fn with_app(mut self, pid: u32, name: &str, bundle_id: Option<&str>) -> Self {
        self.apps.push(RunningApplication {
            pid,
            localized_name: name.to_string(),
            bundle_id: bundle_id.map(str::to_string),
            path: Some(PathBuf::from(format!("/Applications/{name}.app"))),
        });
        self
    }

    pub fn with_failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn launches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Launch(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn interact(&self) -> Result<bool, AutomationError> {
        match self.interaction {
            Outcome::Succeed => Ok(true),
            Outcome::Refuse => Ok(false),
            Outcome::Fail => Err(AutomationError::PlatformError(
                "AXError -25204".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl AutomationEngine for MockEngine {
    async fn click(&self, element: &UIElement) -> Result<bool, AutomationError> {
        self.record(Call::Click(element.clone()));
        self.interact()
    }

    async fn type_into(
        &self,
        element: &UIElement,
        text: &str,
        submit: bool,
    ) -> Result<bool, AutomationError> {
        self.record(Call::TypeInto {
            element: element.clone(),
            text: text.to_string(),
            submit,
        });
        self.interact()
    }

    async fn launch_application(&self, app_name: &str) -> Result<bool, AutomationError> {
        self.record(Call::Launch(app_name.to_string()));
        Ok(self.launchable.get(app_name).copied().unwrap_or(false))
    }

    async fn running_applications(&self) -> Result<Vec<RunningApplication>, AutomationError> {
        self.record(Call::ListApps);
        if self.listing_fails {
            return Err(AutomationError::PlatformError(
                "workspace unavailable".to_string(),
            ));
        }
        Ok(self.apps.clone())
    }
}

/// Element cache with a text field at 1 and a button at 2.
pub fn sample_context() -> ElementContext {
    let cache: UITreeCache = [
        (1, UIElement::new("AXTextField").with_name("Search")),
        (2, UIElement::new("AXButton").with_name("Go")),
    ]
    .into_iter()
    .collect();
    Arc::new(cache)
}

pub fn controller_with(engine: Arc<MockEngine>) -> Controller {
    let config = ControllerConfig::default().with_launch_settle_delay_ms(0);
    Controller::new(engine, config).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
