use crate::errors::ActionError;
use crate::platforms::AutomationEngine;
use crate::types::{ActionResult, OpenAppAction};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

async fn try_launch(engine: &dyn AutomationEngine, app_name: &str) -> bool {
    match engine.launch_application(app_name).await {
        Ok(launched) => launched,
        Err(e) => {
            warn!("Launching '{}' failed: {}", app_name, e);
            false
        }
    }
}

/// Launch an application and report the pid of the matching running process.
///
/// The name is tried verbatim, then lowercased. After a successful launch the
/// process list is polled once, `settle_delay` later.
pub async fn open_app(
    engine: Arc<dyn AutomationEngine>,
    params: OpenAppAction,
    settle_delay: Duration,
) -> Result<ActionResult, ActionError> {
    let app_name = params.app_name;
    let app_name_lower = app_name.to_lowercase();
    info!("Launching app: {}", app_name);

    if try_launch(engine.as_ref(), &app_name).await {
        info!("Launched app using name: {}", app_name);
    } else {
        debug!(
            "Failed to launch app with name: {}. Trying lowercased...",
            app_name
        );
        if !try_launch(engine.as_ref(), &app_name_lower).await {
            let msg =
                format!("Failed to launch app: {app_name} (and lowercased: {app_name_lower})");
            debug!("{}", msg);
            return Ok(ActionResult::failure(msg));
        }
        info!("Launched app using lowercased name: {}", app_name_lower);
    }

    tokio::time::sleep(settle_delay).await;

    let running = match engine.running_applications().await {
        Ok(apps) => apps,
        Err(e) => {
            return Ok(ActionResult::failure(format!(
                "Launched {app_name} but could not list running applications: {e}"
            )));
        }
    };

    match running.iter().find(|app| app.matches(&app_name_lower)) {
        Some(app) => {
            debug!(
                pid = app.pid,
                bundle_id = ?app.bundle_id,
                "Found running app for '{}'", app_name
            );
            Ok(ActionResult::content(format!("We opened the app {app_name}")).with_app_pid(app.pid))
        }
        None => {
            let msg =
                format!("Could not find running app with name: {app_name} in running applications.");
            debug!("{}", msg);
            Ok(ActionResult::failure(msg))
        }
    }
}

/// One line per running application: name, bundle id and path.
pub async fn list_running_apps(
    engine: Arc<dyn AutomationEngine>,
) -> Result<ActionResult, ActionError> {
    match engine.running_applications().await {
        Ok(apps) => {
            let lines: Vec<String> = apps.iter().map(ToString::to_string).collect();
            Ok(ActionResult::content(lines.join("\n")))
        }
        Err(e) => {
            warn!("Listing running applications failed: {}", e);
            Ok(ActionResult::failure(format!(
                "Failed to list running applications: {e}"
            )))
        }
    }
}
