//! Process-level capability provider backed by OS launch commands and
//! `sysinfo`. Element interaction needs an accessibility backend and is
//! reported as unsupported here.

use super::AutomationEngine;
use crate::{AutomationError, RunningApplication, UIElement};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use sysinfo::{ProcessesToUpdate, System};
use tokio::process::Command;

#[derive(Debug, Default, Clone)]
pub struct SystemEngine;

impl SystemEngine {
    pub fn new() -> Self {
        Self
    }

    /// The launched program never shares our stdio; stdout carries results.
    fn launch_command(app_name: &str) -> StdCommand {
        #[cfg(target_os = "macos")]
        let mut cmd = {
            let mut cmd = StdCommand::new("open");
            cmd.arg("-a").arg(app_name);
            cmd.stderr(Stdio::piped());
            cmd
        };
        #[cfg(target_os = "windows")]
        let mut cmd = {
            let mut cmd = StdCommand::new("cmd");
            cmd.args(["/C", "start", "", app_name]);
            cmd.stderr(Stdio::piped());
            cmd
        };
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let mut cmd = {
            let mut cmd = StdCommand::new(app_name);
            cmd.stderr(Stdio::null());
            cmd
        };

        cmd.stdin(Stdio::null()).stdout(Stdio::null());
        cmd
    }
}

/// For `/Applications/Foo.app/Contents/MacOS/Foo`, the `.app` bundle path.
fn bundle_path(exe: &Path) -> Option<PathBuf> {
    exe.ancestors()
        .find(|p| p.extension().is_some_and(|ext| ext == "app"))
        .map(Path::to_path_buf)
}

/// `CFBundleIdentifier` from the bundle's `Contents/Info.plist`.
fn read_bundle_id(bundle: &Path) -> Option<String> {
    let info = bundle.join("Contents").join("Info.plist");
    match plist::Value::from_file(&info) {
        Ok(value) => value
            .as_dictionary()?
            .get("CFBundleIdentifier")?
            .as_string()
            .map(str::to_string),
        Err(e) => {
            tracing::trace!("No bundle id for {}: {}", bundle.display(), e);
            None
        }
    }
}

fn snapshot_processes() -> Vec<RunningApplication> {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    // Many helper processes share one bundle.
    let mut bundle_ids: HashMap<PathBuf, Option<String>> = HashMap::new();
    let mut apps: Vec<RunningApplication> = system
        .processes()
        .iter()
        .map(|(pid, process)| {
            let bundle = process.exe().and_then(bundle_path);
            let bundle_id = bundle.as_ref().and_then(|bundle| {
                bundle_ids
                    .entry(bundle.clone())
                    .or_insert_with(|| read_bundle_id(bundle))
                    .clone()
            });
            let path = bundle.or_else(|| process.exe().map(Path::to_path_buf));
            RunningApplication {
                pid: pid.as_u32(),
                localized_name: process.name().to_string_lossy().into_owned(),
                bundle_id,
                path,
            }
        })
        .collect();
    apps.sort_by_key(|app| app.pid);
    apps
}

#[async_trait::async_trait]
impl AutomationEngine for SystemEngine {
    async fn click(&self, element: &UIElement) -> Result<bool, AutomationError> {
        Err(AutomationError::UnsupportedOperation(format!(
            "clicking {element} requires an accessibility backend"
        )))
    }

    async fn type_into(
        &self,
        element: &UIElement,
        _text: &str,
        _submit: bool,
    ) -> Result<bool, AutomationError> {
        Err(AutomationError::UnsupportedOperation(format!(
            "typing into {element} requires an accessibility backend"
        )))
    }

    async fn launch_application(&self, app_name: &str) -> Result<bool, AutomationError> {
        if app_name.trim().is_empty() {
            return Err(AutomationError::InvalidArgument(
                "application name is empty".to_string(),
            ));
        }

        let mut cmd = Command::from(Self::launch_command(app_name));
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            // Detached: the launched application keeps running after we return.
            match cmd.spawn() {
                Ok(child) => {
                    tracing::debug!("Spawned '{}' with pid {:?}", app_name, child.id());
                    Ok(true)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(AutomationError::PlatformError(format!(
                    "Failed to launch '{app_name}': {e}"
                ))),
            }
        }
        #[cfg(any(target_os = "macos", target_os = "windows"))]
        {
            let output = cmd.output().await.map_err(|e| {
                AutomationError::PlatformError(format!("Failed to launch '{app_name}': {e}"))
            })?;
            if !output.status.success() {
                tracing::warn!(
                    "Launching '{}' exited with {}: {}",
                    app_name,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Ok(output.status.success())
        }
    }

    async fn running_applications(&self) -> Result<Vec<RunningApplication>, AutomationError> {
        tokio::task::spawn_blocking(snapshot_processes)
            .await
            .map_err(|e| AutomationError::Internal(format!("Process enumeration task failed: {e}")))
    }
}
