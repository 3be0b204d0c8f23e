use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::{Arc, RwLock},
    time::Duration,
};

use serde_json::{Map, Value, json};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::{Child, Command},
    sync::Mutex,
};
use tracing::{debug, info, warn};

use crate::{
    config::HelperSettings,
    helper::{HelperChannel, HelperError, find_helper_binary},
};

/// Time a terminated helper gets to exit before it is killed.
const STOP_GRACE_PERIOD: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperState {
    Stopped,
    Starting,
    Available,
    Stopping,
}

#[derive(Default)]
struct Running {
    child: Option<Child>,
    channel: Option<Arc<HelperChannel>>,
}

/// Lifecycle of the helper process: discovery, spawn, health check and shutdown.
///
/// `start` and `stop` are serialized by one async lock. Requests only touch that
/// lock long enough to clone the channel handle.
pub struct HelperProcess {
    settings: RwLock<HelperSettings>,
    workspace_root: RwLock<Option<PathBuf>>,
    state: RwLock<HelperState>,
    running: Mutex<Running>,
}

impl HelperProcess {
    pub fn new(settings: HelperSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            workspace_root: RwLock::new(None),
            state: RwLock::new(HelperState::Stopped),
            running: Mutex::new(Running::default()),
        }
    }

    /// Settings used by the next `start` and by later requests.
    pub fn set_settings(
        &self,
        settings: HelperSettings,
    ) {
        *self.settings.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;
    }

    pub fn set_workspace_root(
        &self,
        root: Option<PathBuf>,
    ) {
        *self.workspace_root.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = root;
    }

    pub fn state(&self) -> HelperState {
        *self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_available(&self) -> bool {
        self.state() == HelperState::Available
    }

    /// Spawn the helper and health-check it. A running helper is stopped first.
    ///
    /// Returns `false` when disabled or when any step fails; the partial process
    /// is torn down in that case.
    pub async fn start(&self) -> bool {
        let mut running = self.running.lock().await;
        if running.child.is_some() {
            self.stop_locked(&mut running).await;
        }

        let settings = self.settings();
        if !settings.enabled {
            info!("helper process disabled");
            return false;
        }

        self.set_state(HelperState::Starting);
        match self.launch(&settings, &mut running).await {
            Ok(path) => {
                self.set_state(HelperState::Available);
                info!("helper process started: {}", path.display());
                true
            },
            Err(err) => {
                warn!("running without helper: {err}");
                self.stop_locked(&mut running).await;
                false
            },
        }
    }

    /// Terminate the helper, killing it after a grace period. No-op when stopped.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        self.stop_locked(&mut running).await;
    }

    /// Forward a request to the helper, or `None` without any I/O when unavailable.
    pub async fn request(
        &self,
        method: &str,
        params: &Value,
    ) -> Option<Map<String, Value>> {
        if !self.is_available() {
            return None;
        }
        let channel = self.running.lock().await.channel.clone()?;
        let timeout = self.settings().request_timeout();
        channel.request(method, params, timeout).await
    }

    async fn launch(
        &self,
        settings: &HelperSettings,
        running: &mut Running,
    ) -> Result<PathBuf, HelperError> {
        let workspace_root = self.workspace_root.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone();
        let path = find_helper_binary(workspace_root.as_deref(), &settings.executable)
            .ok_or_else(|| HelperError::NotFound(settings.executable.clone()))?;

        let mut child = spawn_helper(&path)?;
        let stdin = child.stdin.take().ok_or(HelperError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(HelperError::MissingPipe("stdout"))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("helper stderr: {line}");
                }
            });
        }

        let channel = Arc::new(HelperChannel::new(stdout, stdin));
        running.child = Some(child);
        running.channel = Some(Arc::clone(&channel));

        let health = channel.request("health", &json!({}), settings.startup_timeout()).await;
        match health {
            Some(result) if result.get("status").and_then(Value::as_str) == Some("ok") => Ok(path),
            _ => Err(HelperError::HealthCheckFailed),
        }
    }

    async fn stop_locked(
        &self,
        running: &mut Running,
    ) {
        running.channel = None;
        if let Some(mut child) = running.child.take() {
            self.set_state(HelperState::Stopping);
            terminate(&mut child);
            if tokio::time::timeout(STOP_GRACE_PERIOD, child.wait()).await.is_err() {
                warn!("helper did not exit within {}s, killing it", STOP_GRACE_PERIOD.as_secs());
                if let Err(err) = child.kill().await {
                    debug!("failed to kill helper: {err}");
                }
            }
            info!("helper process stopped");
        }
        self.set_state(HelperState::Stopped);
    }

    fn settings(&self) -> HelperSettings {
        self.settings.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    fn set_state(
        &self,
        state: HelperState,
    ) {
        *self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }
}

fn spawn_helper(path: &Path) -> Result<Child, HelperError> {
    Command::new(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| HelperError::Spawn {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::{
        sys::signal::{Signal, kill},
        unistd::Pid,
    };

    let Some(pid) = child.id() else {
        return;
    };
    if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        debug!("failed to send SIGTERM to helper (pid {pid}): {err}");
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    if let Err(err) = child.start_kill() {
        debug!("failed to terminate helper: {err}");
    }
}

#[cfg(test)]
#[path = "../../tests/src/helper/process_tests.rs"]
mod tests;
