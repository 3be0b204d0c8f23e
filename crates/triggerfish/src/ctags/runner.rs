use std::{path::Path, process::Stdio, time::Duration};

use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::{ctags::CtagsError, symbols::TagRecord};

/// Runs `ctags` on single files and decodes its JSON-lines output.
#[derive(Debug, Clone)]
pub struct CtagsRunner {
    executable: String,
    timeout: Duration,
}

impl CtagsRunner {
    pub fn new(
        executable: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Extract tags for `file_path`, forcing `language` when given.
    pub async fn generate_tags(
        &self,
        file_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<TagRecord>, CtagsError> {
        let mut command = self.command();
        command.args(["--output-format=json", "--fields=*", "--excmd=pattern"]);
        if let Some(language) = language {
            command.arg(format!("--language-force={language}"));
        }
        command.arg(file_path);

        let child = command.spawn().map_err(|error| self.launch_error(error))?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|error| self.launch_error(error))?,
            Err(_) => {
                return Err(CtagsError::Timeout {
                    command: self.executable.clone(),
                    timeout: self.timeout,
                });
            },
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CtagsError::Failed {
                command: self.executable.clone(),
                reason: if stderr.is_empty() {
                    format!("process exited with status {}", output.status)
                } else {
                    stderr
                },
            });
        }

        let tags = parse_ctags_output(&String::from_utf8_lossy(&output.stdout));
        debug!("ctags produced {} tag(s) for {}", tags.len(), file_path.display());
        Ok(tags)
    }

    /// `true` when `ctags --version` runs and exits successfully in time.
    pub async fn verify_available(&self) -> bool {
        let mut command = self.command();
        command.arg("--version");
        let Ok(child) = command.spawn() else {
            return false;
        };
        matches!(
            tokio::time::timeout(self.timeout, child.wait_with_output()).await,
            Ok(Ok(output)) if output.status.success()
        )
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
        command
    }

    fn launch_error(
        &self,
        error: std::io::Error,
    ) -> CtagsError {
        match error.kind() {
            std::io::ErrorKind::NotFound => CtagsError::NotFound(self.executable.clone()),
            _ => CtagsError::LaunchFailed {
                command: self.executable.clone(),
                reason: error.to_string(),
            },
        }
    }
}

/// Decode ctags JSON-lines output, keeping `"_type": "tag"` entries.
///
/// Blank lines, undecodable lines, pseudo-tags and entries without a string
/// `name` and `kind` are skipped.
pub fn parse_ctags_output(stdout: &str) -> Vec<TagRecord> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(|entry| entry.get("_type").and_then(Value::as_str) == Some("tag"))
        .filter_map(|entry| TagRecord::from_json(&entry))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src/ctags/runner_tests.rs"]
mod tests;
