/*!
 * Adapter for external CLI tools (e.g. the Gemini CLI).
 *
 * The tool is spawned once per batch, receives the prompt on stdin and is
 * expected to print the completion to stdout. The child environment is
 * rebuilt from an explicit allow-list rather than inherited, so stray
 * credentials and shell state never leak into the subprocess.
 */

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::ProviderAdapter;
use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;

/// Environment variables a CLI child process is allowed to see
const ALLOWED_ENV_VARS: &[&str] = &[
    "PATH",
    "HOME",
    "USER",
    "LANG",
    "LC_ALL",
    "TERM",
    "TMPDIR",
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "GOOGLE_APPLICATION_CREDENTIALS",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "NO_PROXY",
];

/// An explicit, allow-listed environment for child processes
#[derive(Debug, Clone, Default)]
pub struct EnvAllowList {
    vars: BTreeMap<String, String>,
}

impl EnvAllowList {
    /// Capture the allow-listed subset of the parent environment
    pub fn capture() -> Self {
        let vars = ALLOWED_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();

        Self { vars }
    }

    /// Add or override a variable
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Iterate over the captured variables
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    /// Number of captured variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables were captured
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Subprocess-backed provider adapter
#[derive(Debug)]
pub struct CliAdapter {
    /// Executable to spawn
    binary: String,
    /// Extra arguments passed before the prompt
    args: Vec<String>,
    /// Per-call deadline
    timeout: Duration,
    /// Environment for the child process
    env: EnvAllowList,
}

impl CliAdapter {
    /// Create a new adapter from provider configuration.
    ///
    /// The `endpoint` field holds the executable path; `model`, when set,
    /// is passed as `--model <name>`.
    pub fn new(config: &ProviderConfig) -> Self {
        let mut args = Vec::new();
        if !config.model.is_empty() {
            args.push("--model".to_string());
            args.push(config.model.clone());
        }

        Self {
            binary: config.endpoint.clone(),
            args,
            timeout: Duration::from_secs(config.timeout_secs),
            env: EnvAllowList::capture(),
        }
    }

    /// Replace the captured environment (for testing)
    pub fn with_env(mut self, env: EnvAllowList) -> Self {
        self.env = env;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args)
            .env_clear()
            .envs(self.env.iter())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, stdin_payload: &str) -> Result<String, ProviderError> {
        let mut child = self
            .command()
            .spawn()
            .map_err(|e| ProviderError::ProcessError(format!("{}: {}", self.binary, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(stdin_payload.as_bytes())
                .await
                .map_err(|e| ProviderError::ProcessError(format!("stdin write failed: {}", e)))?;
            // Close stdin so the tool knows the prompt is complete
            drop(stdin);
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ProviderError::ProcessError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("CLI tool exited with {}: {}", output.status, stderr.trim());
            return Err(ProviderError::ProcessError(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ProviderAdapter for CliAdapter {
    fn name(&self) -> &str {
        "clitool"
    }

    async fn initialize(&self) -> Result<(), ProviderError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--version")
            .env_clear()
            .envs(self.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = cmd
            .status()
            .await
            .map_err(|e| ProviderError::ProcessError(format!("{}: {}", self.binary, e)))?;

        if !status.success() {
            return Err(ProviderError::ProcessError(format!(
                "{} --version exited with {}",
                self.binary, status
            )));
        }

        debug!("CLI tool {} is available", self.binary);
        Ok(())
    }

    async fn call(&self, prompt: &str) -> Result<String, ProviderError> {
        self.run(prompt).await
    }

    // One child process at a time; CLI tools are not reentrant
    fn supports_concurrency(&self) -> bool {
        false
    }
}
