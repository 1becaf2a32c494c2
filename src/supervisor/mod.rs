// src/supervisor/mod.rs
//! Agent process supervision
//!
//! Owns the external agent's process lifecycle independent of game
//! semantics: spawn, liveness checks, and idempotent escalating
//! termination (SIGTERM, bounded grace period, SIGKILL). Every child is
//! spawned with kill-on-drop so no agent process can outlive the engine,
//! even on panic paths where `terminate` is never reached.

use crate::utils::errors::{EngineError, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Default SIGTERM-to-SIGKILL grace period
pub const DEFAULT_GRACE: Duration = Duration::from_secs(3);

/// Resolve an agent executable: explicit paths are taken as-is, bare
/// names are looked up on PATH.
fn resolve_executable(program: &str) -> Result<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(EngineError::Spawn(format!(
            "executable '{}' does not exist",
            program
        )));
    }
    which::which(program)
        .map_err(|e| EngineError::Spawn(format!("executable '{}' not found in PATH: {}", program, e)))
}

/// A supervised agent process
#[derive(Debug)]
pub struct AgentProcess {
    name: String,
    child: Child,
    pid: Option<u32>,
    terminated: bool,
    grace: Duration,
}

impl AgentProcess {
    /// Spawn an agent process.
    ///
    /// The engine's listen address is appended as the final argument so the
    /// agent knows where to dial back in. stdin is closed; stdout/stderr
    /// are inherited so agent diagnostics land in the engine's console.
    pub fn spawn(
        name: impl Into<String>,
        program: &str,
        args: &[String],
        dial_addr: &str,
    ) -> Result<Self> {
        let name = name.into();
        let executable = resolve_executable(program)?;
        debug!(team = %name, ?executable, "Spawning agent process");

        let child = Command::new(&executable)
            .args(args)
            .arg(dial_addr)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Spawn(format!("failed to start '{}': {}", executable.display(), e))
            })?;

        let pid = child.id();
        info!(team = %name, pid, "Agent process started");

        Ok(Self {
            name,
            child,
            pid,
            terminated: false,
            grace: DEFAULT_GRACE,
        })
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Whether the process has not yet exited
    pub fn is_alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(_)) => false,
            Err(e) => {
                warn!(team = %self.name, "try_wait failed: {}", e);
                false
            }
        }
    }

    /// Terminate the process: SIGTERM, bounded grace period, then SIGKILL.
    ///
    /// Idempotent; invoked at match end and on any proxy failure.
    pub async fn terminate(&mut self) -> Result<()> {
        if self.terminated {
            return Ok(());
        }
        self.terminated = true;

        let Some(raw_pid) = self.pid else {
            return Ok(());
        };
        let pid = Pid::from_raw(raw_pid as i32);

        if !self.is_alive() {
            debug!(team = %self.name, "Agent process already exited");
            return Ok(());
        }

        debug!(team = %self.name, pid = raw_pid, "Sending SIGTERM");
        if let Err(e) = kill(pid, Signal::SIGTERM) {
            // ESRCH means the process raced us to the exit
            debug!(team = %self.name, "SIGTERM delivery failed: {}", e);
        }

        match tokio::time::timeout(self.grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(team = %self.name, %status, "Agent exited after SIGTERM");
            }
            Ok(Err(e)) => {
                warn!(team = %self.name, "Error waiting for agent: {}", e);
            }
            Err(_) => {
                warn!(team = %self.name, pid = raw_pid, "Grace period expired, sending SIGKILL");
                if let Err(e) = kill(pid, Signal::SIGKILL) {
                    debug!(team = %self.name, "SIGKILL delivery failed: {}", e);
                }
                if let Err(e) = self.child.wait().await {
                    warn!(team = %self.name, "Error reaping agent: {}", e);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bare_name() {
        // `sleep` exists on any unix PATH
        assert!(resolve_executable("sleep").is_ok());
    }

    #[test]
    fn test_resolve_missing_executable() {
        let err = resolve_executable("definitely-not-a-real-binary-9321").unwrap_err();
        assert!(matches!(err, EngineError::Spawn(_)));
    }

    #[test]
    fn test_spawn_missing_path_is_spawn_error() {
        let err = AgentProcess::spawn("blue", "/no/such/agent", &[], "127.0.0.1:1").unwrap_err();
        assert!(matches!(err, EngineError::Spawn(_)));
    }

    // The dial address is appended as an extra argument, so test commands
    // go through `sh -c` where it lands in $0 and is ignored.
    fn sleeper(name: &str) -> AgentProcess {
        AgentProcess::spawn(name, "sh", &["-c".into(), "sleep 30".into()], "127.0.0.1:1")
            .unwrap()
            .with_grace(Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_spawn_and_terminate() {
        let mut proc = sleeper("blue");
        assert!(proc.is_alive());

        proc.terminate().await.unwrap();
        assert!(!proc.is_alive());
    }

    #[tokio::test]
    async fn test_terminate_is_idempotent() {
        let mut proc = sleeper("red");

        proc.terminate().await.unwrap();
        proc.terminate().await.unwrap();
        assert!(!proc.is_alive());
    }

    #[tokio::test]
    async fn test_terminate_after_natural_exit() {
        let mut proc = AgentProcess::spawn("red", "true", &[], "127.0.0.1:1").unwrap();
        // Give the process a moment to exit on its own
        tokio::time::sleep(Duration::from_millis(200)).await;
        proc.terminate().await.unwrap();
        assert!(!proc.is_alive());
    }
}
