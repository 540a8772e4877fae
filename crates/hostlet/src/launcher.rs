//! Server process launcher.
//!
//! Resolves the server bundle shipped next to the host binary and spawns it
//! as a detached child. The child is fire-and-forget: this module never
//! waits on it or tears it down, and the extension checks server readiness
//! on its own schedule.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

/// Directory bundled next to the host binary that holds the server app.
const SERVER_DIR: &str = "3d-model";

/// Interpreter and entry point, run from inside the server directory.
const SERVER_PROGRAM: &str = "python";
const SERVER_ARGS: &[&str] = &["app.py"];

/// Spawn failures reported back to the extension as `success=false`.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("cannot locate host executable: {0}")]
    HostLocation(#[source] io::Error),

    #[error("server directory missing: {}", .0.display())]
    ServerDirMissing(PathBuf),

    #[error("failed to spawn server: {0}")]
    Spawn(#[source] io::Error),
}

/// Identifying details of a spawn attempt that succeeded.
///
/// The underlying child handle is dropped as soon as this is built: the
/// server outlives the host and is never waited on or terminated from here.
#[derive(Debug, Clone, Copy)]
pub struct SpawnedServer {
    pub pid: Option<u32>,
}

/// Extension point for different server spawn strategies.
pub trait ServerSpawner: Send + Sync {
    fn spawn(&self) -> Result<SpawnedServer, LaunchError>;
}

/// Launcher configuration. Defaults match the shipped bundle layout: the
/// `3d-model` directory next to the host executable, started with
/// `python app.py`.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Explicit server directory. When unset, resolved next to the host
    /// executable at spawn time so a moved installation keeps working.
    server_dir: Option<PathBuf>,
    program: String,
    args: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            server_dir: None,
            program: SERVER_PROGRAM.to_string(),
            args: SERVER_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LauncherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.server_dir = Some(dir.into());
        self
    }

    pub fn with_command<I, S>(mut self, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.into();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Spawns the bundled server with the server directory as its working
/// directory, capturing (but never reading) its stdout/stderr.
pub struct ServerLauncher {
    config: LauncherConfig,
}

impl ServerLauncher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    fn server_dir(&self) -> Result<PathBuf, LaunchError> {
        if let Some(dir) = &self.config.server_dir {
            return Ok(dir.clone());
        }

        let exe = std::env::current_exe().map_err(LaunchError::HostLocation)?;
        let host_dir = exe.parent().ok_or_else(|| {
            LaunchError::HostLocation(io::Error::new(
                io::ErrorKind::NotFound,
                "host executable has no parent directory",
            ))
        })?;

        Ok(host_dir.join(SERVER_DIR))
    }
}

impl ServerSpawner for ServerLauncher {
    fn spawn(&self) -> Result<SpawnedServer, LaunchError> {
        let dir = self.server_dir()?;
        if !dir.is_dir() {
            return Err(LaunchError::ServerDirMissing(dir));
        }

        // stdout/stderr are captured so the server cannot write into the
        // extension's framed channel; stdin is closed so it cannot read from
        // it either.
        let child = Command::new(&self.config.program)
            .args(&self.config.args)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(LaunchError::Spawn)?;

        let pid = child.id();
        tracing::debug!(dir = %dir.display(), program = %self.config.program, pid, "spawned server");

        Ok(SpawnedServer { pid })
    }
}
