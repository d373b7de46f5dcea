// Keylaunch Action Executor Boundary
// Pluggable execution of resolved actions; the system impl spawns processes

use std::path::PathBuf;
use std::process::Command;

/// Fallback terminal emulator when $TERMINAL is unset.
const DEFAULT_TERMINAL: &str = "x-terminal-emulator";

/// A fully resolved action, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecRequest {
    /// Launch an executable directly
    LaunchApp { path: PathBuf },

    /// Open a directory with the platform's default handler
    OpenPath { path: PathBuf },

    /// Spawn a fresh terminal session and write the command text into it
    TerminalCommand { command: String },

    /// Run a resolved program with arguments
    RunFile { program: PathBuf, args: Vec<String> },
}

/// Executor errors
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to spawn process: {0}")]
    Spawn(#[from] std::io::Error),
}

/// The boundary between combo dispatch and the outside world.
///
/// The dispatcher resolves what to run; an Executor makes it happen.
/// Concrete automations (window scripting, typed-text injection) plug in
/// here without the core knowing about them.
pub trait Executor {
    fn execute(&self, request: &ExecRequest) -> Result<(), ExecError>;
}

/// Executor that spawns real processes.
///
/// Spawned processes are not waited on: dispatch only honors the configured
/// inter-step delay, never a child's lifetime.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    terminal: String,
}

impl SystemExecutor {
    pub fn new() -> Self {
        let terminal =
            std::env::var("TERMINAL").unwrap_or_else(|_| DEFAULT_TERMINAL.to_string());
        Self { terminal }
    }

    pub fn with_terminal(terminal: &str) -> Self {
        Self {
            terminal: terminal.to_string(),
        }
    }
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for SystemExecutor {
    fn execute(&self, request: &ExecRequest) -> Result<(), ExecError> {
        match request {
            ExecRequest::LaunchApp { path } => {
                Command::new(path).spawn()?;
            }
            ExecRequest::OpenPath { path } => {
                open::that(path)?;
            }
            ExecRequest::TerminalCommand { command } => {
                // Login shell so the command sees the operator's profile,
                // matching what they'd get typing it by hand.
                Command::new(&self.terminal)
                    .arg("-e")
                    .arg("sh")
                    .arg("-lc")
                    .arg(command)
                    .spawn()?;
            }
            ExecRequest::RunFile { program, args } => {
                Command::new(program).args(args).spawn()?;
            }
        }
        Ok(())
    }
}
