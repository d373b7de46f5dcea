// Keylaunch Action Dispatch
// Resolves matched combos into app launches and ordered command sequences

pub mod executor;

pub use executor::{ExecError, ExecRequest, Executor, SystemExecutor};

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::config::CommandStep;

/// Dispatch errors. All of these are step-local: they are logged and the
/// remaining steps still run.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("empty file command")]
    EmptyCommand,

    #[error("unbalanced quote in arguments: {0}")]
    ArgSplit(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Executes resolved actions: a single app launch, or an ordered sequence of
/// command steps with a synchronous delay between them.
///
/// The inter-step wait deliberately blocks the calling loop; keystrokes typed
/// during the wait are not buffered. Dispatch never waits on the spawned
/// processes themselves.
pub struct ActionDispatcher {
    scripts_dir: PathBuf,
    executor: Box<dyn Executor>,
}

impl ActionDispatcher {
    /// `scripts_dir` is the fixed directory file commands resolve against.
    pub fn new(scripts_dir: PathBuf, executor: Box<dyn Executor>) -> Self {
        Self {
            scripts_dir,
            executor,
        }
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Launch an app target: directories through the platform opener, files
    /// directly. A missing target is logged and skipped, never an error.
    pub fn open_app(&self, target: &str) {
        let expanded = shellexpand::tilde(target);
        let path = Path::new(expanded.as_ref());

        if !path.exists() {
            println!("The file or directory {} does not exist.", path.display());
            log::warn!("launch target missing: {}", path.display());
            return;
        }

        let request = if path.is_dir() {
            ExecRequest::OpenPath {
                path: path.to_path_buf(),
            }
        } else {
            ExecRequest::LaunchApp {
                path: path.to_path_buf(),
            }
        };

        match self.executor.execute(&request) {
            Ok(()) => {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| target.to_string());
                println!(
                    "[{}] keylaunch - opened: {}",
                    Local::now().format("%Y-%m-%d %I:%M %p"),
                    name
                );
            }
            Err(e) => log::error!("failed to launch {}: {}", path.display(), e),
        }
    }

    /// Run the steps of `code` strictly in order.
    ///
    /// A failing step is logged and skipped; the rest of the sequence still
    /// runs. After each step the configured delay is waited out before the
    /// next one starts.
    pub fn run_steps(&self, code: &str, steps: &[CommandStep]) {
        if steps.is_empty() {
            println!("No commands configured for {}", code);
            return;
        }

        for step in steps {
            if let Some(file_command) = &step.file_command {
                if let Err(e) = self.run_file_command(file_command) {
                    log::error!("step failed for {}: {}", code, e);
                }
            } else if let Some(command) = &step.command {
                let request = ExecRequest::TerminalCommand {
                    command: command.clone(),
                };
                if let Err(e) = self.executor.execute(&request) {
                    log::error!("step failed for {}: {}", code, e);
                }
            } else {
                log::warn!(
                    "step for {} has neither command nor file_command, skipping",
                    code
                );
            }

            let delay = step.delay.max(0.0);
            if delay > 0.0 {
                thread::sleep(Duration::from_secs_f64(delay));
            }
        }

        let comment = steps
            .first()
            .and_then(|s| s.comment.as_deref())
            .map(|c| format!(" - {}", c))
            .unwrap_or_default();
        println!(
            "[{}] {}{}",
            Local::now().format("%Y-%m-%d %I:%M %p"),
            code,
            comment
        );
    }

    fn run_file_command(&self, file_command: &str) -> Result<(), DispatchError> {
        let parts = split_args(file_command)?;
        let (file_name, args) = parts
            .split_first()
            .ok_or(DispatchError::EmptyCommand)?;

        let path = self.scripts_dir.join(file_name);
        if !path.exists() {
            return Err(DispatchError::FileNotFound(path));
        }

        let request = match path.extension().and_then(|e| e.to_str()) {
            Some("py") => interpreted("python3", &path, args),
            Some("sh") => interpreted("sh", &path, args),
            _ => ExecRequest::RunFile {
                program: path,
                args: args.to_vec(),
            },
        };

        self.executor.execute(&request)?;
        Ok(())
    }
}

fn interpreted(interpreter: &str, script: &Path, args: &[String]) -> ExecRequest {
    let mut full_args = Vec::with_capacity(args.len() + 1);
    full_args.push(script.to_string_lossy().into_owned());
    full_args.extend(args.iter().cloned());
    ExecRequest::RunFile {
        program: PathBuf::from(interpreter),
        args: full_args,
    }
}

/// Shell-style argument splitting: whitespace separates, single and double
/// quotes group, backslash escapes the next character.
pub fn split_args(input: &str) -> Result<Vec<String>, DispatchError> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else if c == '\\' && q == '"' {
                    match chars.next() {
                        Some(n) => current.push(n),
                        None => return Err(DispatchError::ArgSplit(input.to_string())),
                    }
                } else {
                    current.push(c);
                }
            }
            None => {
                if c.is_whitespace() {
                    if in_word {
                        out.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                } else if c == '\'' || c == '"' {
                    quote = Some(c);
                    in_word = true;
                } else if c == '\\' {
                    match chars.next() {
                        Some(n) => {
                            current.push(n);
                            in_word = true;
                        }
                        None => return Err(DispatchError::ArgSplit(input.to_string())),
                    }
                } else {
                    current.push(c);
                    in_word = true;
                }
            }
        }
    }

    if quote.is_some() {
        return Err(DispatchError::ArgSplit(input.to_string()));
    }
    if in_word {
        out.push(current);
    }
    Ok(out)
}
