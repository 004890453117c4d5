use crate::build::{Step, Verbosity};
use crate::result::{EveBuildError, Result};
use std::io::Read;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use which::which;

/// Outcome of one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub success: bool,
    pub code: Option<i32>,
    /// Combined stdout/stderr, only present when output was captured.
    pub captured: Option<String>,
}

impl StepOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
            captured: None,
        }
    }

    pub fn failed(code: Option<i32>, captured: Option<String>) -> Self {
        Self {
            success: false,
            code,
            captured,
        }
    }
}

/// Executes a single planned step and reports how it exited.
///
/// Implementations return `Ok` for any child that ran to completion, whatever
/// its exit status; `Err` is reserved for failures to start or await it.
#[allow(async_fn_in_trait)]
pub trait StepRunner {
    async fn run(&mut self, step: &Step, verbosity: Verbosity) -> Result<StepOutput>;
}

#[derive(Default)]
pub struct ProcessManager;

impl ProcessManager {
    pub fn new() -> Self {
        Self
    }

    pub fn find_executable(&self, name: &str) -> Result<PathBuf> {
        which(name).map_err(|_| {
            EveBuildError::not_found(format!("Executable not found: {}", name))
        })
    }
}

impl StepRunner for ProcessManager {
    async fn run(&mut self, step: &Step, verbosity: Verbosity) -> Result<StepOutput> {
        let program = step
            .program()
            .ok_or_else(|| EveBuildError::process(format!("{} has an empty command", step.label())))?;
        let executable = self.find_executable(program)?;

        let mut command = Command::new(&executable);
        command.args(step.args());
        command.stdin(Stdio::null());
        if let Some(dir) = step.working_dir() {
            command.current_dir(dir);
        }

        log::info!("Running {}: {}", step.label(), step.command_line());

        if verbosity.is_quiet() {
            // One pipe for both streams keeps the child's write order.
            let (mut reader, writer) = os_pipe::pipe()?;
            command.stdout(writer.try_clone()?);
            command.stderr(writer);

            let mut child = command.spawn().map_err(|e| {
                EveBuildError::process(format!("Failed to execute {}: {}", program, e))
            })?;
            // The parent's copies of the write end must close for the reader to see EOF.
            drop(command);

            let drain = tokio::task::spawn_blocking(move || {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes).map(|_| bytes)
            });

            let status = child.wait().await.map_err(|e| {
                EveBuildError::process(format!("Failed to wait for {}: {}", program, e))
            })?;
            let bytes = drain
                .await
                .map_err(|e| EveBuildError::process(format!("Failed to read output of {}: {}", program, e)))??;

            log::debug!("{} exited with {}", step.label(), status);

            if status.success() {
                return Ok(StepOutput::succeeded());
            }

            let captured = String::from_utf8_lossy(&bytes).into_owned();
            Ok(StepOutput::failed(status.code(), Some(captured)))
        } else {
            command.stdout(Stdio::inherit());
            command.stderr(Stdio::inherit());

            let mut child = command.spawn().map_err(|e| {
                EveBuildError::process(format!("Failed to execute {}: {}", program, e))
            })?;

            let status = child.wait().await.map_err(|e| {
                EveBuildError::process(format!("Failed to wait for {}: {}", program, e))
            })?;

            log::debug!("{} exited with {}", step.label(), status);

            if status.success() {
                Ok(StepOutput::succeeded())
            } else {
                Ok(StepOutput::failed(status.code(), None))
            }
        }
    }
}
