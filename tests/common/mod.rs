//! Shared helpers for integration tests

use evebuild::build::{Step, Verbosity};
use evebuild::result::Result;
use evebuild::utils::{StepOutput, StepRunner};
use std::path::PathBuf;

/// A step the fake runner saw, with the verbosity it was run at.
#[derive(Debug, Clone)]
pub struct RecordedStep {
    pub label: String,
    pub command: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub verbosity: Verbosity,
}

/// Records every step instead of spawning it; optionally fails one label.
#[derive(Default)]
pub struct RecordingRunner {
    pub ran: Vec<RecordedStep>,
    fail: Option<(String, i32)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(label: &str, code: i32) -> Self {
        Self {
            ran: Vec::new(),
            fail: Some((label.to_string(), code)),
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.ran.iter().map(|s| s.label.as_str()).collect()
    }
}

impl StepRunner for RecordingRunner {
    async fn run(&mut self, step: &Step, verbosity: Verbosity) -> Result<StepOutput> {
        self.ran.push(RecordedStep {
            label: step.label().to_string(),
            command: step.command().to_vec(),
            working_dir: step.working_dir().map(PathBuf::from),
            verbosity,
        });

        match &self.fail {
            Some((label, code)) if label == step.label() => Ok(StepOutput::failed(
                Some(*code),
                Some(format!("{} exited with {}", label, code)),
            )),
            _ => Ok(StepOutput::succeeded()),
        }
    }
}
