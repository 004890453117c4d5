use crate::build::cmake::command_line;
use smol_str::SmolStr;
use std::path::{Path, PathBuf};

/// One external command invocation, executed in the order it was planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    label: SmolStr,
    command: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl Step {
    pub fn new(label: impl Into<SmolStr>, command: Vec<String>) -> Self {
        Self {
            label: label.into(),
            command,
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn command_line(&self) -> String {
        command_line(&self.command)
    }
}
