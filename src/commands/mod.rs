pub mod build;

use crate::build::BuildOptions;
use crate::result::Result;

#[derive(Debug)]
pub enum CommandType {
    Build { options: BuildOptions },
}

impl CommandType {
    pub async fn execute(self) -> Result<()> {
        match self {
            CommandType::Build { options } => build::execute(options).await,
        }
    }
}

#[derive(Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn build_project(&mut self, options: BuildOptions) -> Result<()> {
        CommandType::Build { options }.execute().await
    }
}
