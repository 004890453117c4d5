use crate::build::{EXIT_FAILURE, EXIT_SUCCESS};
use smol_str::SmolStr;
use std::borrow::Cow;
use thiserror::Error;

/** Main Result type alias for evebuild operations
 *
 * # Usage
 * ```no_run
 * use evebuild::result::Result;
 *
 * async fn read_settings() -> Result<String> {
 *     // Function automatically propagates EveBuildError
 *     let content = std::fs::read_to_string("evebuild.toml")?;
 *     Ok(content)
 * }
 * ```
 */
pub type Result<T> = std::result::Result<T, EveBuildError>;

/** Error enumeration for the build driver
 *
 * # Error Categories
 * - **Io**: File system operations, including fresh-build cleanup
 * - **StepFailed**: An external command ran and exited unsuccessfully
 * - **Process**: An external command could not be started or awaited
 * - **Config**: Invalid options or settings file contents
 * - **NotFound**: Missing project directory, settings file or executable
 * - **TomlParse**: Settings file is not valid TOML
 *
 * # Design Notes
 * - `StepFailed` keeps the full command line and any captured output so the
 *   entry point can report them and map the failure to exit status 1
 * - Uses `Cow<'static, str>` for message variants
 */
#[derive(Error, Debug)]
pub enum EveBuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{label} failed: `{command}` exited with {}", describe_code(.code))]
    StepFailed {
        label: SmolStr,
        command: String,
        code: Option<i32>,
        output: Option<String>,
    },

    #[error("Process error: {0}")]
    Process(Cow<'static, str>),

    #[error("Config error: {0}")]
    Config(Cow<'static, str>),

    #[error("Not found: {0}")]
    NotFound(Cow<'static, str>),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl EveBuildError {
    pub const CONFLICTING_CONFIGURATIONS: &'static str =
        "debug-only and release-only cannot both be selected";
    pub const ZERO_JOBS: &'static str = "toolchain.jobs must be at least 1";

    pub fn process(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Process(msg.into())
    }

    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    /// True when an external build step ran and reported failure.
    pub fn is_step_failure(&self) -> bool {
        matches!(self, Self::StepFailed { .. })
    }
}

/// Process exit status for the outcome of a run. Any error, step failure or not, is `EXIT_FAILURE`.
pub fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(_) => EXIT_FAILURE,
    }
}
