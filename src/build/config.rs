use crate::result::{EveBuildError, Result};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const PROJECT_NAME: &str = "evelike";
pub const DEFAULT_BUILD_DIR_NAME: &str = "build";
pub const SETTINGS_FILE_NAME: &str = "evebuild.toml";
pub const EXTERNAL_DIR_NAME: &str = "external";
pub const DEFAULT_INSTALL_DIR_NAME: &str = "install";

pub const DEFAULT_CMAKE: &str = "cmake";
pub const DEFAULT_CTEST: &str = "ctest";
pub const DEFAULT_JOBS: u32 = 4;
pub const DEFAULT_DEBUG_POSTFIX: &str = "_d";
pub const DEFAULT_CROSS_TOOLCHAIN_FILE: &str = "TC-mingw.cmake";

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// A build variant. Each one gets its own output directory under the build dir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Configuration {
    Debug,
    Release,
}

impl Configuration {
    pub const ALL: [Configuration; 2] = [Configuration::Debug, Configuration::Release];

    /// Value passed to `CMAKE_BUILD_TYPE`, `--config` and `ctest -C`.
    pub fn name(self) -> &'static str {
        match self {
            Configuration::Debug => "Debug",
            Configuration::Release => "Release",
        }
    }

    /// Lower-case form used in step labels.
    pub fn label(self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::Release => "release",
        }
    }

    pub fn dir_name(self) -> &'static str {
        self.name()
    }

    pub fn is_debug(self) -> bool {
        matches!(self, Configuration::Debug)
    }

    pub fn from_debug(debug: bool) -> Self {
        if debug {
            Configuration::Debug
        } else {
            Configuration::Release
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much the driver prints.
///
/// Level 0 (quiet) prints nothing but failures, level 1 (feedback) shows
/// progress and streams child output, level 2 and above (diagnostic)
/// additionally echoes every command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Verbosity(u8);

impl Verbosity {
    pub const QUIET: Verbosity = Verbosity(0);
    pub const FEEDBACK: Verbosity = Verbosity(1);
    pub const DIAGNOSTIC: Verbosity = Verbosity(2);

    pub fn from_level(level: u8) -> Self {
        Verbosity(level)
    }

    /// Derives the level from the `-q` flag and the number of `-v` flags.
    pub fn from_flags(quiet: bool, verbose_count: u8) -> Self {
        if quiet {
            Verbosity::QUIET
        } else {
            Self::from_level(verbose_count.saturating_add(1))
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn is_quiet(self) -> bool {
        self == Verbosity::QUIET
    }

    pub fn shows_progress(self) -> bool {
        self >= Verbosity::FEEDBACK
    }

    pub fn shows_commands(self) -> bool {
        self >= Verbosity::DIAGNOSTIC
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::FEEDBACK
    }
}

/// Everything a single build run needs to know, resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub project_dir: PathBuf,
    pub build_dir: PathBuf,
    pub debug_only: bool,
    pub release_only: bool,
    pub fresh: bool,
    pub run_tests: bool,
    pub verbosity: Verbosity,
    pub cross_compile_windows: bool,
}

impl BuildOptions {
    pub fn new(project_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            build_dir: build_dir.into(),
            debug_only: false,
            release_only: false,
            fresh: false,
            run_tests: true,
            verbosity: Verbosity::default(),
            cross_compile_windows: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.debug_only && self.release_only {
            return Err(EveBuildError::config(
                EveBuildError::CONFLICTING_CONFIGURATIONS,
            ));
        }

        Ok(())
    }

    pub fn has_debug(&self) -> bool {
        !self.release_only
    }

    pub fn has_release(&self) -> bool {
        !self.debug_only
    }

    /// Active configurations, Debug first.
    pub fn configurations(&self) -> Vec<Configuration> {
        Configuration::ALL
            .into_iter()
            .filter(|config| match config {
                Configuration::Debug => self.has_debug(),
                Configuration::Release => self.has_release(),
            })
            .collect()
    }

    /// Tests cannot run on the host when the binaries target another platform.
    pub fn runs_tests(&self) -> bool {
        self.run_tests && !self.cross_compile_windows
    }

    pub fn config_dir(&self, config: Configuration) -> PathBuf {
        self.build_dir.join(config.dir_name())
    }
}

/// Optional per-project settings read from `evebuild.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub toolchain: ToolchainSettings,
    pub dependencies: DependencySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    pub cmake: String,
    pub ctest: String,
    pub jobs: u32,
    pub install_prefix: Option<PathBuf>,
    pub cross_toolchain_file: PathBuf,
    pub debug_postfix: String,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            cmake: DEFAULT_CMAKE.to_string(),
            ctest: DEFAULT_CTEST.to_string(),
            jobs: DEFAULT_JOBS,
            install_prefix: None,
            cross_toolchain_file: DEFAULT_CROSS_TOOLCHAIN_FILE.into(),
            debug_postfix: DEFAULT_DEBUG_POSTFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencySettings {
    pub names: Vec<SmolStr>,
}

impl BuildSettings {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_toml(&content).map_err(|e| match e {
            EveBuildError::TomlParse(err) => EveBuildError::config(format!(
                "Invalid settings file {}: {}",
                path.display(),
                err
            )),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: BuildSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `evebuild.toml` from the project directory, or defaults when absent.
    pub async fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(SETTINGS_FILE_NAME);

        if !path.exists() {
            log::debug!("No {} in {}, using defaults", SETTINGS_FILE_NAME, project_dir.display());
            return Ok(Self::default());
        }

        log::info!("Loading build settings from {}", path.display());
        Self::from_file(&path).await
    }

    pub fn validate(&self) -> Result<()> {
        if self.toolchain.jobs == 0 {
            return Err(EveBuildError::config(EveBuildError::ZERO_JOBS));
        }

        if self.toolchain.cmake.is_empty() || self.toolchain.ctest.is_empty() {
            return Err(EveBuildError::config("Toolchain program names cannot be empty"));
        }

        if let Some(name) = self.dependencies.names.iter().find(|n| !is_valid_dependency(n)) {
            return Err(EveBuildError::config(format!(
                "Invalid dependency name '{}'",
                name
            )));
        }

        Ok(())
    }

    /// Toolchain file used when cross-compiling, relative paths anchored at the project.
    pub fn cross_toolchain_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.toolchain.cross_toolchain_file)
    }
}

// Dependency names become directory names under `external/`.
fn is_valid_dependency(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
