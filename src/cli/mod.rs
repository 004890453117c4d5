pub mod parser;

use crate::build::{BuildOptions, Verbosity, PROJECT_NAME};
use crate::cli::parser::CliParser;
use crate::commands::CommandExecutor;
use crate::result::Result;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "evebuild")]
#[command(about = "Builds evelike and its dependencies with CMake, in Debug and Release")]
#[command(version)]
#[command(
    help_template = "{before-help}{name} v{version}\n\n{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Project source directory containing CMakeLists.txt (default: current directory)"
    )]
    project_dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Intermediate build directory (default: ./build); Debug and Release are created inside it"
    )]
    build_dir: Option<PathBuf>,

    #[arg(short, long, help = "Do a clean CMake generate and build")]
    fresh: bool,

    #[arg(short, long, help = "Do not run tests")]
    no_tests: bool,

    #[cfg(target_os = "linux")]
    #[arg(short, long, help = "Cross-compile for Windows from Linux (disables tests)")]
    windows_cross_compile: bool,

    #[arg(short, long, conflicts_with = "release_only", help = "Only Debug targets")]
    debug_only: bool,

    #[arg(short, long, help = "Only Release targets")]
    release_only: bool,

    #[arg(
        short,
        long,
        conflicts_with = "verbose",
        help = "Print no output except in the event of an error"
    )]
    quiet: bool,

    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Print output from the generate and build steps; repeat for more detail"
    )]
    verbose: u8,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let options = self.build_options(&cwd)?;
        CliParser::validate_project_dir(&options.project_dir)?;

        log::info!("Building {} in {}", PROJECT_NAME, options.build_dir.display());

        let mut executor = CommandExecutor::new();
        executor.build_project(options).await
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    #[cfg(target_os = "linux")]
    pub fn cross_compile_windows(&self) -> bool {
        self.windows_cross_compile
    }

    #[cfg(not(target_os = "linux"))]
    pub fn cross_compile_windows(&self) -> bool {
        false
    }

    /// Resolves the parsed arguments against `cwd` into options for a build run.
    pub fn build_options(&self, cwd: &Path) -> Result<BuildOptions> {
        let project_dir = self
            .project_dir
            .as_deref()
            .map(|dir| CliParser::resolve_dir(cwd, dir))
            .unwrap_or_else(|| cwd.to_path_buf());

        let build_dir = self
            .build_dir
            .as_deref()
            .map(|dir| CliParser::resolve_dir(cwd, dir))
            .unwrap_or_else(|| CliParser::default_build_dir(cwd));

        let cross_compile_windows = self.cross_compile_windows();

        let options = BuildOptions {
            project_dir,
            build_dir,
            debug_only: self.debug_only,
            release_only: self.release_only,
            fresh: self.fresh,
            run_tests: !(self.no_tests || cross_compile_windows),
            verbosity: self.verbosity(),
            cross_compile_windows,
        };
        options.validate()?;

        Ok(options)
    }
}
