//! Command-line construction for CMake and CTest.
//!
//! Every function here is pure: it only assembles argument vectors, it never
//! touches the filesystem or spawns anything.

use crate::build::config::{Configuration, ToolchainSettings, Verbosity, DEFAULT_CMAKE, DEFAULT_CTEST, DEFAULT_JOBS};
use std::path::Path;

pub const FRESH_FLAG: &str = "--fresh";
pub const CLEAN_FIRST_FLAG: &str = "--clean-first";
pub const PARALLEL_FLAG: &str = "--parallel";
pub const STRIP_FLAG: &str = "--strip";
pub const VERBOSE_FLAG: &str = "--verbose";
pub const EXTRA_VERBOSE_FLAG: &str = "--extra-verbose";
pub const OUTPUT_ON_FAILURE_FLAG: &str = "--output-on-failure";

/// Builds the argument vectors for the configure, build, install and test actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeCommands {
    cmake: String,
    ctest: String,
    jobs: u32,
}

impl Default for CMakeCommands {
    fn default() -> Self {
        Self {
            cmake: DEFAULT_CMAKE.to_string(),
            ctest: DEFAULT_CTEST.to_string(),
            jobs: DEFAULT_JOBS,
        }
    }
}

impl From<&ToolchainSettings> for CMakeCommands {
    fn from(settings: &ToolchainSettings) -> Self {
        Self {
            cmake: settings.cmake.clone(),
            ctest: settings.ctest.clone(),
            jobs: settings.jobs,
        }
    }
}

impl CMakeCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// `cmake [--fresh] -S<source> -B<build> -DCMAKE_BUILD_TYPE=<config>`
    pub fn configure_command(
        &self,
        source_dir: &Path,
        build_dir: &Path,
        debug: bool,
        fresh: bool,
    ) -> Vec<String> {
        let mut cmd = vec![
            self.cmake.clone(),
            format!("-S{}", source_dir.display()),
            format!("-B{}", build_dir.display()),
            format!("-DCMAKE_BUILD_TYPE={}", Configuration::from_debug(debug)),
        ];
        if fresh {
            cmd.insert(1, FRESH_FLAG.to_string());
        }
        cmd
    }

    /// `cmake --build <build> [--clean-first] --parallel <jobs> --config <config>`
    pub fn build_command(&self, build_dir: &Path, debug: bool, fresh: bool) -> Vec<String> {
        let mut cmd = vec![
            self.cmake.clone(),
            "--build".to_string(),
            build_dir.display().to_string(),
            PARALLEL_FLAG.to_string(),
            self.jobs.to_string(),
            "--config".to_string(),
            Configuration::from_debug(debug).to_string(),
        ];
        if fresh {
            cmd.insert(3, CLEAN_FIRST_FLAG.to_string());
        }
        cmd
    }

    /// `cmake --install <build> [--verbose] [--strip] --prefix <prefix>`
    pub fn install_command(
        &self,
        build_dir: &Path,
        prefix: &Path,
        debug: bool,
        verbose: bool,
    ) -> Vec<String> {
        let mut cmd = vec![
            self.cmake.clone(),
            "--install".to_string(),
            build_dir.display().to_string(),
        ];
        if !debug {
            cmd.insert(3, STRIP_FLAG.to_string());
        }
        if verbose {
            cmd.insert(3, VERBOSE_FLAG.to_string());
        }
        cmd.push("--prefix".to_string());
        cmd.push(prefix.display().to_string());
        cmd
    }

    /// `ctest --output-on-failure -C <config>` with verbosity flags accumulated per level.
    pub fn test_command(&self, config: Configuration, verbosity: Verbosity) -> Vec<String> {
        let mut cmd = vec![
            self.ctest.clone(),
            OUTPUT_ON_FAILURE_FLAG.to_string(),
            "-C".to_string(),
            config.to_string(),
        ];
        if verbosity.level() >= 1 {
            cmd.push(VERBOSE_FLAG.to_string());
        }
        if verbosity.level() >= 2 {
            cmd.push(EXTRA_VERBOSE_FLAG.to_string());
        }
        cmd
    }
}

pub fn toolchain_flag(toolchain_file: &Path) -> String {
    format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain_file.display())
}

pub fn prefix_path_flag(prefix: &Path) -> String {
    format!("-DCMAKE_PREFIX_PATH={}", prefix.display())
}

pub fn debug_postfix_flag(postfix: &str) -> String {
    format!("-DCMAKE_DEBUG_POSTFIX={}", postfix)
}

/// Renders an argument vector the way it is echoed to the user.
pub fn command_line(cmd: &[String]) -> String {
    cmd.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands() -> CMakeCommands {
        CMakeCommands::new()
    }

    #[test]
    fn configure_release() {
        let cmd = commands().configure_command(Path::new("/src"), Path::new("/out"), false, false);
        assert_eq!(
            cmd,
            ["cmake", "-S/src", "-B/out", "-DCMAKE_BUILD_TYPE=Release"]
        );
    }

    #[test]
    fn configure_fresh_puts_flag_after_program() {
        let cmd = commands().configure_command(Path::new("/src"), Path::new("/out"), true, true);
        assert_eq!(
            cmd,
            ["cmake", "--fresh", "-S/src", "-B/out", "-DCMAKE_BUILD_TYPE=Debug"]
        );
    }

    #[test]
    fn build_fresh_cleans_first() {
        let cmd = commands().build_command(Path::new("/out"), true, true);
        assert_eq!(
            cmd,
            ["cmake", "--build", "/out", "--clean-first", "--parallel", "4", "--config", "Debug"]
        );
    }

    #[test]
    fn install_release_verbose() {
        let prefix = Path::new("/out/install");
        let cmd = commands().install_command(Path::new("/out"), prefix, false, true);
        assert_eq!(
            cmd,
            ["cmake", "--install", "/out", "--verbose", "--strip", "--prefix", "/out/install"]
        );

        let cmd = commands().install_command(Path::new("/out"), prefix, true, false);
        assert_eq!(cmd, ["cmake", "--install", "/out", "--prefix", "/out/install"]);
    }

    #[test]
    fn test_command_flags_accumulate() {
        let quiet = commands().test_command(Configuration::Debug, Verbosity::QUIET);
        assert_eq!(quiet, ["ctest", "--output-on-failure", "-C", "Debug"]);

        let feedback = commands().test_command(Configuration::Release, Verbosity::FEEDBACK);
        assert_eq!(feedback.last().map(String::as_str), Some(VERBOSE_FLAG));
        assert!(!feedback.iter().any(|t| t == EXTRA_VERBOSE_FLAG));

        let diagnostic = commands().test_command(Configuration::Release, Verbosity::DIAGNOSTIC);
        assert!(diagnostic.iter().any(|t| t == VERBOSE_FLAG));
        assert!(diagnostic.iter().any(|t| t == EXTRA_VERBOSE_FLAG));
    }

    #[test]
    fn custom_programs_and_jobs() {
        let settings = ToolchainSettings {
            cmake: "cmake3".to_string(),
            jobs: 16,
            ..ToolchainSettings::default()
        };
        let cmd = CMakeCommands::from(&settings).build_command(Path::new("/out"), false, false);
        assert_eq!(cmd[0], "cmake3");
        assert_eq!(cmd[4], "16");
    }

    #[test]
    fn flags_and_rendering() {
        assert_eq!(
            toolchain_flag(Path::new("/src/TC-mingw.cmake")),
            "-DCMAKE_TOOLCHAIN_FILE=/src/TC-mingw.cmake"
        );
        assert_eq!(debug_postfix_flag("_d"), "-DCMAKE_DEBUG_POSTFIX=_d");
        assert_eq!(
            prefix_path_flag(Path::new("/out/install")),
            "-DCMAKE_PREFIX_PATH=/out/install"
        );
        assert_eq!(
            command_line(&["cmake".to_string(), "--build".to_string()]),
            "cmake --build"
        );
    }
}
