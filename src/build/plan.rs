use crate::build::cmake::{debug_postfix_flag, prefix_path_flag, toolchain_flag, CMakeCommands};
use crate::build::config::{
    BuildOptions, BuildSettings, Configuration, DEFAULT_INSTALL_DIR_NAME, EXTERNAL_DIR_NAME,
};
use crate::build::step::Step;
use std::path::PathBuf;

/// Turns resolved options and project settings into the ordered list of steps to run.
pub struct BuildPlan<'a> {
    options: &'a BuildOptions,
    settings: &'a BuildSettings,
    commands: CMakeCommands,
}

impl<'a> BuildPlan<'a> {
    pub fn new(options: &'a BuildOptions, settings: &'a BuildSettings) -> Self {
        Self {
            options,
            settings,
            commands: CMakeCommands::from(&settings.toolchain),
        }
    }

    /// Output directories removed before a fresh build, one per active configuration.
    pub fn dirs_to_clean(&self) -> Vec<PathBuf> {
        if !self.options.fresh {
            return Vec::new();
        }

        self.options
            .configurations()
            .into_iter()
            .map(|config| self.options.config_dir(config))
            .collect()
    }

    pub fn toolchain_file(&self) -> Option<PathBuf> {
        self.options
            .cross_compile_windows
            .then(|| self.settings.cross_toolchain_path(&self.options.project_dir))
    }

    /// Where dependencies of `config` are installed: the configured prefix, or
    /// `<build>/<Config>/install` so nothing lands in the system prefix.
    pub fn install_prefix(&self, config: Configuration) -> PathBuf {
        match &self.settings.toolchain.install_prefix {
            Some(prefix) => prefix.clone(),
            None => self.options.config_dir(config).join(DEFAULT_INSTALL_DIR_NAME),
        }
    }

    pub fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::new();

        for config in self.options.configurations() {
            for dep in &self.settings.dependencies.names {
                steps.extend(self.dependency_steps(dep, config));
            }
            steps.extend(self.project_steps(config));
        }

        steps
    }

    fn project_steps(&self, config: Configuration) -> Vec<Step> {
        let opts = self.options;
        let build_dir = opts.config_dir(config);
        let debug = config.is_debug();

        let mut generate = self
            .commands
            .configure_command(&opts.project_dir, &build_dir, debug, opts.fresh);
        if !self.settings.dependencies.names.is_empty() {
            generate.push(prefix_path_flag(&self.install_prefix(config)));
        }
        if debug {
            generate.push(debug_postfix_flag(&self.settings.toolchain.debug_postfix));
        }

        let mut build = self.commands.build_command(&build_dir, debug, opts.fresh);

        if let Some(file) = self.toolchain_file() {
            generate.insert(1, toolchain_flag(&file));
            build.push(toolchain_flag(&file));
        }

        let mut steps = vec![
            Step::new(format!("Generating CMake {} project", config.label()), generate),
            Step::new(format!("Building {} version", config.label()), build),
        ];

        if opts.runs_tests() {
            let test = self.commands.test_command(config, opts.verbosity);
            // ctest has no option for its working directory.
            steps.push(Step::new(format!("Testing {} version", config.label()), test).in_dir(build_dir));
        }

        steps
    }

    fn dependency_steps(&self, dep: &str, config: Configuration) -> Vec<Step> {
        let opts = self.options;
        let source_dir = opts.project_dir.join(EXTERNAL_DIR_NAME).join(dep);
        let build_dir = opts.config_dir(config).join(EXTERNAL_DIR_NAME).join(dep);
        let debug = config.is_debug();
        let verbose_install = opts.verbosity.shows_commands();

        let mut generate = self
            .commands
            .configure_command(&source_dir, &build_dir, debug, opts.fresh);
        let mut build = self.commands.build_command(&build_dir, debug, opts.fresh);
        let install = self.commands.install_command(
            &build_dir,
            &self.install_prefix(config),
            debug,
            verbose_install,
        );

        if let Some(file) = self.toolchain_file() {
            generate.insert(1, toolchain_flag(&file));
            build.push(toolchain_flag(&file));
        }

        vec![
            Step::new(format!("Generating {} {} project", dep, config.label()), generate),
            Step::new(format!("Building {} {} version", dep, config.label()), build),
            Step::new(format!("Installing {} {} version", dep, config.label()), install),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::config::Verbosity;

    fn options() -> BuildOptions {
        BuildOptions::new("/src", "/src/build")
    }

    fn labels(steps: &[Step]) -> Vec<&str> {
        steps.iter().map(Step::label).collect()
    }

    #[test]
    fn default_plan_runs_both_configurations_with_tests() {
        let opts = options();
        let settings = BuildSettings::default();
        let steps = BuildPlan::new(&opts, &settings).steps();

        assert_eq!(
            labels(&steps),
            [
                "Generating CMake debug project",
                "Building debug version",
                "Testing debug version",
                "Generating CMake release project",
                "Building release version",
                "Testing release version",
            ]
        );

        assert_eq!(
            steps[0].command(),
            [
                "cmake",
                "-S/src",
                "-B/src/build/Debug",
                "-DCMAKE_BUILD_TYPE=Debug",
                "-DCMAKE_DEBUG_POSTFIX=_d",
            ]
        );
        assert_eq!(steps[0].working_dir(), None);
        assert_eq!(steps[2].working_dir(), Some(std::path::Path::new("/src/build/Debug")));
        assert_eq!(
            steps[3].command(),
            ["cmake", "-S/src", "-B/src/build/Release", "-DCMAKE_BUILD_TYPE=Release"]
        );
    }

    #[test]
    fn no_tests_drops_test_steps() {
        let mut opts = options();
        opts.run_tests = false;
        let settings = BuildSettings::default();
        let steps = BuildPlan::new(&opts, &settings).steps();

        assert_eq!(steps.len(), 4);
        assert!(steps.iter().all(|s| !s.label().starts_with("Testing")));
    }

    #[test]
    fn fresh_debug_only_cleans_debug_dir() {
        let mut opts = options();
        opts.fresh = true;
        opts.debug_only = true;
        let settings = BuildSettings::default();
        let plan = BuildPlan::new(&opts, &settings);

        assert_eq!(plan.dirs_to_clean(), [PathBuf::from("/src/build/Debug")]);

        let steps = plan.steps();
        assert!(steps.iter().all(|s| !s.label().contains("release")));
        assert_eq!(steps[0].command()[1], "--fresh");
        assert_eq!(steps[1].command()[3], "--clean-first");
    }

    #[test]
    fn fresh_both_cleans_both_dirs() {
        let mut opts = options();
        opts.fresh = true;
        let settings = BuildSettings::default();

        assert_eq!(
            BuildPlan::new(&opts, &settings).dirs_to_clean(),
            [PathBuf::from("/src/build/Debug"), PathBuf::from("/src/build/Release")]
        );

        opts.fresh = false;
        assert!(BuildPlan::new(&opts, &settings).dirs_to_clean().is_empty());
    }

    #[test]
    fn cross_compile_adds_toolchain_and_skips_tests() {
        let mut opts = options();
        opts.cross_compile_windows = true;
        opts.fresh = true;
        let settings = BuildSettings::default();
        let steps = BuildPlan::new(&opts, &settings).steps();
        let flag = "-DCMAKE_TOOLCHAIN_FILE=/src/TC-mingw.cmake";

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].command()[1], flag);
        assert_eq!(steps[0].command()[2], "--fresh");
        assert_eq!(steps[1].command().last().map(String::as_str), Some(flag));
        assert_eq!(steps[2].command()[1], flag);
        assert_eq!(steps[3].command().last().map(String::as_str), Some(flag));
    }

    #[test]
    fn diagnostic_tests_are_extra_verbose() {
        let mut opts = options();
        opts.release_only = true;
        opts.verbosity = Verbosity::DIAGNOSTIC;
        let settings = BuildSettings::default();
        let steps = BuildPlan::new(&opts, &settings).steps();

        assert_eq!(
            steps[2].command(),
            ["ctest", "--output-on-failure", "-C", "Release", "--verbose", "--extra-verbose"]
        );
    }

    #[test]
    fn dependencies_precede_project_per_configuration() {
        let mut opts = options();
        opts.release_only = true;
        opts.run_tests = false;
        let settings = BuildSettings::from_toml("[dependencies]\nnames = [\"glfw\"]\n").unwrap();
        let steps = BuildPlan::new(&opts, &settings).steps();

        assert_eq!(
            labels(&steps),
            [
                "Generating glfw release project",
                "Building glfw release version",
                "Installing glfw release version",
                "Generating CMake release project",
                "Building release version",
            ]
        );
        assert_eq!(
            steps[0].command(),
            [
                "cmake",
                "-S/src/external/glfw",
                "-B/src/build/Release/external/glfw",
                "-DCMAKE_BUILD_TYPE=Release",
            ]
        );
        assert_eq!(
            steps[2].command(),
            [
                "cmake",
                "--install",
                "/src/build/Release/external/glfw",
                "--strip",
                "--prefix",
                "/src/build/Release/install",
            ]
        );
        assert_eq!(
            steps[3].command(),
            [
                "cmake",
                "-S/src",
                "-B/src/build/Release",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DCMAKE_PREFIX_PATH=/src/build/Release/install",
            ]
        );
    }

    #[test]
    fn configured_prefix_is_shared_by_install_and_project() {
        let mut opts = options();
        opts.debug_only = true;
        opts.run_tests = false;
        let settings = BuildSettings::from_toml(
            "[toolchain]\ninstall_prefix = \"/opt/evelike\"\n\n[dependencies]\nnames = [\"glm\"]\n",
        )
        .unwrap();
        let plan = BuildPlan::new(&opts, &settings);
        let steps = plan.steps();

        assert_eq!(plan.install_prefix(Configuration::Debug), PathBuf::from("/opt/evelike"));
        assert_eq!(&steps[2].command()[3..], ["--prefix", "/opt/evelike"]);
        assert_eq!(
            &steps[3].command()[4..],
            ["-DCMAKE_PREFIX_PATH=/opt/evelike", "-DCMAKE_DEBUG_POSTFIX=_d"]
        );
    }

    #[test]
    fn default_prefix_is_per_configuration() {
        let opts = options();
        let settings = BuildSettings::default();
        let plan = BuildPlan::new(&opts, &settings);

        assert_eq!(
            plan.install_prefix(Configuration::Debug),
            PathBuf::from("/src/build/Debug/install")
        );
        assert_eq!(
            plan.install_prefix(Configuration::Release),
            PathBuf::from("/src/build/Release/install")
        );
        // No dependencies, nothing to find.
        assert!(plan
            .steps()
            .iter()
            .all(|s| s.command().iter().all(|t| !t.starts_with("-DCMAKE_PREFIX_PATH"))));
    }
}
