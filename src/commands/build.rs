use crate::build::{BuildOptions, BuildPlan, BuildSettings, Step, Verbosity};
use crate::result::{EveBuildError, Result};
use crate::utils::process::{ProcessManager, StepOutput, StepRunner};
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;
use tokio::fs;

pub async fn execute(options: BuildOptions) -> Result<()> {
    let settings = BuildSettings::load(&options.project_dir).await?;
    let mut runner = ProcessManager::new();
    let mut cmd = BuildCommand::new(options, settings);
    cmd.execute(&mut runner).await
}

/// Destination for progress text (`out`) and failure reports (`err`).
pub struct Console<O, E> {
    out: O,
    err: E,
}

impl Console<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Console<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }

    // Flushed every time so the text lands before a child's streamed output.
    fn print(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn eprint(&mut self, text: &str) -> io::Result<()> {
        self.err.write_all(text.as_bytes())?;
        self.err.flush()
    }
}

/// Drives the Debug/Release pipelines: cleans, plans, then runs every step in order
/// and stops at the first one that fails.
pub struct BuildCommand {
    options: BuildOptions,
    settings: BuildSettings,
}

impl BuildCommand {
    pub fn new(options: BuildOptions, settings: BuildSettings) -> Self {
        Self { options, settings }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn plan(&self) -> BuildPlan<'_> {
        BuildPlan::new(&self.options, &self.settings)
    }

    pub async fn execute<R: StepRunner>(&mut self, runner: &mut R) -> Result<()> {
        self.execute_with(runner, &mut Console::stdio()).await
    }

    pub async fn execute_with<R, O, E>(
        &mut self,
        runner: &mut R,
        console: &mut Console<O, E>,
    ) -> Result<()>
    where
        R: StepRunner,
        O: Write,
        E: Write,
    {
        self.options.validate()?;

        let verbosity = self.options.verbosity;
        log::info!("Starting build: {:?}", self.options);

        if verbosity.shows_progress() {
            console.print(&self.summary())?;
        }

        let plan = self.plan();
        if let Some(file) = plan.toolchain_file() {
            if verbosity.shows_progress() {
                console.print(&format!("cross_compile_file {}\n", file.display()))?;
            }
            log::info!("Cross-compiling with toolchain file {}", file.display());
        }

        for dir in plan.dirs_to_clean() {
            remove_build_dir(&dir).await?;
        }

        let steps = plan.steps();
        let started = Instant::now();

        match run_steps(&steps, verbosity, runner, console).await {
            Ok(()) => {
                log::info!(
                    "Build succeeded: {} steps in {}",
                    steps.len(),
                    format_duration(started.elapsed())
                );
                if verbosity.shows_progress() {
                    console.print("Succeeded.\n")?;
                }
                Ok(())
            }
            Err(e) => {
                log::error!("Build failed: {}", e);
                console.print("\nFailed.\n")?;
                Err(e)
            }
        }
    }

    fn summary(&self) -> String {
        let opts = &self.options;
        format!(
            "Project dir:   {}\n\
             Build dir:     {}\n\
             Debug only:    {}\n\
             Release only:  {}\n\
             Fresh:         {}\n\
             Run tests:     {}\n\
             Verbose lvl:   {}\n\
             Win32 cross:   {}\n\n",
            opts.project_dir.display(),
            opts.build_dir.display(),
            opts.debug_only,
            opts.release_only,
            opts.fresh,
            opts.runs_tests(),
            opts.verbosity.level(),
            opts.cross_compile_windows,
        )
    }
}

/// Runs `steps` strictly in order. The first failing step aborts the run and
/// the remaining steps are never started.
pub async fn run_steps<R, O, E>(
    steps: &[Step],
    verbosity: Verbosity,
    runner: &mut R,
    console: &mut Console<O, E>,
) -> Result<()>
where
    R: StepRunner,
    O: Write,
    E: Write,
{
    for step in steps {
        if verbosity.shows_progress() {
            console.print(&format!("{} ...", step.label()))?;
        }
        if verbosity.shows_commands() {
            console.print(&format!("\n{}\n", step.command_line()))?;
        }

        let output = match runner.run(step, verbosity).await {
            Ok(output) => output,
            Err(e) => {
                report_failure(console, step, None)?;
                return Err(e);
            }
        };

        if !output.success {
            return Err(step_failed(console, step, output)?);
        }

        if verbosity.shows_progress() {
            console.print("OK.\n")?;
        }
    }

    Ok(())
}

fn step_failed<O: Write, E: Write>(
    console: &mut Console<O, E>,
    step: &Step,
    output: StepOutput,
) -> Result<EveBuildError> {
    let captured = output.captured.filter(|text| !text.is_empty());
    report_failure(console, step, captured.as_deref())?;

    Ok(EveBuildError::StepFailed {
        label: step.label().into(),
        command: step.command_line(),
        code: output.code,
        output: captured,
    })
}

fn report_failure<O: Write, E: Write>(
    console: &mut Console<O, E>,
    step: &Step,
    captured: Option<&str>,
) -> io::Result<()> {
    console.eprint(&format!("Exception when calling:\n`{}`\n", step.command_line()))?;
    if let Some(text) = captured {
        console.eprint(&format!("\nError:\n{}\n", text))?;
        log::error!("{} output:\n{}", step.label(), text);
    }
    Ok(())
}

/// Removes a configuration output directory. A directory that is already gone is fine.
pub async fn remove_build_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => {
            log::info!("Removed {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} does not exist, nothing to remove", dir.display());
            Ok(())
        }
        Err(e) => Err(EveBuildError::Io(io::Error::new(
            e.kind(),
            format!("Failed to remove {}: {}", dir.display(), e),
        ))),
    }
}

fn format_duration(duration: std::time::Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms >= 1000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", total_ms)
    }
}
