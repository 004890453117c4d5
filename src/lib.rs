/// evebuild - CMake/CTest build driver
///
/// Configures, builds and tests a CMake project in Debug and Release,
/// optionally cross-compiling for Windows, stopping at the first failing step.
///
/// Main modules:
/// - build: Command construction, options, settings and step planning
/// - cli: Command-line interface parsing and execution
/// - commands: Orchestration of the planned steps
/// - result: Error handling and result types
/// - utils: Child-process execution
pub mod build;
pub mod cli;
pub mod commands;
pub mod result;
pub mod utils;
