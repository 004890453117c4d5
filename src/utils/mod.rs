pub mod process;

pub use process::{ProcessManager, StepOutput, StepRunner};
