pub mod cmake;
pub mod config;
pub mod plan;
pub mod step;

pub use cmake::CMakeCommands;
pub use config::*;
pub use plan::BuildPlan;
pub use step::Step;
