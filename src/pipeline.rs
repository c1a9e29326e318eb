pub mod step;
pub mod runner;
pub mod builder;
pub mod artisan_step;
pub mod command_step;
pub mod composer_step;
pub mod append_line_step;
pub mod anchor_insert_step;
pub mod set_env_step;
pub mod write_file_step;

#[cfg(test)]
pub(crate) mod testing;

pub use step::{Step, StepContext, StepOutcome, StepResult};
pub use runner::{BatchOutcome, StepRunner};
pub use builder::build_steps;
pub use artisan_step::ArtisanStep;
pub use command_step::CommandStep;
pub use composer_step::ComposerRequireStep;
pub use append_line_step::AppendLineStep;
pub use anchor_insert_step::{AnchorInsertStep, AnchorPosition};
pub use set_env_step::SetEnvStep;
pub use write_file_step::WriteFileStep;
