pub mod engine;
pub mod identifier;
pub mod normalize;
pub mod output;
pub mod roster;
pub mod substitution;

pub use crate::domain::model::{GenerationSummary, Identifier, RunInputs, RunOutcome, StudentRecord};
pub use crate::domain::ports::{ConfigProvider, Interaction, Pipeline, Storage};
pub use crate::utils::error::Result;
