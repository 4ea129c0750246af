//! Runtime execution for Quark programs

pub mod config;
mod evaluator;
mod frames;
pub mod host;
pub mod operators;
mod output;
mod value;

pub use config::EvaluatorConfig;
pub use evaluator::{Flow, QuarkEvaluator};
pub use frames::FrameStack;
pub use host::{run_detached, RunOutcome, ValueSnapshot};
pub use output::CapturedOutput;
pub use value::{Value, ValueCell};
