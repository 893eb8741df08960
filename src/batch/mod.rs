pub mod generator;
pub mod output;

pub use generator::{BatchGenerator, BatchReport, GeneratedItem};
pub use output::OutputDir;
