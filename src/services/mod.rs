pub mod file_ops;
pub mod processor;
pub mod watcher;

pub use processor::{ProcessError, Processor};
