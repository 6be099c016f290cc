//! Supporting utilities: progress reporting and resolver backoff.

pub mod backoff;
pub mod progress;

pub use progress::{ConsoleProgress, NoopProgress, ProgressSink};
