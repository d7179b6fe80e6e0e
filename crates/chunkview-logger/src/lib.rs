//! Leveled, timestamped console logging.

pub mod log;
pub mod severity;
pub mod systime;

pub use log::{enabled, init, log};
pub use severity::LogSeverity;
