use crate::severity::LogSeverity;
use crate::systime::now;
use once_cell::sync::OnceCell;

static THRESHOLD: OnceCell<LogSeverity> = OnceCell::new();

const DEFAULT_THRESHOLD: LogSeverity = LogSeverity::Info;

/// Sets the process-wide minimum severity. Only the first call takes effect;
/// later calls return `false`.
pub fn init(min: LogSeverity) -> bool {
    THRESHOLD.set(min).is_ok()
}

pub fn enabled(severity: LogSeverity) -> bool {
    severity >= *THRESHOLD.get().unwrap_or(&DEFAULT_THRESHOLD)
}

pub fn log(msg: String, log_severity: LogSeverity) {
    if !enabled(log_severity) {
        return;
    }
    if log_severity >= LogSeverity::Warning {
        eprintln!("[{}] {} {}", log_severity, now(), msg);
    } else {
        println!("[{}] {} {}", log_severity, now(), msg);
    }
}
