use std::time::{Duration, SystemTime};

/// One message in an iteration's outbound stream.
///
/// Within a single iteration the stream is totally ordered: log entries in
/// script call order, then at most one `Error`, then exactly one terminal
/// `Metric`. Stream closure after the metric signals iteration completion.
#[derive(Debug, Clone)]
pub enum IterationResult {
    Metric(Metric),
    Log(LogEntry),
    Error(IterationFault),
}

/// Emitted exactly once per iteration, after the run finishes (successfully
/// or not). `duration` is wall-clock time of the whole iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub time: SystemTime,
    pub duration: Duration,
}

/// One `log(text)` call made by the script, timestamped at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub time: SystemTime,
    pub text: String,
}

/// A fault recovered at the iteration boundary. Faults never terminate the
/// VU worker; they travel down the result stream instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IterationFault {
    /// A script-raised error or interpreter runtime error, including faults
    /// surfaced by a bridged capability (e.g. a failed fetch).
    #[error("script error: {0}")]
    Script(String),

    /// A host-side abort trapped while the script was executing.
    #[error("runtime panic: {0}")]
    Panic(String),
}

impl IterationResult {
    pub fn is_metric(&self) -> bool {
        matches!(self, Self::Metric(_))
    }

    pub fn as_log(&self) -> Option<&LogEntry> {
        match self {
            Self::Log(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn as_fault(&self) -> Option<&IterationFault> {
        match self {
            Self::Error(fault) => Some(fault),
            _ => None,
        }
    }
}
