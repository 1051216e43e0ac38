use std::error::Error;

/// Sink for problems the reconciler recovers from.
pub trait ErrorReporter {
    /// Input was bad but a fallback was applied.
    fn warn(&mut self, message: &str);

    /// An update was abandoned.
    fn error(&mut self, message: &str, cause: &dyn Error);
}

/// Reports through `tracing`.
#[derive(Debug, Default, Copy, Clone)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn warn(&mut self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&mut self, message: &str, cause: &dyn Error) {
        tracing::error!("{message}: {cause}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Warning(String),
    Error { message: String, cause: String },
}

/// Keeps every report in memory, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    reports: Vec<Report>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.reports.iter().filter_map(|r| match r {
            Report::Warning(m) => Some(m.as_str()),
            Report::Error { .. } => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.reports.iter().filter_map(|r| match r {
            Report::Error { message, cause } => Some((message.as_str(), cause.as_str())),
            Report::Warning(_) => None,
        })
    }

    pub fn drain(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }
}

impl ErrorReporter for RecordingReporter {
    fn warn(&mut self, message: &str) {
        tracing::warn!("{message}");
        self.reports.push(Report::Warning(message.to_string()));
    }

    fn error(&mut self, message: &str, cause: &dyn Error) {
        tracing::error!("{message}: {cause}");
        self.reports.push(Report::Error {
            message: message.to_string(),
            cause: cause.to_string(),
        });
    }
}
