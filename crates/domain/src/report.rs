//! Reporting interface handed to every pipeline component.
//!
//! Components never print on their own. They receive a `Reporter` at
//! construction time and describe their progress through it; the binary
//! decides where those lines go.

use std::sync::{Arc, Mutex};

/// Sink for user-facing progress lines.
pub trait Reporter: Send + Sync {
    fn progress(&self, message: &str);
    fn warning(&self, message: &str);
    fn failure(&self, message: &str);
}

/// Shared handle passed between components.
pub type SharedReporter = Arc<dyn Reporter>;

/// Forwards report lines to `tracing`, tagged with the component name.
#[derive(Debug, Clone, Copy)]
pub struct TracingReporter {
    component: &'static str,
}

impl TracingReporter {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn shared(component: &'static str) -> SharedReporter {
        Arc::new(Self::new(component))
    }
}

impl Reporter for TracingReporter {
    fn progress(&self, message: &str) {
        tracing::info!(component = self.component, "{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(component = self.component, "{}", message);
    }

    fn failure(&self, message: &str) {
        tracing::error!(component = self.component, "{}", message);
    }
}

/// Severity of a recorded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Progress,
    Warning,
    Failure,
}

/// Keeps every line in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<(ReportLevel, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines.
    pub fn lines(&self) -> Vec<(ReportLevel, String)> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Recorded lines of one level only.
    pub fn lines_at(&self, level: ReportLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(line_level, _)| *line_level == level)
            .map(|(_, line)| line)
            .collect()
    }

    fn record(&self, level: ReportLevel, message: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push((level, message.to_string()));
    }
}

impl Reporter for MemoryReporter {
    fn progress(&self, message: &str) {
        self.record(ReportLevel::Progress, message);
    }

    fn warning(&self, message: &str) {
        self.record(ReportLevel::Warning, message);
    }

    fn failure(&self, message: &str) {
        self.record(ReportLevel::Failure, message);
    }
}
