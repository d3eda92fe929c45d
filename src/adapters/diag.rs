//! Host-side diagnostics adapters

use crate::ports::diagnostics::{DiagnosticEvent, DiagnosticsPort};

/// Diagnostics sink that drops every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDiagnostics;

impl DiagnosticsPort for NullDiagnostics {
    fn record(&mut self, _event: DiagnosticEvent) {}
}

/// Diagnostics sink that keeps every event for later assertions
#[cfg(feature = "std")]
#[derive(Clone, Debug, Default)]
pub struct RecordingDiagnostics {
    events: Vec<DiagnosticEvent>,
}

#[cfg(feature = "std")]
impl RecordingDiagnostics {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, in order
    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }

    /// Events of the given severity, in order
    pub fn events_at(
        &self,
        severity: crate::ports::diagnostics::Severity,
    ) -> impl Iterator<Item = &DiagnosticEvent> {
        self.events.iter().filter(move |e| e.severity() == severity)
    }
}

#[cfg(feature = "std")]
impl DiagnosticsPort for RecordingDiagnostics {
    fn record(&mut self, event: DiagnosticEvent) {
        self.events.push(event);
    }
}
