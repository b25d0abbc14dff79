//! Diagnostics sink for recovered failures.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::EmojiError;

/// Context attached to a diagnostic report.
pub type Metadata = BTreeMap<&'static str, String>;

/// Receives failures that were recovered from locally.
pub trait DiagnosticsSink {
    fn notify(&self, error: &EmojiError, metadata: &Metadata);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn notify(&self, error: &EmojiError, metadata: &Metadata) {
        tracing::error!(target: "loom::diagnostics", %error, ?metadata, "diagnostic report");
    }
}

/// Keeps every report. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    reports: Rc<RefCell<Vec<(EmojiError, Metadata)>>>,
}

impl RecordingDiagnostics {
    pub fn reports(&self) -> Vec<(EmojiError, Metadata)> {
        self.reports.borrow().clone()
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn notify(&self, error: &EmojiError, metadata: &Metadata) {
        self.reports
            .borrow_mut()
            .push((error.clone(), metadata.clone()));
    }
}
