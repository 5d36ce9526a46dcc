//! User-facing diagnostics for failed writes.
//!
//! The managers report fatal write failures here in addition to returning the
//! error, so a host can surface them (toast, dialog) without inspecting every
//! call site.

use log::error;

/// A message meant for the person using the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotice {
    pub entity: &'static str,
    pub operation: &'static str,
    pub message: String,
}

/// Receives user-facing notices.
pub trait DiagnosticSink: Send + Sync {
    fn notify(&self, notice: &UserNotice);
}

/// Default sink: writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn notify(&self, notice: &UserNotice) {
        error!(
            "event=user_notice module=diagnostics entity={} operation={} message={}",
            notice.entity, notice.operation, notice.message
        );
    }
}
