use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    pub fn badge(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

/// Fire-and-forget toast surface supplied by the host.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}

/// Default surface used when the host does not wire its own: toasts become
/// log lines.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Success => info!(badge = severity.badge(), "{message}"),
            Severity::Error => error!(badge = severity.badge(), "{message}"),
        }
    }
}

/// Signal fired once when a submission succeeds and the authoring surface
/// should be left.
pub trait Navigator: Send + Sync {
    fn leave_authoring(&self);
}

#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn leave_authoring(&self) {
        info!("leaving authoring surface");
    }
}
