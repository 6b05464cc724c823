//! User-facing notices for failures the pipeline recovers from.

/// Receives one-line messages meant for the person running the publish.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Discards every notice
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str) {}
}

/// Logs each notice and echoes it on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        log::warn!("{}", message);
        eprintln!("{}", message);
    }
}
