//! Progress notification port
//!
//! Defines the interface for reporting remote-call progress to the user.

/// Callback for progress updates while the client waits on the middleware
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, log line, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called before a remote call is issued
    fn on_call_start(&self, operation: &str);

    /// Called when a remote call returns
    fn on_call_complete(&self, operation: &str, success: bool);

    /// Called when the first fragment of a chat reply arrives.
    fn on_first_fragment(&self) {}

    /// Called once when a chat stream reaches a terminal phase.
    fn on_stream_end(&self, _success: bool) {}

    /// Called for each progress message of an upload or download.
    ///
    /// `percent` is `None` while the middleware does not know the size yet.
    fn on_transfer_progress(&self, _operation: &str, _percent: Option<u8>, _detail: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_call_start(&self, _operation: &str) {}
    fn on_call_complete(&self, _operation: &str, _success: bool) {}
}
