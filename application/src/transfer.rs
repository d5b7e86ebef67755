//! Upload and download progress consumer.
//!
//! `AddFiles` and `DownloadFiles` stream progress messages until the
//! transfer reaches 100%. Failures arrive either as a transport error or
//! in-band as an error marker in the status text; both end the stream.

use crate::error::ClientError;
use crate::ports::middleware_gateway::{TransferFeed, TransferFrame};
use crate::ports::progress::ProgressNotifier;
use sb_domain::TransferUpdate;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Summary of a finished transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub operation: String,
    /// Status text of the last update received
    pub detail: String,
    pub updates: usize,
    /// Whether the middleware reported 100%
    pub completed: bool,
}

/// A transfer whose progress is being received.
pub struct TransferStream {
    operation: String,
    feed: Box<dyn TransferFeed>,
    progress: Arc<dyn ProgressNotifier>,
    last: Option<TransferUpdate>,
    updates: usize,
    done: bool,
}

impl TransferStream {
    pub(crate) fn new(
        operation: &str,
        feed: Box<dyn TransferFeed>,
        progress: Arc<dyn ProgressNotifier>,
    ) -> Self {
        Self {
            operation: operation.to_string(),
            feed,
            progress,
            last: None,
            updates: 0,
            done: false,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Next progress update.
    ///
    /// Returns `None` once the transfer is complete or the stream ended. A
    /// failure yields one `Some(Err(..))` and then `None`.
    pub async fn next_update(&mut self) -> Option<Result<TransferUpdate, ClientError>> {
        if self.done {
            return None;
        }

        match self.feed.next_update().await {
            Some(TransferFrame::Update(update)) => {
                trace!("{} update: {:?}", self.operation, update);
                if update.is_error() {
                    return Some(Err(self.fail(update.detail)));
                }
                self.updates += 1;
                self.progress
                    .on_transfer_progress(&self.operation, update.percent(), &update.detail);
                if update.is_complete() {
                    self.finish_with(true);
                }
                self.last = Some(update.clone());
                Some(Ok(update))
            }
            Some(TransferFrame::End) => {
                self.finish_with(true);
                None
            }
            Some(TransferFrame::Error(e)) => Some(Err(self.fail(e.to_string()))),
            None => Some(Err(self.fail("stream closed before end of data".to_string()))),
        }
    }

    /// Drain the stream and summarize it.
    pub async fn finish(mut self) -> Result<TransferReport, ClientError> {
        while let Some(update) = self.next_update().await {
            update?;
        }
        let completed = self.last.as_ref().is_some_and(TransferUpdate::is_complete);
        Ok(TransferReport {
            detail: self.last.map(|u| u.detail).unwrap_or_default(),
            operation: self.operation,
            updates: self.updates,
            completed,
        })
    }

    fn finish_with(&mut self, success: bool) {
        if success {
            debug!("{} finished after {} updates", self.operation, self.updates);
        }
        self.done = true;
        self.progress.on_stream_end(success);
    }

    fn fail(&mut self, message: String) -> ClientError {
        warn!("{} failed: {}", self.operation, message);
        self.finish_with(false);
        ClientError::Transfer {
            operation: self.operation.clone(),
            message,
        }
    }
}
