//! Progress messages streamed by uploads and downloads

/// One progress message from `AddFiles` or `DownloadFiles`.
///
/// `detail` is whatever status text the middleware attached (file name,
/// download status, or an error description). `progress` is a percentage;
/// downloads report negative values while the size is still unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferUpdate {
    pub detail: String,
    pub progress: i32,
}

impl TransferUpdate {
    pub fn new(detail: impl Into<String>, progress: i32) -> Self {
        Self {
            detail: detail.into(),
            progress,
        }
    }

    /// Progress clamped to 0..=100, or `None` while it is unknown.
    pub fn percent(&self) -> Option<u8> {
        if self.progress < 0 {
            return None;
        }
        Some(self.progress.min(100) as u8)
    }

    /// The transfer finished; nothing after this message matters.
    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    /// The middleware reports failures in-band through the status text.
    ///
    /// Updates with unknown progress are informational and never count.
    pub fn is_error(&self) -> bool {
        self.progress >= 0 && (self.detail.contains("Error") || self.detail.contains("ERROR"))
    }
}
