//! Per-call timeout policy

use std::time::Duration;

/// Default bound for quick unary calls.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a single remote call may take.
///
/// Passed explicitly into every gateway operation. Calls whose remote-side
/// duration is unpredictable (configuration writes, chat) use
/// [`CallTimeout::Unbounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTimeout {
    /// Fail the call once the duration has elapsed.
    Bounded(Duration),
    /// Wait as long as the remote side needs.
    Unbounded,
}

impl CallTimeout {
    /// Returns the bound, or `None` for unbounded calls.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            CallTimeout::Bounded(d) => Some(*d),
            CallTimeout::Unbounded => None,
        }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, CallTimeout::Bounded(_))
    }
}

impl Default for CallTimeout {
    fn default() -> Self {
        CallTimeout::Bounded(DEFAULT_CALL_TIMEOUT)
    }
}

impl std::fmt::Display for CallTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallTimeout::Bounded(d) => write!(f, "{}ms", d.as_millis()),
            CallTimeout::Unbounded => write!(f, "unbounded"),
        }
    }
}
