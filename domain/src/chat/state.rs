//! Chat stream state machine.
//!
//! ```text
//! Idle ──issue chat──▶ Streaming ──clean end──▶ Completed
//!                          │
//!                          └──read error──▶ Failed ──stop call ok──▶ Stopped
//! ```
//!
//! A caller may also stop a stream explicitly, which moves `Streaming`
//! straight to `Stopped`.

/// Where a chat stream is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    Streaming,
    Completed,
    Stopped,
    Failed,
}

impl ChatPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatPhase::Completed | ChatPhase::Stopped | ChatPhase::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatPhase::Idle => "idle",
            ChatPhase::Streaming => "streaming",
            ChatPhase::Completed => "completed",
            ChatPhase::Stopped => "stopped",
            ChatPhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ChatPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient state of one chat stream: accumulated text, phase, last error.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatStreamState {
    phase: ChatPhase,
    text: String,
    fragments: usize,
    last_error: Option<String>,
}

impl Default for ChatStreamState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatStreamState {
    pub fn new() -> Self {
        Self {
            phase: ChatPhase::Idle,
            text: String::new(),
            fragments: 0,
            last_error: None,
        }
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// `Idle → Streaming`. No effect in any other phase.
    pub fn begin(&mut self) {
        if self.phase == ChatPhase::Idle {
            self.phase = ChatPhase::Streaming;
        }
    }

    /// Append a fragment. Ignored once the stream is terminal.
    pub fn push(&mut self, fragment: &str) {
        if self.phase == ChatPhase::Streaming {
            self.text.push_str(fragment);
            self.fragments += 1;
        }
    }

    /// `Streaming → Completed`.
    pub fn complete(&mut self) {
        if self.phase == ChatPhase::Streaming {
            self.phase = ChatPhase::Completed;
        }
    }

    /// `Streaming → Failed`, recording the error.
    pub fn fail(&mut self, error: impl Into<String>) {
        if !self.phase.is_terminal() {
            self.phase = ChatPhase::Failed;
        }
        self.last_error = Some(error.into());
    }

    /// `Failed → Stopped` after a successful stop call, or `Streaming → Stopped`
    /// when the caller cancels.
    pub fn stopped(&mut self) {
        if matches!(self.phase, ChatPhase::Streaming | ChatPhase::Failed) {
            self.phase = ChatPhase::Stopped;
        }
    }
}
