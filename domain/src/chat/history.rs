//! Chat history returned by the middleware

use serde_json::{Map, Value};

/// One past chat session as reported by the middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSessionSummary {
    pub sid: i64,
    /// Every other field of the entry (`title`, timestamps, ...)
    pub fields: Map<String, Value>,
}

/// Chat history: the raw `data` string plus the sessions that could be read.
///
/// Parsing never fails. The raw payload is always kept; entries without an
/// integer `sid` are skipped and counted, and a payload that is not a JSON
/// array yields no sessions at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatHistory {
    raw: String,
    sessions: Vec<ChatSessionSummary>,
    skipped: usize,
    well_formed: bool,
}

impl ChatHistory {
    /// Read the history payload, expected to be a JSON array of session objects.
    ///
    /// An empty payload is an empty history.
    pub fn parse(data: impl Into<String>) -> Self {
        let raw = data.into();
        if raw.trim().is_empty() {
            return Self {
                raw,
                sessions: Vec::new(),
                skipped: 0,
                well_formed: true,
            };
        }

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            _ => {
                return Self {
                    raw,
                    sessions: Vec::new(),
                    skipped: 0,
                    well_formed: false,
                };
            }
        };

        let total = entries.len();
        let sessions: Vec<ChatSessionSummary> =
            entries.into_iter().filter_map(Self::summary).collect();
        Self {
            raw,
            skipped: total - sessions.len(),
            sessions,
            well_formed: true,
        }
    }

    fn summary(entry: Value) -> Option<ChatSessionSummary> {
        let Value::Object(mut fields) = entry else {
            return None;
        };
        let sid = fields.get("sid").and_then(Value::as_i64)?;
        fields.remove("sid");
        Some(ChatSessionSummary { sid, fields })
    }

    /// The payload exactly as the middleware sent it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn sessions(&self) -> &[ChatSessionSummary] {
        &self.sessions
    }

    pub fn session_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.sessions.iter().map(|s| s.sid)
    }

    pub fn contains(&self, sid: i64) -> bool {
        self.sessions.iter().any(|s| s.sid == sid)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Array entries dropped for lacking an integer `sid`.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether the payload was empty or a JSON array.
    pub fn is_well_formed(&self) -> bool {
        self.well_formed
    }
}
