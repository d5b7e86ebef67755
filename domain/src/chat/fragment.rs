//! Chat fragment decoding

use crate::core::error::DomainError;
use serde::Deserialize;

/// One incremental piece of a streamed chat reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFragment {
    pub text: String,
}

#[derive(Deserialize)]
struct FragmentWire {
    #[serde(default)]
    message: Option<String>,
}

impl ChatFragment {
    /// Decode the JSON document carried in a stream item.
    ///
    /// The document is `{"message": "<text>", ...}`. A missing or null
    /// `message` decodes to an empty fragment; anything that is not such an
    /// object is [`DomainError::InvalidFragment`].
    pub fn decode(envelope_message: &str) -> Result<Self, DomainError> {
        let wire: FragmentWire = serde_json::from_str(envelope_message)
            .map_err(|e| DomainError::InvalidFragment(e.to_string()))?;
        Ok(Self {
            text: wire.message.unwrap_or_default(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
