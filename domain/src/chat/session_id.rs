//! Chat session identifier value object

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identifies one chat exchange on the middleware.
///
/// Random, positive and fresh per chat request so concurrent chats never
/// share server-side state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i32);

impl SessionId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// A random positive id.
    pub fn generate() -> Self {
        Self(rand::thread_rng().gen_range(1..=i32::MAX))
    }

    /// A random positive id that is not in `existing`.
    pub fn generate_excluding<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let taken: std::collections::HashSet<i64> = existing.into_iter().collect();
        loop {
            let candidate = Self::generate();
            if !taken.contains(&i64::from(candidate.0)) {
                return candidate;
            }
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SessionId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}
