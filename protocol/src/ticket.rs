use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

/// Opaque server-issued ticket key. The composer never interprets it; it is
/// carried through upload requests and the final reply payload unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TicketId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The slice of ticket state the composer needs from the surrounding thread
/// view: who the reply goes to and which status the ticket currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketContext {
    pub id: TicketId,
    pub requester_name: String,
    pub requester_email: String,
    /// Current status key of the ticket; the composer starts from it and the
    /// agent may pick a different one before submitting.
    pub status_key: String,
}
