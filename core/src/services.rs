//! Collaborator seams. The composer consumes these as `Arc<dyn ...>`; the
//! embedding application supplies the network-backed implementations, tests
//! supply in-memory fakes.

use async_trait::async_trait;

use replydesk_protocol::PastedImage;
use replydesk_protocol::ShortcutEntry;
use replydesk_protocol::SubmitOutcome;
use replydesk_protocol::TicketId;
use replydesk_protocol::TicketReplyRequest;
use replydesk_protocol::UploadedFile;

use crate::error::Result;

/// Stores one binary payload against a ticket. The composer never retries on
/// its own; implementations must tolerate the caller retrying.
#[async_trait]
pub trait FileUploadService: Send + Sync {
    async fn upload(&self, ticket: &TicketId, image: &PastedImage) -> Result<UploadedFile>;
}

/// Delivers the assembled reply or note to the helpdesk backend.
#[async_trait]
pub trait ReplyService: Send + Sync {
    async fn submit_reply(&self, request: &TicketReplyRequest) -> Result<SubmitOutcome>;
}

/// Read-only source of canned shortcut entries. The composer refetches on
/// demand and never mutates the list.
#[async_trait]
pub trait ShortcutProvider: Send + Sync {
    async fn list_shortcuts(&self) -> Result<Vec<ShortcutEntry>>;
}
