use serde::Deserialize;
use serde::Serialize;

use crate::ticket::TicketId;

/// Whether the outgoing message is visible to the ticket requester.
///
/// A Reply is always `Public`; a Note carries whichever visibility the agent
/// toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyVisibility {
    Public,
    Private,
}

/// Wire discriminator between a customer-facing reply and an internal note.
/// The submission service expects the single-letter legacy encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyKind {
    #[serde(rename = "R")]
    Reply,
    #[serde(rename = "N")]
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientCandidate {
    pub name: String,
    pub email: String,
}

/// One standalone (non-inline) attachment, sent inline with the submission
/// rather than through the image upload service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    pub filename: String,
    pub base64_data: String,
}

/// The `reply` object of a ticket reply submission. Field spellings follow
/// the submission service's API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    #[serde(rename = "type")]
    pub visibility: ReplyVisibility,
    #[serde(rename = "isReply")]
    pub is_reply: ReplyKind,
    pub to: String,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    /// Finalized message markup; every embedded image references a server
    /// signature token, never a transient local source.
    pub message: String,
    #[serde(rename = "signatureKey")]
    pub signature_key: String,
    pub attachments: Vec<AttachmentPayload>,
    /// Notify list, populated only for Note submissions.
    pub note: Vec<RecipientCandidate>,
    #[serde(rename = "statusKey")]
    pub status_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReplyRequest {
    pub ticket: TicketId,
    pub reply: OutboundReply,
}

/// Result reported by the reply submission service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
