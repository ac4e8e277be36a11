//! Wire and domain types exchanged between the reply composer and its
//! external collaborators (ticket thread view, file-upload service, reply
//! submission service, shortcut list provider).
//!
//! This crate should be restricted to plain serde type definitions; all
//! behavior lives in `replydesk-core`.

mod reply;
mod shortcut;
mod signature;
mod ticket;
mod upload;

pub use reply::AttachmentPayload;
pub use reply::OutboundReply;
pub use reply::RecipientCandidate;
pub use reply::ReplyKind;
pub use reply::ReplyVisibility;
pub use reply::SubmitOutcome;
pub use reply::TicketReplyRequest;
pub use shortcut::ShortcutEntry;
pub use signature::SignatureTemplate;
pub use ticket::TicketContext;
pub use ticket::TicketId;
pub use upload::PastedImage;
pub use upload::UploadedFile;
