//! Submit-state guard, preconditions and outbound payload assembly.

use base64::Engine;

use replydesk_protocol::AttachmentPayload;
use replydesk_protocol::OutboundReply;
use replydesk_protocol::ReplyKind;
use replydesk_protocol::ReplyVisibility;
use replydesk_protocol::TicketContext;
use replydesk_protocol::TicketReplyRequest;
use replydesk_utils_html::parse_fragment;
use replydesk_utils_html::plain_text;

use crate::composer::ComposerMode;
use crate::composer::NoteVisibility;
use crate::composer::StagedAttachment;
use crate::image_pipeline::count_image_nodes;
use crate::recipients::RecipientSet;
use crate::signature::NO_SIGNATURE;

/// Submission progress. One submit at a time; a second request while
/// `Submitting` is ignored at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Default)]
pub(crate) struct SubmitGate {
    state: SubmitState,
}

impl SubmitGate {
    /// Move `Idle -> Submitting`. Returns false when a submit is already in
    /// flight, in which case the state is untouched.
    pub(crate) fn try_begin(&mut self) -> bool {
        if self.state == SubmitState::Submitting {
            return false;
        }
        self.state = SubmitState::Submitting;
        true
    }

    pub(crate) fn finish(&mut self) {
        self.state = SubmitState::Idle;
    }

    pub(crate) fn is_submitting(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    pub(crate) fn state(&self) -> SubmitState {
        self.state
    }
}

/// Blank content turns submit into a silent no-op: nothing in the
/// plain-text projection once trimmed, and no embedded images.
pub(crate) fn content_is_blank(markup: &str) -> bool {
    let nodes = parse_fragment(markup);
    plain_text(&nodes).trim().is_empty() && count_image_nodes(&nodes) == 0
}

pub(crate) struct AssembleInput<'a> {
    pub ticket: &'a TicketContext,
    pub mode: ComposerMode,
    pub note_visibility: NoteVisibility,
    /// Finalized content; every image already in canonical form.
    pub message: String,
    pub cc: &'a RecipientSet,
    pub bcc: &'a RecipientSet,
    pub notify: &'a RecipientSet,
    pub signature_key: &'a str,
    pub attachments: &'a [StagedAttachment],
    pub status_key: &'a str,
}

/// Build the request the reply service expects. In Note mode the Notify
/// list replaces Cc/Bcc and the signature is always `"none"`; `to` is the
/// ticket requester in both modes.
pub(crate) fn assemble_request(input: AssembleInput<'_>) -> TicketReplyRequest {
    let is_note = matches!(input.mode, ComposerMode::Note);
    let visibility = match (is_note, input.note_visibility) {
        (true, NoteVisibility::Private) => ReplyVisibility::Private,
        _ => ReplyVisibility::Public,
    };
    let reply = OutboundReply {
        visibility,
        is_reply: if is_note {
            ReplyKind::Note
        } else {
            ReplyKind::Reply
        },
        to: input.ticket.requester_email.clone(),
        cc: if is_note { Vec::new() } else { input.cc.emails() },
        bcc: if is_note { Vec::new() } else { input.bcc.emails() },
        message: input.message,
        signature_key: if is_note {
            NO_SIGNATURE.to_string()
        } else {
            input.signature_key.to_string()
        },
        attachments: input.attachments.iter().map(encode_attachment).collect(),
        note: if is_note {
            input.notify.entries().to_vec()
        } else {
            Vec::new()
        },
        status_key: input.status_key.to_string(),
    };
    TicketReplyRequest {
        ticket: input.ticket.id.clone(),
        reply,
    }
}

fn encode_attachment(attachment: &StagedAttachment) -> AttachmentPayload {
    AttachmentPayload {
        filename: attachment.name.clone(),
        base64_data: base64::engine::general_purpose::STANDARD.encode(&attachment.bytes),
    }
}
