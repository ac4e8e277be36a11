use std::sync::mpsc::Sender;

use replydesk_protocol::UploadedFile;

/// Notifications the composer pushes to the embedding surface. Everything
/// that resolves outside the synchronous call that caused it (upload
/// progress, palette visibility, hand-offs) arrives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerEvent {
    /// The shortcut palette opened on a fresh trigger character.
    PaletteOpened,

    /// The shortcut palette closed (selection, dismissal or the trigger
    /// characters were removed).
    PaletteClosed,

    /// An image upload started; `pending` uploads are now outstanding.
    UploadStarted { file_name: String, pending: usize },

    /// An image upload finished and its preview now references the stored
    /// file. `pending` uploads remain outstanding.
    UploadFinished { file: UploadedFile, pending: usize },

    /// An image upload failed or its source could not be resolved; the
    /// offending image, if present, has been removed from the content.
    UploadFailed { file_name: String, reason: String },

    /// Forward mode was selected. The forward flow takes over with this
    /// snapshot of the drafted content.
    ForwardRequested { content: String },

    /// A reply or note was accepted; the surrounding thread view should
    /// refetch the conversation.
    ThreadRefreshRequested,

    /// The reply service rejected the submission. Composer state is intact.
    SubmissionFailed { message: String },
}

/// Clonable handle used to emit [`ComposerEvent`]s. If the receiving side is
/// gone the event is dropped and the failure logged.
#[derive(Clone, Debug)]
pub struct ComposerEventSender {
    tx: Sender<ComposerEvent>,
}

impl ComposerEventSender {
    pub fn new(tx: Sender<ComposerEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: ComposerEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!("failed to send composer event: {e}");
        }
    }
}
