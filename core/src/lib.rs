//! Root of the `replydesk-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the embedding surface or the tracing
// stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod composer;
pub use composer::Composer;
pub use composer::ComposerMode;
pub use composer::Draft;
pub use composer::ImageUploadResolution;
pub use composer::NoteEntry;
pub use composer::NoteVisibility;
pub use composer::PendingImageUpload;
pub use composer::StagedAttachment;
pub mod config;
pub use config::ComposerConfig;
pub mod error;
pub use error::ComposerErr;
pub use error::Result;
pub mod events;
pub use events::ComposerEvent;
pub use events::ComposerEventSender;
mod image_pipeline;
pub mod recipients;
pub use recipients::RecipientSet;
pub mod services;
pub use services::FileUploadService;
pub use services::ReplyService;
pub use services::ShortcutProvider;
pub mod shortcuts;
pub use shortcuts::ShortcutPalette;
pub use shortcuts::ShortcutTrigger;
pub mod signature;
pub use signature::NO_SIGNATURE;
pub use signature::SignatureInjector;
mod submission;
pub use submission::SubmitState;
