use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComposerErr>;

/// Failure taxonomy of the composer. Validation errors reject the mutation
/// that raised them and leave all composer state untouched; upload and
/// submission errors are terminal for that one operation only.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComposerErr {
    #[error("`{0}` is not a valid email address")]
    InvalidEmailFormat(String),

    #[error("`{0}` is already a recipient")]
    DuplicateRecipient(String),

    #[error("recipient list is limited to {limit} entries")]
    RecipientLimitExceeded { limit: usize },

    #[error("attachment list is limited to {limit} files")]
    AttachmentLimitExceeded { limit: usize },

    #[error("`{0}` is already attached")]
    DuplicateAttachment(String),

    #[error("`{name}` is {size} bytes; the upload ceiling is {limit}")]
    PayloadTooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    #[error("no signature template with id `{0}`")]
    SignatureNotFound(String),

    #[error("image upload failed: {0}")]
    ImageUpload(String),

    #[error("submission failed: {0}")]
    Submission(String),

    #[error("forwards are sent by the forward flow, not the composer")]
    ForwardNotSubmittable,
}
