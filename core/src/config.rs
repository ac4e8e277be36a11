use serde::Deserialize;

/// Limits and knobs for the composer engine. Embedders deserialize this from
/// their own settings layer; every field falls back to the product default.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    /// Maximum entries per recipient set. Cc, Bcc and the Note-mode Notify
    /// list are each capped independently.
    #[serde(default = "default_recipient_cap")]
    pub recipient_cap: usize,

    /// Maximum standalone attachments per reply.
    #[serde(default = "default_attachment_cap")]
    pub attachment_cap: usize,

    /// Character that opens the shortcut palette.
    #[serde(default = "default_palette_trigger")]
    pub palette_trigger: char,

    /// Upper bound in bytes for a single pasted image or staged attachment.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            recipient_cap: default_recipient_cap(),
            attachment_cap: default_attachment_cap(),
            palette_trigger: default_palette_trigger(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_recipient_cap() -> usize {
    3
}

fn default_attachment_cap() -> usize {
    4
}

fn default_palette_trigger() -> char {
    '/'
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
