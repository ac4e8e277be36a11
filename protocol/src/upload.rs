use serde::Deserialize;
use serde::Serialize;

/// Response of the file-upload service for one uploaded binary payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Opaque server-issued identifier; the canonical in-content reference
    /// becomes `signature;<id>`.
    pub signature: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub size: u64,
}

/// One image handed to the composer by a paste, drop or toolbar insert.
/// Never serialized; the bytes travel to the upload service as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastedImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PastedImage {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}
