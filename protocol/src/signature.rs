use serde::Deserialize;
use serde::Serialize;

/// One signature template the agent can append to a public reply. The body
/// is rendered read-only below the editable content and referenced in the
/// submission payload by `id` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureTemplate {
    pub id: String,
    pub name: String,
    pub body: String,
}
