use serde::Deserialize;
use serde::Serialize;

/// Reusable text snippet insertable into the composer via the slash palette.
/// The provider's wire format names the fields `shortcut` and `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutEntry {
    #[serde(rename = "shortcut")]
    pub name: String,
    #[serde(rename = "text")]
    pub message: String,
}
