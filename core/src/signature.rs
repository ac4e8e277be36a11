use replydesk_protocol::SignatureTemplate;

use crate::error::ComposerErr;
use crate::error::Result;

/// Sentinel id meaning "no signature selected".
pub const NO_SIGNATURE: &str = "none";

/// Holds the signature templates offered by the surrounding app and the one
/// currently selected. The rendered block is display-only state for the
/// read-only region under the editor; it is rebuilt wholesale on every
/// change and never patched, so stale fragments cannot linger.
#[derive(Debug, Clone, Default)]
pub struct SignatureInjector {
    templates: Vec<SignatureTemplate>,
    selected: Option<String>,
    rendered: String,
}

impl SignatureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the available templates. A selection that no longer exists is
    /// cleared; one that still exists is re-rendered from the new body.
    pub fn set_templates(&mut self, templates: Vec<SignatureTemplate>) {
        self.templates = templates;
        if let Some(id) = self.selected.clone() {
            match self.template_body(&id) {
                Some(body) => self.rendered = body,
                None => self.clear(),
            }
        }
    }

    /// Select a template by id, or [`NO_SIGNATURE`] to clear. An unknown id
    /// fails with the current selection and rendering untouched.
    pub fn select(&mut self, id: &str) -> Result<()> {
        if id == NO_SIGNATURE {
            self.clear();
            return Ok(());
        }
        let Some(body) = self.template_body(id) else {
            return Err(ComposerErr::SignatureNotFound(id.to_string()));
        };
        self.selected = Some(id.to_string());
        self.rendered = body;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.rendered.clear();
    }

    /// Key submitted as `signatureKey`; [`NO_SIGNATURE`] when nothing is
    /// selected.
    pub fn selected_key(&self) -> &str {
        self.selected.as_deref().unwrap_or(NO_SIGNATURE)
    }

    pub fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    /// The rendered read-only block. Display-only: it is never merged into
    /// the drafted content and never travels in the payload.
    pub fn rendered_block(&self) -> &str {
        &self.rendered
    }

    pub fn templates(&self) -> &[SignatureTemplate] {
        &self.templates
    }

    fn template_body(&self, id: &str) -> Option<String> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.body.clone())
    }
}
