use std::sync::LazyLock;

use regex_lite::Regex;
use replydesk_protocol::RecipientCandidate;

use crate::error::ComposerErr;
use crate::error::Result;

/// Shape check only: something before the `@`, a domain with at least one
/// dot, no whitespace. Deliverability is the backend's problem.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// One ordered recipient list (Cc, Bcc or the Note-mode Notify field).
/// Emails are unique within a set and the set is capped. Every check in
/// [`RecipientSet::add`] runs before any mutation, so a failed add leaves
/// the set exactly as it was.
#[derive(Debug, Clone)]
pub struct RecipientSet {
    cap: usize,
    entries: Vec<RecipientCandidate>,
}

impl RecipientSet {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            entries: Vec::new(),
        }
    }

    /// Append `candidate`, preserving insertion order. Rejections, in the
    /// order they are checked: malformed email, duplicate email, full set.
    pub fn add(&mut self, candidate: RecipientCandidate) -> Result<()> {
        if !EMAIL_SHAPE.is_match(&candidate.email) {
            return Err(ComposerErr::InvalidEmailFormat(candidate.email));
        }
        if self.entries.iter().any(|r| r.email == candidate.email) {
            return Err(ComposerErr::DuplicateRecipient(candidate.email));
        }
        if self.entries.len() >= self.cap {
            return Err(ComposerErr::RecipientLimitExceeded { limit: self.cap });
        }
        self.entries.push(candidate);
        Ok(())
    }

    /// Remove by position. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[RecipientCandidate] {
        &self.entries
    }

    pub fn emails(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.email.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
