use replydesk_protocol::ShortcutEntry;

/// Latch that decides when the shortcut palette opens. The first trigger
/// character appearing in the plain-text projection opens the palette
/// exactly once; while latched, further edits never reopen it. Only
/// removing every trigger character clears the latch for the next cycle.
#[derive(Debug, Clone)]
pub struct ShortcutTrigger {
    trigger: char,
    latched: bool,
    dismissed: bool,
}

impl ShortcutTrigger {
    pub fn new(trigger: char) -> Self {
        Self {
            trigger,
            latched: false,
            dismissed: false,
        }
    }

    pub fn trigger_char(&self) -> char {
        self.trigger
    }

    /// Re-evaluate against the current plain-text projection. Called after
    /// every content change.
    pub fn sync(&mut self, plain_text: &str) {
        if plain_text.contains(self.trigger) {
            if !self.latched {
                self.latched = true;
                self.dismissed = false;
            }
        } else {
            self.latched = false;
            self.dismissed = false;
        }
    }

    /// Close the palette for this cycle. The latch holds, so the palette
    /// stays closed until the trigger characters are gone and a fresh one
    /// arrives.
    pub fn dismiss(&mut self) {
        if self.latched {
            self.dismissed = true;
        }
    }

    pub fn is_open(&self) -> bool {
        self.latched && !self.dismissed
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn reset(&mut self) {
        self.latched = false;
        self.dismissed = false;
    }
}

/// Filtered, navigable view over the provider's shortcut entries. The filter
/// is the token following the first trigger character; matching is a
/// case-insensitive prefix comparison on the entry name.
#[derive(Debug, Clone, Default)]
pub struct ShortcutPalette {
    entries: Vec<ShortcutEntry>,
    filter: String,
    selected_idx: Option<usize>,
}

impl ShortcutPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry list with a fresh fetch from the provider.
    pub fn set_entries(&mut self, entries: Vec<ShortcutEntry>) {
        self.entries = entries;
        self.clamp_selection();
    }

    /// Update the filter from the current plain-text projection. Everything
    /// after the first `trigger` up to the next whitespace becomes the
    /// active filter.
    pub fn on_content_text_change(&mut self, plain_text: &str, trigger: char) {
        self.filter = match plain_text.find(trigger) {
            Some(idx) => {
                let after = &plain_text[idx + trigger.len_utf8()..];
                after
                    .trim_start()
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_string()
            }
            None => String::new(),
        };
        self.clamp_selection();
    }

    pub fn filtered_entries(&self) -> Vec<&ShortcutEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                if self.filter.is_empty() {
                    return true;
                }
                let name = entry.name.as_str();
                name.len() >= self.filter.len()
                    && name.is_char_boundary(self.filter.len())
                    && name[..self.filter.len()].eq_ignore_ascii_case(&self.filter)
            })
            .collect()
    }

    /// Move the selection cursor one step up, wrapping at the top.
    pub fn move_up(&mut self) {
        let len = self.filtered_entries().len();
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(idx) => (idx + len - 1) % len,
            None => len - 1,
        });
    }

    /// Move the selection cursor one step down, wrapping at the bottom.
    pub fn move_down(&mut self) {
        let len = self.filtered_entries().len();
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(idx) => (idx + 1) % len,
            None => 0,
        });
    }

    pub fn selected_entry(&self) -> Option<&ShortcutEntry> {
        let filtered = self.filtered_entries();
        self.selected_idx.and_then(|idx| filtered.get(idx).copied())
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_entries().len();
        self.selected_idx = if len == 0 {
            None
        } else {
            Some(self.selected_idx.map_or(0, |idx| idx.min(len - 1)))
        };
    }
}
