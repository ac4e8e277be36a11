//! The composer engine: one long-lived value per open ticket thread that
//! owns the draft, the mode machine, recipients, signature selection, the
//! shortcut palette and the submit flow.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use replydesk_protocol::PastedImage;
use replydesk_protocol::RecipientCandidate;
use replydesk_protocol::ShortcutEntry;
use replydesk_protocol::SignatureTemplate;
use replydesk_protocol::TicketContext;
use replydesk_protocol::TicketId;
use replydesk_protocol::UploadedFile;
use replydesk_utils_html::parse_fragment;
use replydesk_utils_html::plain_text;
use replydesk_utils_html::serialize;

use crate::config::ComposerConfig;
use crate::error::ComposerErr;
use crate::error::Result;
use crate::events::ComposerEvent;
use crate::events::ComposerEventSender;
use crate::image_pipeline::canonical_src;
use crate::image_pipeline::content_digest;
use crate::image_pipeline::count_image_nodes;
use crate::image_pipeline::finalize_content;
use crate::image_pipeline::preview_data_url;
use crate::image_pipeline::remove_first_image;
use crate::image_pipeline::rewrite_first_image;
use crate::recipients::RecipientSet;
use crate::services::FileUploadService;
use crate::services::ReplyService;
use crate::services::ShortcutProvider;
use crate::shortcuts::ShortcutPalette;
use crate::shortcuts::ShortcutTrigger;
use crate::signature::SignatureInjector;
use crate::submission::AssembleInput;
use crate::submission::SubmitGate;
use crate::submission::SubmitState;
use crate::submission::assemble_request;
use crate::submission::content_is_blank;

/// What the composer is about to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerMode {
    /// Customer-facing email reply. To/Cc/Bcc apply.
    Reply,
    /// Internal note on the thread. The Notify list replaces To/Cc/Bcc.
    Note,
    /// Hand-off state: forwards are composed and sent by a separate flow.
    Forward,
}

/// Visibility of a Note. Private notes are readable by agents only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteVisibility {
    #[default]
    Public,
    Private,
}

/// How Note mode was entered. The note shortcut defaults to a private
/// note; picking Note in the mode selector defaults to public.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEntry {
    Manual,
    Shortcut,
}

/// One standalone file staged for submission; encoded at assembly time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAttachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StagedAttachment {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// The single draft value behind the editor surface. `cursor` is a byte
/// offset into `markup`, kept on a char boundary. All mutation goes through
/// the [`Composer`], which is the one writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    markup: String,
    cursor: usize,
}

impl Draft {
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn set_markup(&mut self, markup: String) {
        self.cursor = markup.len();
        self.markup = markup;
    }

    /// Swap the markup wholesale, placing the cursor at `cursor`.
    pub(crate) fn replace_markup(&mut self, markup: String, cursor: usize) {
        self.markup = markup;
        self.cursor = clamp_to_char_boundary(&self.markup, cursor);
    }

    pub(crate) fn set_cursor(&mut self, pos: usize) {
        self.cursor = clamp_to_char_boundary(&self.markup, pos);
    }

    pub(crate) fn insert(&mut self, s: &str) {
        let at = clamp_to_char_boundary(&self.markup, self.cursor);
        self.markup.insert_str(at, s);
        self.cursor = at + s.len();
    }

    pub(crate) fn clear(&mut self) {
        self.markup.clear();
        self.cursor = 0;
    }
}

fn clamp_to_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Map a byte cursor across an in-place rewrite of the markup. Positions
/// inside the unchanged prefix stay put, positions at or past the edited
/// span shift with the length delta, and a cursor inside the span lands at
/// the span's end.
fn shifted_cursor(old: &str, new: &str, cursor: usize) -> usize {
    let prefix = old
        .bytes()
        .zip(new.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    let limit = old.len().min(new.len()) - prefix;
    let suffix = old
        .bytes()
        .rev()
        .zip(new.bytes().rev())
        .take_while(|(a, b)| a == b)
        .count()
        .min(limit);
    if cursor <= prefix {
        cursor
    } else if cursor >= old.len() - suffix {
        new.len() - suffix + (cursor - (old.len() - suffix))
    } else {
        new.len() - suffix
    }
}

/// One accepted pasted file whose local preview is already in the draft.
/// Awaiting [`PendingImageUpload::upload`] borrows nothing from the
/// composer, so the host keeps routing edits while the request runs.
pub struct PendingImageUpload {
    uploader: Arc<dyn FileUploadService>,
    ticket: TicketId,
    image: PastedImage,
    preview_src: String,
    generation: u64,
}

impl PendingImageUpload {
    pub fn file_name(&self) -> &str {
        &self.image.file_name
    }

    /// Run the upload and package the outcome for
    /// [`Composer::resolve_image_upload`].
    pub async fn upload(self) -> ImageUploadResolution {
        let outcome = self.uploader.upload(&self.ticket, &self.image).await;
        ImageUploadResolution {
            outcome,
            file_name: self.image.file_name,
            preview_src: self.preview_src,
            generation: self.generation,
        }
    }
}

/// Finished upload attempt waiting to be applied to the draft.
pub struct ImageUploadResolution {
    outcome: Result<UploadedFile>,
    file_name: String,
    preview_src: String,
    generation: u64,
}

pub struct Composer {
    config: ComposerConfig,
    ticket: TicketContext,
    draft: Draft,
    mode: ComposerMode,
    note_visibility: NoteVisibility,
    cc: RecipientSet,
    bcc: RecipientSet,
    notify: RecipientSet,
    signature: SignatureInjector,
    trigger: ShortcutTrigger,
    palette: ShortcutPalette,
    attachments: Vec<StagedAttachment>,
    status_key: String,
    gate: SubmitGate,
    pending_uploads: usize,
    // Reset/discard invalidates in-flight resolutions; unmount kills them.
    generation: u64,
    alive: Arc<AtomicBool>,
    events: ComposerEventSender,
    uploader: Arc<dyn FileUploadService>,
    replies: Arc<dyn ReplyService>,
    shortcuts: Arc<dyn ShortcutProvider>,
}

impl Composer {
    pub fn new(
        config: ComposerConfig,
        ticket: TicketContext,
        uploader: Arc<dyn FileUploadService>,
        replies: Arc<dyn ReplyService>,
        shortcuts: Arc<dyn ShortcutProvider>,
        events: ComposerEventSender,
    ) -> Self {
        let status_key = ticket.status_key.clone();
        Self {
            cc: RecipientSet::new(config.recipient_cap),
            bcc: RecipientSet::new(config.recipient_cap),
            notify: RecipientSet::new(config.recipient_cap),
            trigger: ShortcutTrigger::new(config.palette_trigger),
            palette: ShortcutPalette::new(),
            config,
            ticket,
            draft: Draft::default(),
            mode: ComposerMode::Reply,
            note_visibility: NoteVisibility::default(),
            signature: SignatureInjector::new(),
            attachments: Vec::new(),
            status_key,
            gate: SubmitGate::default(),
            pending_uploads: 0,
            generation: 0,
            alive: Arc::new(AtomicBool::new(true)),
            events,
            uploader,
            replies,
            shortcuts,
        }
    }

    // ---- draft -----------------------------------------------------------

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn content(&self) -> &str {
        self.draft.markup()
    }

    /// Replace the whole draft (editor pushed a fresh value). The cursor
    /// lands at the end.
    pub fn set_content(&mut self, markup: impl Into<String>) {
        self.draft.set_markup(markup.into());
        self.sync_shortcut_palette();
    }

    pub fn insert_at_cursor(&mut self, markup: &str) {
        self.draft.insert(markup);
        self.sync_shortcut_palette();
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.draft.set_cursor(pos);
    }

    // ---- mode machine ----------------------------------------------------

    pub fn mode(&self) -> ComposerMode {
        self.mode
    }

    pub fn note_visibility(&self) -> NoteVisibility {
        self.note_visibility
    }

    /// Switch modes. The draft always survives the switch. Selecting
    /// Forward hands the current content to the external forward flow.
    pub fn select_mode(&mut self, mode: ComposerMode) {
        match mode {
            ComposerMode::Reply => self.mode = ComposerMode::Reply,
            ComposerMode::Note => self.enter_note_mode(NoteEntry::Manual),
            ComposerMode::Forward => {
                self.mode = ComposerMode::Forward;
                self.events.send(ComposerEvent::ForwardRequested {
                    content: self.draft.markup().to_string(),
                });
            }
        }
    }

    pub fn enter_note_mode(&mut self, entry: NoteEntry) {
        self.note_visibility = match entry {
            NoteEntry::Manual => NoteVisibility::Public,
            NoteEntry::Shortcut => NoteVisibility::Private,
        };
        self.mode = ComposerMode::Note;
    }

    pub fn set_note_visibility(&mut self, visibility: NoteVisibility) {
        self.note_visibility = visibility;
    }

    /// Entry point for the thread view's "forward this message" action:
    /// open already in Forward mode with prefilled content. No hand-off
    /// event fires; the caller is the forward flow.
    pub fn open_in_forward_mode(&mut self, content: impl Into<String>) {
        self.draft.set_markup(content.into());
        self.mode = ComposerMode::Forward;
        self.sync_shortcut_palette();
    }

    // ---- recipients ------------------------------------------------------

    pub fn cc(&self) -> &RecipientSet {
        &self.cc
    }

    pub fn bcc(&self) -> &RecipientSet {
        &self.bcc
    }

    pub fn notify(&self) -> &RecipientSet {
        &self.notify
    }

    pub fn add_cc(&mut self, candidate: RecipientCandidate) -> Result<()> {
        self.cc.add(candidate)
    }

    pub fn add_bcc(&mut self, candidate: RecipientCandidate) -> Result<()> {
        self.bcc.add(candidate)
    }

    pub fn add_notify(&mut self, candidate: RecipientCandidate) -> Result<()> {
        self.notify.add(candidate)
    }

    pub fn remove_cc(&mut self, index: usize) {
        self.cc.remove(index);
    }

    pub fn remove_bcc(&mut self, index: usize) {
        self.bcc.remove(index);
    }

    pub fn remove_notify(&mut self, index: usize) {
        self.notify.remove(index);
    }

    // ---- signature -------------------------------------------------------

    pub fn signature(&self) -> &SignatureInjector {
        &self.signature
    }

    pub fn set_signature_templates(&mut self, templates: Vec<SignatureTemplate>) {
        self.signature.set_templates(templates);
    }

    pub fn select_signature(&mut self, id: &str) -> Result<()> {
        self.signature.select(id)
    }

    /// The signature badge only counts as active in Reply mode; a Note
    /// never attaches a signature.
    pub fn signature_badge_active(&self) -> bool {
        matches!(self.mode, ComposerMode::Reply) && self.signature.has_selection()
    }

    // ---- shortcut palette ------------------------------------------------

    /// Refetch the shortcut list from the provider. Called by the surface
    /// whenever the palette opens.
    pub async fn refresh_shortcuts(&mut self) -> Result<()> {
        let entries = self.shortcuts.list_shortcuts().await?;
        if self.alive.load(Ordering::Relaxed) {
            self.palette.set_entries(entries);
        }
        Ok(())
    }

    pub fn is_palette_open(&self) -> bool {
        self.trigger.is_open()
    }

    pub fn palette(&self) -> &ShortcutPalette {
        &self.palette
    }

    pub fn palette_move_up(&mut self) {
        self.palette.move_up();
    }

    pub fn palette_move_down(&mut self) {
        self.palette.move_down();
    }

    /// Close the palette without selecting. The latch holds: the palette
    /// will not reopen until every trigger character is removed and a
    /// fresh one typed.
    pub fn dismiss_palette(&mut self) {
        if self.trigger.is_open() {
            self.trigger.dismiss();
            self.events.send(ComposerEvent::PaletteClosed);
        }
    }

    /// Insert the selected entry's message at the cursor and close the
    /// palette for this cycle.
    pub fn select_shortcut(&mut self) -> Option<ShortcutEntry> {
        if !self.is_palette_open() {
            return None;
        }
        let entry = self.palette.selected_entry()?.clone();
        self.insert_at_cursor(&entry.message);
        self.dismiss_palette();
        Some(entry)
    }

    fn sync_shortcut_palette(&mut self) {
        let was_open = self.trigger.is_open();
        let plain = plain_text(&parse_fragment(self.draft.markup()));
        self.trigger.sync(&plain);
        self.palette
            .on_content_text_change(&plain, self.trigger.trigger_char());
        match (was_open, self.trigger.is_open()) {
            (false, true) => self.events.send(ComposerEvent::PaletteOpened),
            (true, false) => self.events.send(ComposerEvent::PaletteClosed),
            _ => {}
        }
    }

    // ---- attachments -----------------------------------------------------

    pub fn attachments(&self) -> &[StagedAttachment] {
        &self.attachments
    }

    /// Stage a standalone file. All checks run before any mutation, so a
    /// rejected attach leaves the staging list as it was.
    pub fn attach_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let name = name.into();
        if bytes.len() > self.config.max_upload_bytes {
            return Err(ComposerErr::PayloadTooLarge {
                name,
                size: bytes.len(),
                limit: self.config.max_upload_bytes,
            });
        }
        if self.attachments.iter().any(|a| a.name == name) {
            return Err(ComposerErr::DuplicateAttachment(name));
        }
        if self.attachments.len() >= self.config.attachment_cap {
            return Err(ComposerErr::AttachmentLimitExceeded {
                limit: self.config.attachment_cap,
            });
        }
        self.attachments.push(StagedAttachment { name, bytes });
        Ok(())
    }

    /// Remove by position. Out-of-range indices are a no-op.
    pub fn remove_attachment(&mut self, index: usize) {
        if index < self.attachments.len() {
            self.attachments.remove(index);
        }
    }

    // ---- status ----------------------------------------------------------

    pub fn status_key(&self) -> &str {
        &self.status_key
    }

    /// Status the ticket moves to on submit; defaults to its current one.
    pub fn set_status_key(&mut self, key: impl Into<String>) {
        self.status_key = key.into();
    }

    // ---- images ----------------------------------------------------------

    pub fn pending_uploads(&self) -> usize {
        self.pending_uploads
    }

    pub fn inline_image_count(&self) -> usize {
        count_image_nodes(&parse_fragment(self.draft.markup()))
    }

    /// Stage a paste/drop of image files. Each distinct file (identical
    /// bytes within one batch are hashed away) gets a local preview
    /// inserted at the cursor in paste order; oversized payloads are
    /// rejected up front. One pending handle per accepted file comes back:
    /// the host awaits each handle and feeds the result to
    /// [`Self::resolve_image_upload`], editing the draft freely in between.
    pub fn begin_image_paste(&mut self, images: Vec<PastedImage>) -> Vec<PendingImageUpload> {
        let mut seen: HashSet<[u8; 32]> = HashSet::new();
        let mut staged = Vec::new();
        for image in images {
            if !seen.insert(content_digest(&image.bytes)) {
                tracing::debug!("skipping duplicate pasted file {}", image.file_name);
                continue;
            }
            if image.bytes.len() > self.config.max_upload_bytes {
                self.events.send(ComposerEvent::UploadFailed {
                    file_name: image.file_name.clone(),
                    reason: format!(
                        "file is {} bytes; the upload ceiling is {}",
                        image.bytes.len(),
                        self.config.max_upload_bytes
                    ),
                });
                continue;
            }

            let preview = preview_data_url(&image.mime_type, &image.bytes);
            self.insert_at_cursor(&format!("<img src=\"{preview}\">"));
            self.pending_uploads += 1;
            self.events.send(ComposerEvent::UploadStarted {
                file_name: image.file_name.clone(),
                pending: self.pending_uploads,
            });
            staged.push(PendingImageUpload {
                uploader: Arc::clone(&self.uploader),
                ticket: self.ticket.id.clone(),
                image,
                preview_src: preview,
                generation: self.generation,
            });
        }
        staged
    }

    /// Apply a finished upload: rewrite its preview in place to the
    /// canonical reference, or remove the preview and report the failure.
    /// Resolutions staged before a discard or unmount are no-ops.
    pub fn resolve_image_upload(&mut self, resolution: ImageUploadResolution) {
        if !self.still_current(resolution.generation) {
            return;
        }
        self.pending_uploads -= 1;
        match resolution.outcome {
            Ok(file) => {
                self.replace_image_src(&resolution.preview_src, &canonical_src(&file.signature));
                self.events.send(ComposerEvent::UploadFinished {
                    file,
                    pending: self.pending_uploads,
                });
            }
            Err(e) => {
                tracing::warn!("upload of {} failed: {e}", resolution.file_name);
                self.drop_image(&resolution.preview_src);
                self.events.send(ComposerEvent::UploadFailed {
                    file_name: resolution.file_name,
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Drive a whole paste cycle in one call, awaiting the uploads one at
    /// a time. Interactive surfaces call [`Self::begin_image_paste`] and
    /// [`Self::resolve_image_upload`] around their own awaits instead.
    pub async fn paste_images(&mut self, images: Vec<PastedImage>) {
        for pending in self.begin_image_paste(images) {
            let resolution = pending.upload().await;
            self.resolve_image_upload(resolution);
        }
    }

    fn replace_image_src(&mut self, from: &str, to: &str) {
        let mut nodes = parse_fragment(self.draft.markup());
        if rewrite_first_image(&mut nodes, from, to) {
            self.set_markup_preserving_cursor(serialize(&nodes));
        } else {
            tracing::debug!("image preview vanished before its upload resolved");
        }
    }

    fn drop_image(&mut self, src: &str) {
        let mut nodes = parse_fragment(self.draft.markup());
        if remove_first_image(&mut nodes, src) {
            self.set_markup_preserving_cursor(serialize(&nodes));
        }
    }

    fn set_markup_preserving_cursor(&mut self, markup: String) {
        let cursor = shifted_cursor(self.draft.markup(), &markup, self.draft.cursor());
        self.draft.replace_markup(markup, cursor);
        self.sync_shortcut_palette();
    }

    // ---- submit ----------------------------------------------------------

    pub fn submit_state(&self) -> SubmitState {
        self.gate.state()
    }

    pub fn is_submitting(&self) -> bool {
        self.gate.is_submitting()
    }

    /// Send the drafted reply or note. Blank content and re-entrant calls
    /// are silent no-ops; Forward mode is rejected. On acceptance the
    /// composer resets to defaults and asks the thread view to refetch; on
    /// rejection every piece of state is preserved.
    pub async fn submit(&mut self) -> Result<()> {
        if matches!(self.mode, ComposerMode::Forward) {
            return Err(ComposerErr::ForwardNotSubmittable);
        }
        if content_is_blank(self.draft.markup()) {
            tracing::debug!("ignoring submit of blank content");
            return Ok(());
        }
        if !self.gate.try_begin() {
            tracing::debug!("ignoring submit while another is in flight");
            return Ok(());
        }

        let generation = self.generation;
        let snapshot = self.draft.markup().to_string();
        let message = finalize_content(
            &snapshot,
            &self.ticket.id,
            self.uploader.as_ref(),
            &self.events,
        )
        .await;
        if !self.still_current(generation) {
            self.gate.finish();
            return Ok(());
        }

        let request = assemble_request(AssembleInput {
            ticket: &self.ticket,
            mode: self.mode,
            note_visibility: self.note_visibility,
            message,
            cc: &self.cc,
            bcc: &self.bcc,
            notify: &self.notify,
            signature_key: self.signature.selected_key(),
            attachments: &self.attachments,
            status_key: &self.status_key,
        });
        let outcome = self.replies.submit_reply(&request).await;
        self.gate.finish();
        if !self.still_current(generation) {
            return Ok(());
        }

        match outcome {
            Ok(outcome) if outcome.success => {
                self.reset_to_defaults();
                self.events.send(ComposerEvent::ThreadRefreshRequested);
                Ok(())
            }
            Ok(outcome) => {
                let message = outcome
                    .message
                    .unwrap_or_else(|| "the reply service rejected the submission".to_string());
                self.events.send(ComposerEvent::SubmissionFailed {
                    message: message.clone(),
                });
                Err(ComposerErr::Submission(message))
            }
            Err(e) => {
                self.events.send(ComposerEvent::SubmissionFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // ---- lifecycle -------------------------------------------------------

    /// Throw the draft away and return to a fresh Reply composer. Any
    /// in-flight upload or submit resolution is invalidated.
    pub fn discard(&mut self) {
        tracing::debug!("discarding draft for ticket {}", self.ticket.id);
        self.reset_to_defaults();
    }

    /// Clonable liveness flag. The embedding flips it on unmount so a
    /// still-running upload or submit resolution becomes a no-op.
    pub fn liveness(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.alive)
    }

    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    fn still_current(&self, generation: u64) -> bool {
        self.is_alive() && self.generation == generation
    }

    fn reset_to_defaults(&mut self) {
        self.generation += 1;
        self.draft.clear();
        self.mode = ComposerMode::Reply;
        self.note_visibility = NoteVisibility::default();
        self.cc.clear();
        self.bcc.clear();
        self.notify.clear();
        self.signature.clear();
        self.attachments.clear();
        self.status_key = self.ticket.status_key.clone();
        self.pending_uploads = 0;
        self.sync_shortcut_palette();
    }
}
