#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Recording fakes for the three service seams, plus a harness that wires
//! them into a composer for a fixed test ticket.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc::Receiver;

use async_trait::async_trait;
use sha2::Digest;
use sha2::Sha256;

use replydesk_core::Composer;
use replydesk_core::ComposerConfig;
use replydesk_core::ComposerErr;
use replydesk_core::ComposerEvent;
use replydesk_core::ComposerEventSender;
use replydesk_core::FileUploadService;
use replydesk_core::ReplyService;
use replydesk_core::Result;
use replydesk_core::ShortcutProvider;
use replydesk_protocol::PastedImage;
use replydesk_protocol::RecipientCandidate;
use replydesk_protocol::ShortcutEntry;
use replydesk_protocol::SignatureTemplate;
use replydesk_protocol::SubmitOutcome;
use replydesk_protocol::TicketContext;
use replydesk_protocol::TicketId;
use replydesk_protocol::TicketReplyRequest;
use replydesk_protocol::UploadedFile;

/// Upload stub with content-addressed signatures, so identical bytes always
/// map to the same reference.
pub struct RecordingUploader {
    uploads: Mutex<Vec<String>>,
    fail: AtomicBool,
    kill_switch: Mutex<Option<Arc<AtomicBool>>>,
}

impl RecordingUploader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            uploads: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            kill_switch: Mutex::new(None),
        })
    }

    pub fn fail_uploads(&self) {
        self.fail.store(true, Ordering::Relaxed);
    }

    /// Flip the given liveness flag from inside the next upload call, as if
    /// the composer's surface unmounted while the request was in flight.
    pub fn kill_during_upload(&self, flag: Arc<AtomicBool>) {
        *self.kill_switch.lock().unwrap() = Some(flag);
    }

    pub fn uploaded_file_names(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

/// Signature the stub uploader hands back for these bytes.
pub fn stub_signature(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:02x}{:02x}{:02x}", digest[0], digest[1], digest[2])
}

#[async_trait]
impl FileUploadService for RecordingUploader {
    async fn upload(&self, _ticket: &TicketId, image: &PastedImage) -> Result<UploadedFile> {
        self.uploads.lock().unwrap().push(image.file_name.clone());
        if let Some(flag) = self.kill_switch.lock().unwrap().take() {
            flag.store(false, Ordering::Relaxed);
        }
        if self.fail.load(Ordering::Relaxed) {
            return Err(ComposerErr::ImageUpload(
                "the upload endpoint returned 500".to_string(),
            ));
        }
        Ok(UploadedFile {
            signature: stub_signature(&image.bytes),
            file_name: image.file_name.clone(),
            mime_type: image.mime_type.clone(),
            size: image.bytes.len() as u64,
        })
    }
}

/// Reply stub that records every submission and can be scripted to reject.
pub struct RecordingReplies {
    requests: Mutex<Vec<TicketReplyRequest>>,
    rejection: Mutex<Option<String>>,
    unreachable: AtomicBool,
}

impl RecordingReplies {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            rejection: Mutex::new(None),
            unreachable: AtomicBool::new(false),
        })
    }

    pub fn reject_with(&self, message: &str) {
        *self.rejection.lock().unwrap() = Some(message.to_string());
    }

    pub fn accept(&self) {
        *self.rejection.lock().unwrap() = None;
        self.unreachable.store(false, Ordering::Relaxed);
    }

    pub fn go_unreachable(&self) {
        self.unreachable.store(true, Ordering::Relaxed);
    }

    pub fn requests(&self) -> Vec<TicketReplyRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> TicketReplyRequest {
        self.requests()
            .last()
            .expect("at least one submission recorded")
            .clone()
    }
}

#[async_trait]
impl ReplyService for RecordingReplies {
    async fn submit_reply(&self, request: &TicketReplyRequest) -> Result<SubmitOutcome> {
        self.requests.lock().unwrap().push(request.clone());
        if self.unreachable.load(Ordering::Relaxed) {
            return Err(ComposerErr::Submission(
                "the ticket service is unreachable".to_string(),
            ));
        }
        if let Some(message) = self.rejection.lock().unwrap().clone() {
            return Ok(SubmitOutcome {
                success: false,
                message: Some(message),
            });
        }
        Ok(SubmitOutcome {
            success: true,
            message: None,
        })
    }
}

struct StaticShortcuts(Vec<ShortcutEntry>);

#[async_trait]
impl ShortcutProvider for StaticShortcuts {
    async fn list_shortcuts(&self) -> Result<Vec<ShortcutEntry>> {
        Ok(self.0.clone())
    }
}

pub fn shortcut(name: &str, message: &str) -> ShortcutEntry {
    ShortcutEntry {
        name: name.to_string(),
        message: message.to_string(),
    }
}

pub fn candidate(email: &str) -> RecipientCandidate {
    RecipientCandidate {
        name: String::new(),
        email: email.to_string(),
    }
}

pub fn signature_template(id: &str) -> SignatureTemplate {
    SignatureTemplate {
        id: id.to_string(),
        name: id.to_string(),
        body: format!("<p>-- the {id} team</p>"),
    }
}

pub fn ticket() -> TicketContext {
    TicketContext {
        id: TicketId::new("401"),
        requester_name: "Dana Reyes".to_string(),
        requester_email: "dana@customer.example".to_string(),
        status_key: "open".to_string(),
    }
}

pub fn pasted_png(file_name: &str, seed: u8) -> PastedImage {
    PastedImage::new(file_name, "image/png", vec![seed; 24])
}

/// Composer wired to the recording fakes, plus the event drain.
pub struct TestComposer {
    pub composer: Composer,
    pub uploader: Arc<RecordingUploader>,
    pub replies: Arc<RecordingReplies>,
    pub events: Receiver<ComposerEvent>,
}

impl TestComposer {
    pub fn drain_events(&self) -> Vec<ComposerEvent> {
        self.events.try_iter().collect()
    }
}

pub fn test_composer() -> TestComposer {
    test_composer_with_config(ComposerConfig::default())
}

pub fn test_composer_with_config(config: ComposerConfig) -> TestComposer {
    let (tx, rx) = std::sync::mpsc::channel();
    let uploader = RecordingUploader::new();
    let replies = RecordingReplies::new();
    let composer = Composer::new(
        config,
        ticket(),
        uploader.clone(),
        replies.clone(),
        Arc::new(StaticShortcuts(vec![
            shortcut("greeting", "Hi there!"),
            shortcut("refund", "We have issued a full refund."),
        ])),
        ComposerEventSender::new(tx),
    );
    TestComposer {
        composer,
        uploader,
        replies,
        events: rx,
    }
}
