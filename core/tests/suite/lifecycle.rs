#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pretty_assertions::assert_eq;

use replydesk_core::ComposerEvent;
use replydesk_core::ComposerMode;
use replydesk_core::SubmitState;

use super::fixtures::pasted_png;
use super::fixtures::test_composer;

#[tokio::test]
async fn shutdown_during_an_upload_freezes_the_draft() {
    let mut t = test_composer();
    t.uploader.kill_during_upload(t.composer.liveness());
    t.composer.set_content("<p>hi</p>");

    t.composer
        .paste_images(vec![pasted_png("shot.png", 4)])
        .await;

    // No rewrite and no removal happened after the flag flipped.
    assert!(t.composer.content().contains("data:image/png;base64,"));
    assert!(!t.composer.is_alive());
    assert_matches!(
        t.drain_events().as_slice(),
        [ComposerEvent::UploadStarted { .. }]
    );
}

#[tokio::test]
async fn shutdown_during_finalization_drops_the_submission() {
    let mut t = test_composer();
    t.uploader.kill_during_upload(t.composer.liveness());
    let encoded = STANDARD.encode([9u8; 8]);
    t.composer
        .set_content(format!("<p>x<img src=\"data:image/png;base64,{encoded}\"></p>"));

    t.composer.submit().await.unwrap();

    assert!(t.replies.requests().is_empty());
    assert!(t.composer.content().contains("data:image"));
    assert_eq!(t.composer.submit_state(), SubmitState::Idle);
}

#[test]
fn discard_returns_a_forward_composer_to_a_fresh_reply() {
    let mut t = test_composer();
    t.composer.open_in_forward_mode("<p>earlier message</p>");

    t.composer.discard();

    assert_eq!(t.composer.mode(), ComposerMode::Reply);
    assert_eq!(t.composer.content(), "");
    assert!(t.composer.is_alive());
}
