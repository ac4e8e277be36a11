#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use pretty_assertions::assert_eq;

use replydesk_core::ComposerMode;
use replydesk_core::NO_SIGNATURE;
use replydesk_core::NoteEntry;
use replydesk_core::NoteVisibility;
use replydesk_protocol::ReplyKind;
use replydesk_protocol::ReplyVisibility;

use super::fixtures::candidate;
use super::fixtures::signature_template;
use super::fixtures::test_composer;

#[tokio::test]
async fn manual_note_submits_public_with_the_notify_list() -> Result<()> {
    let mut t = test_composer();
    t.composer.add_cc(candidate("cc@x.com"))?;
    t.composer.select_mode(ComposerMode::Note);
    assert_eq!(t.composer.note_visibility(), NoteVisibility::Public);
    t.composer.add_notify(candidate("teammate@x.com"))?;
    t.composer.set_content("<p>internal note</p>");

    t.composer.submit().await?;

    let reply = t.replies.last_request().reply;
    assert_eq!(reply.visibility, ReplyVisibility::Public);
    assert_eq!(reply.is_reply, ReplyKind::Note);
    assert_eq!(reply.to, "dana@customer.example");
    assert!(reply.cc.is_empty());
    assert!(reply.bcc.is_empty());
    assert_eq!(reply.signature_key, NO_SIGNATURE);
    assert_eq!(reply.note, vec![candidate("teammate@x.com")]);
    Ok(())
}

#[tokio::test]
async fn shortcut_note_defaults_to_private() -> Result<()> {
    let mut t = test_composer();
    t.composer.enter_note_mode(NoteEntry::Shortcut);
    assert_eq!(t.composer.note_visibility(), NoteVisibility::Private);
    t.composer.set_content("<p>agents only</p>");

    t.composer.submit().await?;

    assert_eq!(
        t.replies.last_request().reply.visibility,
        ReplyVisibility::Private
    );
    Ok(())
}

#[tokio::test]
async fn toggling_a_private_note_back_to_public_sticks() -> Result<()> {
    let mut t = test_composer();
    t.composer.enter_note_mode(NoteEntry::Shortcut);
    t.composer.set_note_visibility(NoteVisibility::Public);
    t.composer.set_content("<p>shared note</p>");

    t.composer.submit().await?;

    assert_eq!(
        t.replies.last_request().reply.visibility,
        ReplyVisibility::Public
    );
    Ok(())
}

#[tokio::test]
async fn note_mode_suppresses_the_signature() -> Result<()> {
    let mut t = test_composer();
    t.composer
        .set_signature_templates(vec![signature_template("support")]);
    t.composer.select_signature("support")?;
    assert!(t.composer.signature_badge_active());

    t.composer.select_mode(ComposerMode::Note);
    assert!(!t.composer.signature_badge_active());
    t.composer.set_content("<p>note</p>");
    t.composer.submit().await?;

    assert_eq!(t.replies.last_request().reply.signature_key, NO_SIGNATURE);
    Ok(())
}
