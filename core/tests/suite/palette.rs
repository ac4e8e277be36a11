#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use pretty_assertions::assert_eq;

use replydesk_core::ComposerEvent;

use super::fixtures::TestComposer;
use super::fixtures::test_composer;

#[tokio::test]
async fn trigger_opens_filters_and_inserts() -> Result<()> {
    let mut t = test_composer();
    t.composer.refresh_shortcuts().await?;
    t.composer.set_content("<p>Let me check. /re</p>");

    assert!(t.composer.is_palette_open());
    let names: Vec<&str> = t
        .composer
        .palette()
        .filtered_entries()
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, vec!["refund"]);

    let entry = t.composer.select_shortcut().expect("entry selected");
    assert_eq!(entry.name, "refund");
    assert!(
        t.composer
            .content()
            .contains("We have issued a full refund.")
    );
    assert!(!t.composer.is_palette_open());
    assert_eq!(
        t.drain_events(),
        vec![ComposerEvent::PaletteOpened, ComposerEvent::PaletteClosed]
    );
    Ok(())
}

#[tokio::test]
async fn dismissal_holds_until_the_trigger_is_removed() -> Result<()> {
    let mut t = test_composer();
    t.composer.refresh_shortcuts().await?;
    t.composer.set_content("<p>/</p>");
    assert!(t.composer.is_palette_open());

    t.composer.dismiss_palette();
    assert!(!t.composer.is_palette_open());

    // Editing around the surviving trigger does not reopen.
    t.composer.set_content("<p>/gr more words</p>");
    assert!(!t.composer.is_palette_open());

    // Clearing the trigger and typing a new one starts a fresh cycle.
    t.composer.set_content("<p>done</p>");
    t.composer.set_content("<p>done /</p>");
    assert!(t.composer.is_palette_open());
    assert_eq!(
        t.drain_events(),
        vec![
            ComposerEvent::PaletteOpened,
            ComposerEvent::PaletteClosed,
            ComposerEvent::PaletteOpened,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn selection_wraps_in_both_directions() -> Result<()> {
    let mut t = test_composer();
    t.composer.refresh_shortcuts().await?;
    t.composer.set_content("<p>/</p>");

    let selected = |t: &TestComposer| {
        t.composer
            .palette()
            .selected_entry()
            .map(|entry| entry.name.clone())
    };

    assert_eq!(selected(&t), Some("greeting".to_string()));
    t.composer.palette_move_up();
    assert_eq!(selected(&t), Some("refund".to_string()));
    t.composer.palette_move_down();
    assert_eq!(selected(&t), Some("greeting".to_string()));
    t.composer.palette_move_down();
    assert_eq!(selected(&t), Some("refund".to_string()));
    Ok(())
}

#[tokio::test]
async fn selecting_without_an_open_palette_is_a_no_op() -> Result<()> {
    let mut t = test_composer();
    t.composer.refresh_shortcuts().await?;
    t.composer.set_content("<p>no trigger here</p>");

    assert_eq!(t.composer.select_shortcut(), None);
    assert_eq!(t.composer.content(), "<p>no trigger here</p>");
    Ok(())
}
