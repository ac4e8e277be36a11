#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use replydesk_core::ComposerErr;

use super::fixtures::candidate;
use super::fixtures::test_composer;

#[test]
fn fourth_cc_is_rejected_and_the_set_is_unchanged() {
    let mut t = test_composer();
    for email in ["a@x.com", "b@x.com", "c@x.com"] {
        t.composer.add_cc(candidate(email)).unwrap();
    }

    assert_matches!(
        t.composer.add_cc(candidate("d@x.com")),
        Err(ComposerErr::RecipientLimitExceeded { limit: 3 })
    );
    assert_eq!(
        t.composer.cc().emails(),
        vec!["a@x.com", "b@x.com", "c@x.com"]
    );
}

#[test]
fn duplicate_and_malformed_addresses_are_rejected() {
    let mut t = test_composer();
    t.composer.add_cc(candidate("a@x.com")).unwrap();

    assert_matches!(
        t.composer.add_cc(candidate("a@x.com")),
        Err(ComposerErr::DuplicateRecipient(email)) if email == "a@x.com"
    );
    assert_matches!(
        t.composer.add_cc(candidate("not-an-email")),
        Err(ComposerErr::InvalidEmailFormat(_))
    );
    assert_eq!(t.composer.cc().len(), 1);
}

#[test]
fn each_recipient_list_has_its_own_cap() {
    let mut t = test_composer();
    for email in ["a@x.com", "b@x.com", "c@x.com"] {
        t.composer.add_cc(candidate(email)).unwrap();
    }

    t.composer.add_bcc(candidate("hidden@x.com")).unwrap();
    t.composer.add_notify(candidate("teammate@x.com")).unwrap();
    assert_eq!(t.composer.bcc().len(), 1);
    assert_eq!(t.composer.notify().len(), 1);
}

#[test]
fn removing_a_recipient_frees_a_slot() {
    let mut t = test_composer();
    for email in ["a@x.com", "b@x.com", "c@x.com"] {
        t.composer.add_cc(candidate(email)).unwrap();
    }

    t.composer.remove_cc(1);
    t.composer.add_cc(candidate("d@x.com")).unwrap();
    assert_eq!(
        t.composer.cc().emails(),
        vec!["a@x.com", "c@x.com", "d@x.com"]
    );
}
