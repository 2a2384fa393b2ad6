/// End-to-end journal scenarios against the in-memory store: register,
/// follow, send, read and block over a full lifecycle.
use std::sync::Arc;

use arigato_core::{Journal, Session};
use arigato_store::MemoryStore;

fn setup(users: &[&str]) -> (Journal, Vec<Session>) {
    let journal = Journal::new(Arc::new(MemoryStore::new()));
    let sessions = users
        .iter()
        .map(|id| journal.register(id, &id.to_uppercase(), "pw").unwrap())
        .collect();
    (journal, sessions)
}

#[test]
fn thank_you_note_arrives_unread_and_is_read_on_open() {
    let (journal, mut s) = setup(&["alice", "bob"]);
    let (left, right) = s.split_at_mut(1);
    let alice = &mut left[0];
    let bob = &mut right[0];

    journal.follow(alice, "bob").unwrap();
    journal
        .send(bob, "alice", "ALICE", "ありがとう！", Default::default())
        .unwrap();

    let received = journal.received_for(alice).unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body, "ありがとう！");
    assert!(!received[0].is_read);
    assert_eq!(journal.unread_count(alice).unwrap(), 1);

    journal.open_received_detail(alice, "bob").unwrap();

    let received = journal.received_for(alice).unwrap();
    assert!(received[0].is_read);
    assert_eq!(journal.unread_count(alice).unwrap(), 0);
}

#[test]
fn blocking_severs_follows_and_removes_the_recipient_option() {
    let (journal, mut s) = setup(&["alice", "bob"]);
    let (left, right) = s.split_at_mut(1);
    let alice = &mut left[0];
    let bob = &mut right[0];

    journal.follow(alice, "bob").unwrap();
    journal.follow(bob, "alice").unwrap();

    journal.block(alice, "bob").unwrap();

    assert!(!alice.user().following.iter().any(|id| id == "bob"));
    let bob_stored = journal.find_user("bob").unwrap().unwrap();
    assert!(!bob_stored.following.iter().any(|id| id == "alice"));

    let recipients = journal.recipients(alice).unwrap();
    assert!(recipients.iter().all(|u| u.user_id != "bob"));
}

#[test]
fn reply_roots_at_the_original_and_quotes_its_author() {
    let (journal, s) = setup(&["alice", "bob"]);
    let (alice, bob) = (&s[0], &s[1]);

    let original = journal
        .send(alice, "bob", "ALICE'S BOB", "thank you for lunch", Default::default())
        .unwrap();

    let thread = journal.open_thread(bob, &original.id).unwrap().unwrap();
    let reply = journal
        .reply_in_thread(bob, &thread, "my pleasure")
        .unwrap();

    assert_eq!(reply.root_id.as_deref(), Some(original.id.as_str()));
    let snippet = reply.reply_to.expect("reply quotes the original");
    assert_eq!(snippet.name, "ALICE");

    // Both ends of the exchange land in the same thread, oldest first.
    let thread = journal.open_thread(alice, &original.id).unwrap().unwrap();
    let ids: Vec<_> = thread.messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, [original.id.as_str(), reply.id.as_str()]);
}

#[test]
fn blocked_messages_disappear_from_timeline_and_inbox() {
    let (journal, mut s) = setup(&["alice", "bob", "carol"]);

    // Bob writes to Carol and to Alice before any block exists.
    journal
        .send(&s[1], "carol", "CAROL", "to carol", Default::default())
        .unwrap();
    journal
        .send(&s[1], "alice", "ALICE", "to alice", Default::default())
        .unwrap();

    let alice = &mut s[0];
    journal.block(alice, "bob").unwrap();

    // Timeline: anything touching Bob is gone, in either direction.
    let timeline = journal.timeline(alice).unwrap();
    assert!(
        timeline
            .iter()
            .all(|m| m.from_id != "bob" && m.to_id != "bob")
    );

    // Inbox: Bob's note to Alice is invisible, not rejected.
    assert!(journal.received_for(alice).unwrap().is_empty());
    assert_eq!(journal.unread_count(alice).unwrap(), 0);
}

#[test]
fn session_survives_a_restart_via_the_persisted_record() {
    let store = Arc::new(MemoryStore::new());
    let journal = Journal::new(store.clone());
    journal.register("alice", "Alice", "pw").unwrap();

    // A fresh journal over the same store picks the session back up.
    let journal = Journal::new(store);
    let resumed = journal.resume().unwrap().expect("persisted session");
    assert_eq!(resumed.user_id(), "alice");
}
