use chrono::Utc;
use tracing::debug;

use arigato_types::models::{Message, SendOptions};

use crate::{CoreError, Journal, Result, Session, visibility};

/// Stamp for the next message: wall clock, bumped past the newest existing
/// message so timestamp-derived ids stay unique and monotonic even for
/// sends landing in the same millisecond.
fn next_stamp(log: &[Message]) -> i64 {
    let now = Utc::now().timestamp_millis();
    match log.first() {
        Some(newest) if newest.created_at >= now => newest.created_at + 1,
        _ => now,
    }
}

impl Journal {
    /// Append a note to the log. The recipient name is snapshotted as
    /// given; thread options are copied onto the message verbatim. The new
    /// message is prepended, keeping the log newest-first.
    pub fn send(
        &self,
        session: &Session,
        to_id: &str,
        to_name: &str,
        body: &str,
        options: SendOptions,
    ) -> Result<Message> {
        let body = body.trim();
        if body.is_empty() {
            return Err(CoreError::Validation("message body is required".to_string()));
        }

        let mut log = self.store().load_messages()?;
        let stamp = next_stamp(&log);

        let message = Message {
            id: format!("msg_{stamp}"),
            from_id: session.user_id().to_string(),
            from_name: session.user().name.clone(),
            to_id: to_id.to_string(),
            to_name: to_name.to_string(),
            body: body.to_string(),
            created_at: stamp,
            is_read: false,
            reply_to: options.reply_to,
            root_id: options.root_id,
        };

        log.insert(0, message.clone());
        self.store().replace_messages(&log)?;

        debug!(
            "Stored message {} ({} -> {})",
            message.id, message.from_id, message.to_id
        );
        Ok(message)
    }

    pub fn find_message(&self, message_id: &str) -> Result<Option<Message>> {
        let log = self.store().load_messages()?;
        Ok(log.into_iter().find(|m| m.id == message_id))
    }

    /// Notes addressed to the session, newest first, minus blocked senders.
    pub fn received_for(&self, session: &Session) -> Result<Vec<Message>> {
        let log = self.store().load_messages()?;
        Ok(log
            .into_iter()
            .filter(|m| m.to_id == session.user_id())
            .filter(|m| visibility::inbox_visible(session.user(), m))
            .collect())
    }

    /// Notes authored by the session, newest first.
    pub fn sent_by(&self, session: &Session) -> Result<Vec<Message>> {
        let log = self.store().load_messages()?;
        Ok(log
            .into_iter()
            .filter(|m| m.from_id == session.user_id())
            .collect())
    }

    /// The shared timeline as the session may see it: every note not
    /// touching one of their block edges, newest first.
    pub fn timeline(&self, session: &Session) -> Result<Vec<Message>> {
        let log = self.store().load_messages()?;
        Ok(log
            .into_iter()
            .filter(|m| visibility::timeline_visible(session.user(), m))
            .collect())
    }

    /// Mark every unread note from `from_id` to the session as read, in
    /// one batch with a single persist.
    pub fn mark_read(&self, session: &Session, from_id: &str) -> Result<()> {
        let mut log = self.store().load_messages()?;
        let mut updated = false;

        for m in log.iter_mut() {
            if m.to_id == session.user_id() && m.from_id == from_id && !m.is_read {
                m.is_read = true;
                updated = true;
            }
        }

        if updated {
            self.store().replace_messages(&log)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arigato_store::MemoryStore;

    use crate::{CoreError, Journal, Session};

    fn journal_with(users: &[&str]) -> (Journal, Vec<Session>) {
        let journal = Journal::new(Arc::new(MemoryStore::new()));
        let sessions = users
            .iter()
            .map(|id| journal.register(id, &id.to_uppercase(), "pw").unwrap())
            .collect();
        (journal, sessions)
    }

    #[test]
    fn send_prepends_and_ids_stay_unique() {
        let (journal, s) = journal_with(&["alice", "bob"]);
        let alice = &s[0];

        let first = journal
            .send(alice, "bob", "BOB", "thanks once", Default::default())
            .unwrap();
        let second = journal
            .send(alice, "bob", "BOB", "thanks twice", Default::default())
            .unwrap();

        // Same-millisecond sends still get distinct, increasing stamps.
        assert_ne!(first.id, second.id);
        assert!(second.created_at > first.created_at);

        let log = journal.sent_by(alice).unwrap();
        let ids: Vec<_> = log.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);
    }

    #[test]
    fn empty_body_is_rejected() {
        let (journal, s) = journal_with(&["alice", "bob"]);
        let err = journal
            .send(&s[0], "bob", "BOB", "   ", Default::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(journal.sent_by(&s[0]).unwrap().is_empty());
    }

    #[test]
    fn received_excludes_blocked_senders() {
        let (journal, mut s) = journal_with(&["alice", "bob", "carol"]);

        journal
            .send(&s[1], "alice", "ALICE", "from bob", Default::default())
            .unwrap();
        journal
            .send(&s[2], "alice", "ALICE", "from carol", Default::default())
            .unwrap();

        let alice = &mut s[0];
        journal.block(alice, "carol").unwrap();

        let received = journal.received_for(alice).unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].from_id, "bob");
    }

    #[test]
    fn mark_read_roundtrip() {
        let (journal, mut s) = journal_with(&["alice", "bob"]);

        journal
            .send(&s[1], "alice", "ALICE", "one", Default::default())
            .unwrap();
        journal
            .send(&s[1], "alice", "ALICE", "two", Default::default())
            .unwrap();

        let alice = &mut s[0];
        assert!(journal.received_for(alice).unwrap().iter().all(|m| !m.is_read));

        journal.mark_read(alice, "bob").unwrap();

        let received = journal.received_for(alice).unwrap();
        assert_eq!(received.len(), 2);
        assert!(received.iter().all(|m| m.is_read));
    }

    #[test]
    fn mark_read_only_touches_the_named_sender() {
        let (journal, mut s) = journal_with(&["alice", "bob", "carol"]);

        journal
            .send(&s[1], "alice", "ALICE", "from bob", Default::default())
            .unwrap();
        journal
            .send(&s[2], "alice", "ALICE", "from carol", Default::default())
            .unwrap();

        let alice = &mut s[0];
        journal.mark_read(alice, "bob").unwrap();

        let received = journal.received_for(alice).unwrap();
        let unread: Vec<_> = received
            .iter()
            .filter(|m| !m.is_read)
            .map(|m| m.from_id.as_str())
            .collect();
        assert_eq!(unread, ["carol"]);
    }
}
