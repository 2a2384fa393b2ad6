use std::collections::HashMap;

use arigato_types::models::{Message, ReplySnippet, SendOptions};

use crate::{Journal, Result, Session};

/// A conversation thread as seen by one participant: the resolved root,
/// the other party, and the member messages oldest-first (the one place
/// conversation-flow order is used).
#[derive(Debug, Clone)]
pub struct ThreadView {
    pub root_id: String,
    pub other_id: String,
    pub other_name: String,
    pub messages: Vec<Message>,
}

/// One counterpart's bucket in a grouped inbox or outbox.
#[derive(Debug, Clone)]
pub struct InboxGroup {
    pub counterpart_id: String,
    pub counterpart_name: String,
    pub count: usize,
    pub latest: i64,
    pub has_unread: bool,
}

/// All members of a thread: the root itself plus every message pointing at
/// it, sorted ascending by creation time.
fn thread_members(log: &[Message], root_id: &str) -> Vec<Message> {
    let mut members: Vec<Message> = log
        .iter()
        .filter(|m| m.id == root_id || m.root_id.as_deref() == Some(root_id))
        .cloned()
        .collect();
    members.sort_by_key(|m| m.created_at);
    members
}

fn group_by_counterpart<F>(messages: &[Message], counterpart: F) -> Vec<InboxGroup>
where
    F: Fn(&Message) -> (&str, &str),
{
    let mut groups: HashMap<String, InboxGroup> = HashMap::new();
    for m in messages {
        let (id, name) = counterpart(m);
        let group = groups.entry(id.to_string()).or_insert_with(|| InboxGroup {
            counterpart_id: id.to_string(),
            counterpart_name: name.to_string(),
            count: 0,
            latest: 0,
            has_unread: false,
        });
        group.count += 1;
        group.latest = group.latest.max(m.created_at);
        group.has_unread = group.has_unread || !m.is_read;
    }

    let mut groups: Vec<InboxGroup> = groups.into_values().collect();
    groups.sort_by(|a, b| b.latest.cmp(&a.latest));
    groups
}

impl Journal {
    /// Resolve the thread a message belongs to. The root is the message's
    /// `root_id` when present, else the message itself; the other party is
    /// whichever side of the anchoring message is not the viewer. A
    /// missing message id resolves to no thread.
    pub fn open_thread(&self, session: &Session, message_id: &str) -> Result<Option<ThreadView>> {
        let log = self.store().load_messages()?;
        let Some(target) = log.iter().find(|m| m.id == message_id) else {
            return Ok(None);
        };

        let root_id = target.root_id.clone().unwrap_or_else(|| target.id.clone());
        let (other_id, other_name) = if target.from_id == session.user_id() {
            (target.to_id.clone(), target.to_name.clone())
        } else {
            (target.from_id.clone(), target.from_name.clone())
        };

        let messages = thread_members(&log, &root_id);
        Ok(Some(ThreadView {
            root_id,
            other_id,
            other_name,
            messages,
        }))
    }

    /// Compose a reply inside an open thread. The new message's `root_id`
    /// is the thread root; the reply snippet quotes the most recent thread
    /// message authored by the other party, when one exists.
    pub fn reply_in_thread(
        &self,
        session: &Session,
        thread: &ThreadView,
        body: &str,
    ) -> Result<Message> {
        let log = self.store().load_messages()?;
        let members = thread_members(&log, &thread.root_id);

        let reply_to = members
            .iter()
            .rev()
            .find(|m| m.from_id == thread.other_id)
            .map(|m| ReplySnippet {
                id: m.id.clone(),
                name: m.from_name.clone(),
                text: m.body.clone(),
            });

        let options = SendOptions {
            reply_to,
            root_id: Some(thread.root_id.clone()),
        };
        self.send(session, &thread.other_id, &thread.other_name, body, options)
    }

    /// Received notes bucketed by sender, freshest conversation first.
    pub fn received_groups(&self, session: &Session) -> Result<Vec<InboxGroup>> {
        let received = self.received_for(session)?;
        Ok(group_by_counterpart(&received, |m| {
            (m.from_id.as_str(), m.from_name.as_str())
        }))
    }

    /// Sent notes bucketed by recipient, freshest conversation first.
    pub fn sent_groups(&self, session: &Session) -> Result<Vec<InboxGroup>> {
        let sent = self.sent_by(session)?;
        Ok(group_by_counterpart(&sent, |m| {
            (m.to_id.as_str(), m.to_name.as_str())
        }))
    }

    /// Received, visible and unread: the badge number.
    pub fn unread_count(&self, session: &Session) -> Result<usize> {
        Ok(self
            .received_for(session)?
            .iter()
            .filter(|m| !m.is_read)
            .count())
    }

    /// Open one sender's bucket: returns its messages and transitions all
    /// of that sender's unread notes to read in one batch. This is the
    /// only read-state transition.
    pub fn open_received_detail(
        &self,
        session: &Session,
        from_id: &str,
    ) -> Result<Vec<Message>> {
        let detail: Vec<Message> = self
            .received_for(session)?
            .into_iter()
            .filter(|m| m.from_id == from_id)
            .collect();

        if !detail.is_empty() {
            self.mark_read(session, from_id)?;
        }
        Ok(detail)
    }

    /// Open one recipient's bucket of sent notes. No read-state change;
    /// the read flag belongs to the recipient.
    pub fn sent_detail(&self, session: &Session, to_id: &str) -> Result<Vec<Message>> {
        Ok(self
            .sent_by(session)?
            .into_iter()
            .filter(|m| m.to_id == to_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arigato_store::MemoryStore;

    use crate::{Journal, Session};

    fn journal_with(users: &[&str]) -> (Journal, Vec<Session>) {
        let journal = Journal::new(Arc::new(MemoryStore::new()));
        let sessions = users
            .iter()
            .map(|id| journal.register(id, &id.to_uppercase(), "pw").unwrap())
            .collect();
        (journal, sessions)
    }

    #[test]
    fn thread_membership_is_complete_and_sorted_oldest_first() {
        let (journal, s) = journal_with(&["alice", "bob"]);
        let (alice, bob) = (&s[0], &s[1]);

        let root = journal
            .send(alice, "bob", "BOB", "thank you!", Default::default())
            .unwrap();

        let thread = journal.open_thread(bob, &root.id).unwrap().unwrap();
        let reply = journal.reply_in_thread(bob, &thread, "you too!").unwrap();
        let thread = journal.open_thread(alice, &reply.id).unwrap().unwrap();
        journal.reply_in_thread(alice, &thread, "anytime").unwrap();

        let thread = journal.open_thread(alice, &root.id).unwrap().unwrap();
        assert_eq!(thread.messages.len(), 3);
        assert!(
            thread
                .messages
                .windows(2)
                .all(|w| w[0].created_at <= w[1].created_at),
            "thread must read oldest-first"
        );
        assert_eq!(thread.messages[0].id, root.id);
    }

    #[test]
    fn reply_sets_root_and_quotes_the_other_party() {
        let (journal, s) = journal_with(&["alice", "bob"]);
        let (alice, bob) = (&s[0], &s[1]);

        let root = journal
            .send(alice, "bob", "BOB", "thank you!", Default::default())
            .unwrap();

        let thread = journal.open_thread(bob, &root.id).unwrap().unwrap();
        assert_eq!(thread.other_id, "alice");

        let reply = journal.reply_in_thread(bob, &thread, "you too!").unwrap();
        assert_eq!(reply.root_id.as_deref(), Some(root.id.as_str()));

        let snippet = reply.reply_to.expect("reply carries a snippet");
        assert_eq!(snippet.id, root.id);
        assert_eq!(snippet.name, "ALICE");
        assert_eq!(snippet.text, "thank you!");
    }

    #[test]
    fn reply_quotes_the_most_recent_message_from_the_other_party() {
        let (journal, s) = journal_with(&["alice", "bob"]);
        let (alice, bob) = (&s[0], &s[1]);

        let root = journal
            .send(alice, "bob", "BOB", "first", Default::default())
            .unwrap();
        let thread = journal.open_thread(alice, &root.id).unwrap().unwrap();
        journal.reply_in_thread(alice, &thread, "second").unwrap();

        let thread = journal.open_thread(bob, &root.id).unwrap().unwrap();
        let reply = journal.reply_in_thread(bob, &thread, "got both").unwrap();

        let snippet = reply.reply_to.expect("snippet present");
        assert_eq!(snippet.text, "second");
    }

    #[test]
    fn reply_without_a_message_from_the_other_party_has_no_snippet() {
        let (journal, s) = journal_with(&["alice", "bob"]);
        let alice = &s[0];

        let root = journal
            .send(alice, "bob", "BOB", "hello", Default::default())
            .unwrap();

        // Alice replies into her own thread; Bob has said nothing yet.
        let thread = journal.open_thread(alice, &root.id).unwrap().unwrap();
        let reply = journal.reply_in_thread(alice, &thread, "me again").unwrap();
        assert!(reply.reply_to.is_none());
        assert_eq!(reply.root_id.as_deref(), Some(root.id.as_str()));
    }

    #[test]
    fn open_thread_on_unknown_message_resolves_to_none() {
        let (journal, s) = journal_with(&["alice"]);
        assert!(journal.open_thread(&s[0], "msg_missing").unwrap().is_none());
    }

    #[test]
    fn received_groups_track_count_latest_and_unread() {
        let (journal, mut s) = journal_with(&["alice", "bob", "carol"]);

        journal
            .send(&s[1], "alice", "ALICE", "bob 1", Default::default())
            .unwrap();
        journal
            .send(&s[2], "alice", "ALICE", "carol 1", Default::default())
            .unwrap();
        journal
            .send(&s[1], "alice", "ALICE", "bob 2", Default::default())
            .unwrap();

        let alice = &mut s[0];
        let groups = journal.received_groups(alice).unwrap();
        assert_eq!(groups.len(), 2);

        // Bob wrote most recently, so his group leads.
        assert_eq!(groups[0].counterpart_id, "bob");
        assert_eq!(groups[0].count, 2);
        assert!(groups[0].has_unread);
        assert_eq!(groups[1].counterpart_id, "carol");

        journal.open_received_detail(alice, "bob").unwrap();
        let groups = journal.received_groups(alice).unwrap();
        assert!(!groups[0].has_unread);
        assert!(groups[1].has_unread);
    }

    #[test]
    fn open_received_detail_marks_the_whole_bucket_read() {
        let (journal, mut s) = journal_with(&["alice", "bob"]);

        journal
            .send(&s[1], "alice", "ALICE", "one", Default::default())
            .unwrap();
        journal
            .send(&s[1], "alice", "ALICE", "two", Default::default())
            .unwrap();

        let alice = &mut s[0];
        assert_eq!(journal.unread_count(alice).unwrap(), 2);

        let detail = journal.open_received_detail(alice, "bob").unwrap();
        assert_eq!(detail.len(), 2);
        assert_eq!(journal.unread_count(alice).unwrap(), 0);
    }

    #[test]
    fn sent_groups_bucket_by_recipient() {
        let (journal, s) = journal_with(&["alice", "bob", "carol"]);
        let alice = &s[0];

        journal
            .send(alice, "bob", "BOB", "to bob", Default::default())
            .unwrap();
        journal
            .send(alice, "carol", "CAROL", "to carol", Default::default())
            .unwrap();

        let groups = journal.sent_groups(alice).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].counterpart_id, "carol");

        let detail = journal.sent_detail(alice, "bob").unwrap();
        assert_eq!(detail.len(), 1);
        assert_eq!(detail[0].body, "to bob");
    }
}
