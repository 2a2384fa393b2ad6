//! Block-relationship visibility rules.
//!
//! Distinct from access control: a hidden message is filtered at the query
//! layer, never rejected at send time. The two views deliberately differ:
//! the shared timeline hides any message touching a blocked relationship in
//! either direction, while a personal inbox only needs the sender-side
//! check because the viewer is always the recipient there.

use arigato_types::models::{Message, User};

/// Shared-timeline rule: neither participant may be blocked by the viewer.
pub fn timeline_visible(viewer: &User, message: &Message) -> bool {
    !viewer
        .blocked
        .iter()
        .any(|id| id == &message.from_id || id == &message.to_id)
}

/// Inbox rule: the sender must not be blocked by the viewer.
pub fn inbox_visible(viewer: &User, message: &Message) -> bool {
    !viewer.blocked.iter().any(|id| id == &message.from_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arigato_types::models::Avatar;

    fn viewer(blocked: &[&str]) -> User {
        User {
            user_id: "viewer".to_string(),
            name: "Viewer".to_string(),
            password: "hash".to_string(),
            bio: String::new(),
            avatar: Avatar::default(),
            following: vec![],
            blocked: blocked.iter().map(|s| s.to_string()).collect(),
            push_token: None,
            created_at: 0,
        }
    }

    fn message(from: &str, to: &str) -> Message {
        Message {
            id: format!("msg_{from}_{to}"),
            from_id: from.to_string(),
            from_name: from.to_uppercase(),
            to_id: to.to_string(),
            to_name: to.to_uppercase(),
            body: "thanks".to_string(),
            created_at: 0,
            is_read: false,
            reply_to: None,
            root_id: None,
        }
    }

    #[test]
    fn timeline_hides_blocked_in_either_direction() {
        let v = viewer(&["bob"]);
        // Bob as sender and Bob as recipient are both hidden.
        assert!(!timeline_visible(&v, &message("bob", "carol")));
        assert!(!timeline_visible(&v, &message("carol", "bob")));
        assert!(timeline_visible(&v, &message("carol", "dave")));
    }

    #[test]
    fn inbox_checks_only_the_sender_side() {
        let v = viewer(&["bob"]);
        assert!(!inbox_visible(&v, &message("bob", "viewer")));
        // Recipient side never matters in the inbox.
        assert!(inbox_visible(&v, &message("carol", "viewer")));
    }

    #[test]
    fn no_blocks_means_everything_is_visible() {
        let v = viewer(&[]);
        assert!(timeline_visible(&v, &message("bob", "carol")));
        assert!(inbox_visible(&v, &message("bob", "viewer")));
    }
}
