pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use arigato_types::models::{Message, User};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt {collection} record: {source}")]
    Corrupt {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// The storage collaborator: three collections (users, messages, session),
/// each read and replaced whole, record-level last-writer-wins. A replace
/// is atomic; the block operation relies on both touched user records
/// landing in one write.
///
/// Backends: a local SQLite file ([`SqliteStore`]) or an in-memory map
/// ([`MemoryStore`]). A hosted document database would be a third
/// implementation; its wire protocol is out of scope here.
pub trait Store: Send + Sync {
    /// Every user record, registration order.
    fn load_users(&self) -> Result<Vec<User>>;

    /// Replace the users collection in a single atomic write.
    fn replace_users(&self, users: &[User]) -> Result<()>;

    /// The full message log, newest first.
    fn load_messages(&self) -> Result<Vec<Message>>;

    /// Replace the message log in a single atomic write.
    fn replace_messages(&self, messages: &[Message]) -> Result<()>;

    /// The persisted client session, if one exists.
    fn session_user(&self) -> Result<Option<User>>;

    fn set_session_user(&self, user: &User) -> Result<()>;

    fn clear_session_user(&self) -> Result<()>;
}
