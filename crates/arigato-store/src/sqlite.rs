use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use arigato_types::models::{Message, User};

use crate::{Result, Store, StoreError, migrations};

/// SQLite-backed document store. Records are JSON documents, one row per
/// record, so the schema stays agnostic of the record shape. It is the
/// same model a browser's key-value storage or a hosted document database
/// uses.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Document store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut conn)
    }

    fn load_docs<T>(&self, sql: &'static str, collection: &'static str) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let docs = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            docs.iter()
                .map(|doc| {
                    serde_json::from_str(doc).map_err(|source| StoreError::Corrupt {
                        collection,
                        source,
                    })
                })
                .collect()
        })
    }
}

impl Store for SqliteStore {
    fn load_users(&self) -> Result<Vec<User>> {
        self.load_docs("SELECT doc FROM users ORDER BY rowid", "users")
    }

    fn replace_users(&self, users: &[User]) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM users", [])?;
            for user in users {
                let doc = serde_json::to_string(user).map_err(|source| StoreError::Corrupt {
                    collection: "users",
                    source,
                })?;
                tx.execute(
                    "INSERT INTO users (user_id, doc) VALUES (?1, ?2)",
                    (&user.user_id, &doc),
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn load_messages(&self) -> Result<Vec<Message>> {
        self.load_docs(
            "SELECT doc FROM messages ORDER BY created_at DESC, id DESC",
            "messages",
        )
    }

    fn replace_messages(&self, messages: &[Message]) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM messages", [])?;
            for message in messages {
                let doc = serde_json::to_string(message).map_err(|source| StoreError::Corrupt {
                    collection: "messages",
                    source,
                })?;
                tx.execute(
                    "INSERT INTO messages (id, created_at, doc) VALUES (?1, ?2, ?3)",
                    (&message.id, message.created_at, &doc),
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn session_user(&self) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT doc FROM session WHERE slot = 'current'")?;
            let doc = match stmt.query_row([], |row| row.get::<_, String>(0)) {
                Ok(doc) => doc,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            serde_json::from_str(&doc)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    collection: "session",
                    source,
                })
        })
    }

    fn set_session_user(&self, user: &User) -> Result<()> {
        let doc = serde_json::to_string(user).map_err(|source| StoreError::Corrupt {
            collection: "session",
            source,
        })?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO session (slot, doc) VALUES ('current', ?1)
                 ON CONFLICT(slot) DO UPDATE SET doc = excluded.doc",
                [&doc],
            )?;
            Ok(())
        })
    }

    fn clear_session_user(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM session", [])?;
            Ok(())
        })
    }
}
