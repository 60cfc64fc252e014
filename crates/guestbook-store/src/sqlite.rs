// crates/guestbook-store/src/sqlite.rs
//
// SQLite-backed relational storage for guestbook entries.
//
// Table:
//   guestbook(seq INTEGER PRIMARY KEY AUTOINCREMENT, id TEXT UNIQUE,
//             name TEXT, message TEXT, created_at TEXT)
//
// `created_at` is written as fixed-width RFC 3339 with microsecond precision,
// so text comparison in ORDER BY matches chronological order. `seq` breaks
// ties between entries inserted within the same microsecond.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use guestbook_core::entry::next_created_at;
use guestbook_core::error::GuestbookError;
use guestbook_core::traits::EntryStore;
use guestbook_core::{EntryOrder, GuestbookEntry, NewEntry};

/// SQLite connection wrapper implementing the `EntryStore` trait.
#[derive(Debug)]
pub struct SqliteEntryStore {
    conn: Mutex<Connection>,
}

impl SqliteEntryStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self, GuestbookError> {
        let conn = Connection::open(path).map_err(|e| {
            GuestbookError::Storage(format!("Failed to open SQLite at {}: {}", path, e))
        })?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, GuestbookError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| GuestbookError::Storage(format!("Failed to open SQLite: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, GuestbookError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, GuestbookError> {
        self.conn
            .lock()
            .map_err(|e| GuestbookError::Storage(format!("Mutex poisoned: {}", e)))
    }

    /// Insert an entry synchronously.
    pub fn insert_entry_sync(&self, new_entry: NewEntry) -> Result<GuestbookEntry, GuestbookError> {
        let conn = self.lock()?;

        let last: Option<String> = conn
            .query_row("SELECT MAX(created_at) FROM guestbook", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .map_err(sql_err("SQLite query failed"))?;
        let last = last.as_deref().map(parse_timestamp).transpose()?;

        // Truncate first so the returned entry equals what a later read yields.
        let created_at = next_created_at(last).trunc_subsecs(6);
        let entry = GuestbookEntry::from_new(new_entry, created_at);

        conn.execute(
            "INSERT INTO guestbook (id, name, message, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id.to_string(),
                entry.name,
                entry.message,
                format_timestamp(&entry.created_at),
            ],
        )
        .map_err(sql_err("SQLite insert failed"))?;

        Ok(entry)
    }

    /// List entries synchronously in the requested order.
    pub fn list_entries_sync(&self, order: EntryOrder) -> Result<Vec<GuestbookEntry>, GuestbookError> {
        let sql = match order {
            EntryOrder::NewestFirst => {
                "SELECT id, name, message, created_at FROM guestbook \
                 ORDER BY created_at DESC, seq DESC"
            }
            EntryOrder::OldestFirst => {
                "SELECT id, name, message, created_at FROM guestbook \
                 ORDER BY created_at ASC, seq ASC"
            }
        };

        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(sql_err("SQLite prepare failed"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(sql_err("SQLite query failed"))?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, name, message, created_at) = row.map_err(sql_err("SQLite row error"))?;
            entries.push(GuestbookEntry {
                id: Uuid::parse_str(&id)
                    .map_err(|e| GuestbookError::Storage(format!("Bad entry id {}: {}", id, e)))?,
                name,
                message,
                created_at: parse_timestamp(&created_at)?,
            });
        }

        Ok(entries)
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn insert_entry(&self, entry: NewEntry) -> Result<GuestbookEntry, GuestbookError> {
        self.insert_entry_sync(entry)
    }

    async fn list_entries(&self, order: EntryOrder) -> Result<Vec<GuestbookEntry>, GuestbookError> {
        self.list_entries_sync(order)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn init_schema(conn: &Connection) -> Result<(), GuestbookError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS guestbook (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS guestbook_created_at ON guestbook (created_at);",
    )
    .map_err(sql_err("SQLite schema setup failed"))
}

fn sql_err(context: &'static str) -> impl Fn(rusqlite::Error) -> GuestbookError {
    move |e| GuestbookError::Storage(format!("{}: {}", context, e))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, GuestbookError> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| GuestbookError::Storage(format!("Bad created_at {}: {}", s, e)))
}
