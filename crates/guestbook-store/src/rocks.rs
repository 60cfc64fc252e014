// crates/guestbook-store/src/rocks.rs
//
// RocksDB-backed persistent storage for guestbook entries.
//
// Key format:
//   - `entry:{seq:020}` -> JSON-serialized GuestbookEntry
//
// `seq` is a zero-padded insertion counter, so byte order of keys equals
// insertion order and, because `created_at` never moves backwards, also
// `created_at` order. Newest-first listing is a reverse scan from the end
// of the prefix. The counter is recovered from the last key on open.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options};

use guestbook_core::entry::next_created_at;
use guestbook_core::error::GuestbookError;
use guestbook_core::traits::EntryStore;
use guestbook_core::{EntryOrder, GuestbookEntry, NewEntry};

const ENTRY_PREFIX: &[u8] = b"entry:";
// Sorts after every `entry:{digits}` key.
const ENTRY_PREFIX_END: &[u8] = b"entry:~";

/// Next key to hand out, plus the timestamp of the last insert.
#[derive(Debug)]
struct WriteCursor {
    next_seq: u64,
    last_created_at: Option<DateTime<Utc>>,
}

/// RocksDB wrapper implementing the `EntryStore` trait.
#[derive(Debug)]
pub struct RocksEntryStore {
    db: DBWithThreadMode<MultiThreaded>,
    cursor: Mutex<WriteCursor>,
}

impl RocksEntryStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, GuestbookError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            GuestbookError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        let cursor = match last_entry(&db)? {
            Some((seq, entry)) => WriteCursor {
                next_seq: seq + 1,
                last_created_at: Some(entry.created_at),
            },
            None => WriteCursor {
                next_seq: 0,
                last_created_at: None,
            },
        };
        tracing::debug!("Opened entry store at {} (next seq {})", path, cursor.next_seq);

        Ok(Self {
            db,
            cursor: Mutex::new(cursor),
        })
    }

    /// Build the key for an entry: `entry:{seq:020}`.
    fn entry_key(seq: u64) -> Vec<u8> {
        format!("entry:{:020}", seq).into_bytes()
    }

    /// Put raw bytes into RocksDB, mapping errors to GuestbookError::Storage.
    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), GuestbookError> {
        self.db
            .put(key, value)
            .map_err(|e| GuestbookError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Store an entry synchronously, assigning its sequence and timestamp.
    pub fn insert_entry_sync(&self, new_entry: NewEntry) -> Result<GuestbookEntry, GuestbookError> {
        // The lock spans the write so that key order and created_at order agree.
        let mut cursor = self
            .cursor
            .lock()
            .map_err(|e| GuestbookError::Storage(format!("Mutex poisoned: {}", e)))?;

        let created_at = next_created_at(cursor.last_created_at);
        let entry = GuestbookEntry::from_new(new_entry, created_at);
        let key = Self::entry_key(cursor.next_seq);
        let json = serde_json::to_vec(&entry).map_err(|e| {
            GuestbookError::Storage(format!(
                "Failed to encode entry {}: {}",
                String::from_utf8_lossy(&key),
                e
            ))
        })?;
        self.put_raw(&key, &json)?;

        cursor.next_seq += 1;
        cursor.last_created_at = Some(created_at);
        Ok(entry)
    }

    /// List entries synchronously in the requested order.
    pub fn list_entries_sync(&self, order: EntryOrder) -> Result<Vec<GuestbookEntry>, GuestbookError> {
        let mode = match order {
            EntryOrder::NewestFirst => IteratorMode::From(ENTRY_PREFIX_END, Direction::Reverse),
            EntryOrder::OldestFirst => IteratorMode::From(ENTRY_PREFIX, Direction::Forward),
        };

        let mut entries = Vec::new();
        for item in self.db.iterator(mode) {
            let (key, value) = item
                .map_err(|e| GuestbookError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(ENTRY_PREFIX) {
                break;
            }
            entries.push(decode_entry(&key, &value)?);
        }

        Ok(entries)
    }
}

#[async_trait]
impl EntryStore for RocksEntryStore {
    async fn insert_entry(&self, entry: NewEntry) -> Result<GuestbookEntry, GuestbookError> {
        self.insert_entry_sync(entry)
    }

    async fn list_entries(&self, order: EntryOrder) -> Result<Vec<GuestbookEntry>, GuestbookError> {
        self.list_entries_sync(order)
    }

    fn backend_name(&self) -> &'static str {
        "rocksdb"
    }
}

/// Find the highest-sequence entry, if any.
fn last_entry(
    db: &DBWithThreadMode<MultiThreaded>,
) -> Result<Option<(u64, GuestbookEntry)>, GuestbookError> {
    let mut iter = db.iterator(IteratorMode::From(ENTRY_PREFIX_END, Direction::Reverse));
    match iter.next() {
        Some(item) => {
            let (key, value) = item
                .map_err(|e| GuestbookError::Storage(format!("RocksDB iteration error: {}", e)))?;
            if !key.starts_with(ENTRY_PREFIX) {
                return Ok(None);
            }
            let seq = parse_seq(&key)?;
            let entry = decode_entry(&key, &value)?;
            Ok(Some((seq, entry)))
        }
        None => Ok(None),
    }
}

/// Decode a stored entry; an undecodable value is a storage fault.
fn decode_entry(key: &[u8], value: &[u8]) -> Result<GuestbookEntry, GuestbookError> {
    serde_json::from_slice(value).map_err(|e| {
        GuestbookError::Storage(format!(
            "Corrupt entry {}: {}",
            String::from_utf8_lossy(key),
            e
        ))
    })
}

/// Extract the sequence number from an `entry:{seq}` key.
fn parse_seq(key: &[u8]) -> Result<u64, GuestbookError> {
    std::str::from_utf8(&key[ENTRY_PREFIX.len()..])
        .ok()
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| {
            GuestbookError::Storage(format!(
                "Malformed entry key: {}",
                String::from_utf8_lossy(key)
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Create a temporary directory path using UUID to avoid conflicts.
    fn temp_db_path(label: &str) -> String {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("guestbook_test_{}_{}", label, Uuid::now_v7()));
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_entry_key_is_zero_padded() {
        assert_eq!(RocksEntryStore::entry_key(7), b"entry:00000000000000000007".to_vec());
        assert!(RocksEntryStore::entry_key(9) < RocksEntryStore::entry_key(10));
    }

    #[test]
    fn test_parse_seq() {
        assert_eq!(parse_seq(&RocksEntryStore::entry_key(42)).unwrap(), 42);
        assert!(parse_seq(b"entry:abc").is_err());
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let path = temp_db_path("rocks_empty");
        let store = RocksEntryStore::open(&path).unwrap();
        assert!(store.list_entries(EntryOrder::NewestFirst).await.unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn test_newest_first_and_oldest_first() {
        let path = temp_db_path("rocks_order");
        let store = RocksEntryStore::open(&path).unwrap();

        store.insert_entry(NewEntry::new("Ada", "hello")).await.unwrap();
        store.insert_entry(NewEntry::new("Grace", "hi")).await.unwrap();
        store.insert_entry(NewEntry::new("Linus", "hey")).await.unwrap();

        let newest: Vec<String> = store
            .list_entries(EntryOrder::NewestFirst)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(newest, vec!["Linus", "Grace", "Ada"]);

        let oldest: Vec<String> = store
            .list_entries(EntryOrder::OldestFirst)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(oldest, vec!["Ada", "Grace", "Linus"]);

        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn test_sequence_survives_reopen() {
        let path = temp_db_path("rocks_reopen");
        {
            let store = RocksEntryStore::open(&path).unwrap();
            store.insert_entry(NewEntry::new("Ada", "first")).await.unwrap();
            store.insert_entry(NewEntry::new("Grace", "second")).await.unwrap();
        }

        let store = RocksEntryStore::open(&path).unwrap();
        store.insert_entry(NewEntry::new("Linus", "third")).await.unwrap();

        let entries = store.list_entries(EntryOrder::NewestFirst).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Linus", "Grace", "Ada"]);
        assert!(entries[0].created_at >= entries[1].created_at);
        assert!(entries[1].created_at >= entries[2].created_at);

        drop(store);
        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn test_unrelated_keys_are_skipped() {
        let path = temp_db_path("rocks_foreign");
        let store = RocksEntryStore::open(&path).unwrap();
        store.put_raw(b"meta:version", b"1").unwrap();
        store.put_raw(b"zzz", b"x").unwrap();
        store.insert_entry(NewEntry::new("Ada", "hello")).await.unwrap();

        let entries = store.list_entries(EntryOrder::NewestFirst).await.unwrap();
        assert_eq!(entries.len(), 1);
        let entries = store.list_entries(EntryOrder::OldestFirst).await.unwrap();
        assert_eq!(entries.len(), 1);

        drop(store);
        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn test_corrupt_value_is_storage_error() {
        let path = temp_db_path("rocks_corrupt");
        let store = RocksEntryStore::open(&path).unwrap();
        store.insert_entry(NewEntry::new("Ada", "hello")).await.unwrap();
        store.put_raw(&RocksEntryStore::entry_key(5), b"{not json").unwrap();

        match store.list_entries(EntryOrder::NewestFirst).await {
            Err(GuestbookError::Storage(msg)) => {
                assert!(msg.contains("Corrupt entry entry:00000000000000000005"), "{}", msg)
            }
            other => panic!("expected storage error, got {:?}", other),
        }

        drop(store);
        // The corrupt row is also the last key, so reopening must fail the same way.
        match RocksEntryStore::open(&path) {
            Err(GuestbookError::Storage(msg)) => assert!(msg.contains("Corrupt entry")),
            other => panic!("expected storage error, got {:?}", other.map(|_| ())),
        }
        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts() {
        let path = temp_db_path("rocks_concurrent");
        let store = std::sync::Arc::new(RocksEntryStore::open(&path).unwrap());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_entry(NewEntry::new(format!("writer-{}", i), "hi"))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = store.list_entries(EntryOrder::NewestFirst).await.unwrap();
        assert_eq!(entries.len(), 32);
        let ids: std::collections::HashSet<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 32);
        assert!(entries.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        drop(entries);
        drop(store);
        let _ = std::fs::remove_dir_all(&path);
    }
}
