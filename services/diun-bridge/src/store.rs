use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::models::{Event, InboundPayload};

const SQL_CREATE_EVENTS: &str = "CREATE TABLE IF NOT EXISTS events (\
id INTEGER PRIMARY KEY AUTOINCREMENT, \
image TEXT NOT NULL, \
status TEXT NOT NULL, \
platform TEXT, \
tag TEXT, \
message TEXT NOT NULL, \
timestamp DATETIME DEFAULT CURRENT_TIMESTAMP)";
const SQL_INSERT_EVENT: &str =
    "INSERT INTO events (image, status, platform, tag, message) VALUES (?1, ?2, ?3, ?4, ?5)";
const SQL_LIST_EVENTS: &str = "SELECT id, image, status, platform, tag, message, timestamp \
FROM events ORDER BY timestamp DESC, id DESC";
const SQL_PROBE_EVENTS: &str = "SELECT id FROM events LIMIT 1";

#[derive(Debug)]
pub enum StoreError {
    Init(String),
    Write(String),
    Read(String),
    Connectivity(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(detail) => write!(f, "storage init failed: {detail}"),
            Self::Write(detail) => write!(f, "storage write failed: {detail}"),
            Self::Read(detail) => write!(f, "storage read failed: {detail}"),
            Self::Connectivity(detail) => write!(f, "storage unreachable: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Append-only event log in a single SQLite file.
///
/// Holds only the path: every operation opens its own connection on the
/// blocking pool and drops it before returning, so nothing is shared
/// between requests except the file itself.
#[derive(Clone, Debug)]
pub struct EventStore {
    path: Arc<PathBuf>,
}

impl EventStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Arc::new(path.as_ref().to_path_buf()),
        }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub async fn initialize(&self) -> Result<(), StoreError> {
        let path = Arc::clone(&self.path);
        run_blocking(StoreError::Init, move || {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|err| format!("create data dir failed: {err}"))?;
            }
            let conn =
                Connection::open(path.as_path()).map_err(|err| format!("open failed: {err}"))?;
            // WAL lets the dashboard read while a webhook is writing.
            conn.execute_batch("PRAGMA journal_mode=WAL;")
                .map_err(|err| format!("enable wal failed: {err}"))?;
            conn.execute_batch(SQL_CREATE_EVENTS)
                .map_err(|err| format!("create table failed: {err}"))?;
            Ok(())
        })
        .await
    }

    pub async fn append(&self, payload: &InboundPayload) -> Result<i64, StoreError> {
        let path = Arc::clone(&self.path);
        let payload = payload.clone();
        run_blocking(StoreError::Write, move || {
            let conn = open_existing(&path)?;
            conn.execute(
                SQL_INSERT_EVENT,
                params![
                    payload.image,
                    payload.status,
                    payload.platform,
                    payload.tag,
                    payload.message
                ],
            )
            .map_err(|err| format!("insert event failed: {err}"))?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        let path = Arc::clone(&self.path);
        run_blocking(StoreError::Read, move || {
            let conn = open_existing(&path)?;
            let mut stmt = conn
                .prepare(SQL_LIST_EVENTS)
                .map_err(|err| format!("prepare list failed: {err}"))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Event {
                        id: row.get("id")?,
                        image: row.get("image")?,
                        status: row.get("status")?,
                        platform: row.get("platform")?,
                        tag: row.get("tag")?,
                        message: row.get("message")?,
                        timestamp: row.get("timestamp")?,
                    })
                })
                .map_err(|err| format!("list events failed: {err}"))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|err| format!("decode event failed: {err}"))
        })
        .await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let path = Arc::clone(&self.path);
        run_blocking(StoreError::Connectivity, move || {
            let conn = open_existing(&path)?;
            conn.query_row(SQL_PROBE_EVENTS, [], |row| row.get::<_, i64>(0))
                .optional()
                .map_err(|err| format!("probe events failed: {err}"))?;
            Ok(())
        })
        .await
    }
}

fn open_existing(path: &Path) -> Result<Connection, String> {
    // Only initialize() may create the file.
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(path, flags).map_err(|err| format!("open failed: {err}"))
}

async fn run_blocking<T, F>(wrap: fn(String) -> StoreError, op: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|err| wrap(format!("blocking task failed: {err}")))?
        .map_err(wrap)
}
