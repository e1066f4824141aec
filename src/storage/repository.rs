//! Repository pattern for object persistence
//!
//! The ingestion pipeline only talks to the [`ObjectRepository`] trait, which
//! keeps it testable against in-memory stores and decoupled from SQLite.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          IngestionScheduler                 │
//! └─────────────────────────────────────────────┘
//!                      │ exists / store
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │            ObjectRepository                 │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │  SqliteObjectRepository (one connection,    │
//! │  mutex-serialized, blocking thread pool)    │
//! └─────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::{GeoCoordinates, ObjectId, ObjectRecord};
use crate::storage::create_schema;

/// Persistent store of extracted objects
#[async_trait]
pub trait ObjectRepository: Send + Sync {
    /// Check if an object with this id is stored
    async fn exists(&self, id: &ObjectId) -> Result<bool>;

    /// Store a record with all of its phone numbers, atomically
    ///
    /// Returns `false` when the id was stored already, in which case nothing
    /// is written.
    async fn store(&self, record: &ObjectRecord) -> Result<bool>;

    /// Get a stored object by id
    async fn get(&self, id: &ObjectId) -> Result<Option<ObjectRecord>>;

    /// Count stored objects
    async fn count(&self) -> Result<usize>;
}

/// SQLite implementation of ObjectRepository
///
/// SQLite allows a single writer, so the connection sits behind a `Mutex`.
/// Only the database call itself holds the lock; fetching and parsing in the
/// pipeline run unserialized.
#[derive(Clone)]
pub struct SqliteObjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteObjectRepository {
    /// Open (or create) the database file and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        if !path.exists() {
            tracing::info!(path = %path.display(), "Database file does not exist; creating");
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let repo = Self::from_connection(conn)?;
        tracing::info!(path = %path.display(), "SQLite repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an already opened connection, creating the schema if needed
    pub fn from_connection(conn: Connection) -> Result<Self> {
        create_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking thread pool
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| Error::other("SQLite connection mutex poisoned"))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| Error::with_source("SQLite task failed", e))?
    }
}

fn insert_record(conn: &mut Connection, record: &ObjectRecord) -> Result<bool> {
    let tx = conn.transaction()?;

    let inserted = tx.execute(
        r#"
            INSERT OR IGNORE INTO objects (id, url, name, contact_name, region, latitude, longitude)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        params![
            record.id.as_str(),
            record.url,
            record.name,
            record.contact_name,
            record.region,
            record.coordinates.map(|c| c.latitude),
            record.coordinates.map(|c| c.longitude),
        ],
    )?;

    if inserted == 0 {
        // Stored concurrently by a duplicate id in the same batch
        return Ok(false);
    }

    {
        let mut stmt =
            tx.prepare("INSERT INTO object_phone_numbers (object_id, number) VALUES (?1, ?2)")?;
        for number in &record.phone_numbers {
            stmt.execute(params![record.id.as_str(), number])?;
        }
    }

    // Dropping the transaction without commit rolls every row back
    tx.commit()?;
    Ok(true)
}

fn select_record(conn: &Connection, id: &ObjectId) -> Result<Option<ObjectRecord>> {
    let row = conn
        .query_row(
            "SELECT url, name, contact_name, region, latitude, longitude
             FROM objects WHERE id = ?1",
            params![id.as_str()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                    row.get::<_, Option<f64>>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((url, name, contact_name, region, latitude, longitude)) = row else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT number FROM object_phone_numbers WHERE object_id = ?1 ORDER BY rowid",
    )?;
    let phone_numbers = stmt
        .query_map(params![id.as_str()], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoCoordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    Ok(Some(ObjectRecord {
        id: id.clone(),
        url,
        name,
        region,
        coordinates,
        contact_name,
        phone_numbers,
    }))
}

#[async_trait]
impl ObjectRepository for SqliteObjectRepository {
    async fn exists(&self, id: &ObjectId) -> Result<bool> {
        let id = id.clone();

        self.with_conn(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM objects WHERE id = ?1)",
                params![id.as_str()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
    }

    async fn store(&self, record: &ObjectRecord) -> Result<bool> {
        let record = record.clone();

        self.with_conn(move |conn| insert_record(conn, &record)).await
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<ObjectRecord>> {
        let id = id.clone();

        self.with_conn(move |conn| select_record(conn, &id)).await
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM objects", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}
