//! Persistence of discovered identifiers and extracted objects
//!
//! - [`sink`] - append-only identifier file written by the `object-ids` workflow
//! - [`repository`] - SQLite object store used for dedup checks and writes

pub mod repository;
pub mod sink;

pub use repository::{ObjectRepository, SqliteObjectRepository};
pub use sink::IdentifierSink;

use rusqlite::Connection;

use crate::error::Result;

/// Create the object tables if they do not exist yet
///
/// Foreign keys are enabled on the connection so that phone number rows
/// follow their object row on update and delete.
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS objects (
                id           TEXT PRIMARY KEY NOT NULL,
                url          TEXT NOT NULL,
                name         TEXT NOT NULL,
                contact_name TEXT NOT NULL,
                region       TEXT NOT NULL,
                latitude     REAL NULL,
                longitude    REAL NULL
            );

            CREATE TABLE IF NOT EXISTS object_phone_numbers (
                object_id TEXT NOT NULL,
                number    TEXT NOT NULL,
                FOREIGN KEY (object_id) REFERENCES objects(id)
                    ON DELETE CASCADE ON UPDATE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_object_phone_numbers_object_id
                ON object_phone_numbers(object_id);
            "#,
    )?;

    Ok(())
}
