//! Append-only identifier file
//!
//! Discovered object ids are written one per line. The file is created
//! exclusively so that ids from two unrelated runs never end up in the same
//! file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::models::ObjectId;
use crate::utils::error::SinkError;

/// Newline-delimited identifier writer
pub struct IdentifierSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl IdentifierSink {
    /// Create the output file, failing if it already exists
    ///
    /// # Errors
    ///
    /// Returns `SinkError::AlreadyExists` when `path` exists; the existing
    /// file is left untouched.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => SinkError::AlreadyExists(path.to_path_buf()),
                _ => SinkError::Io(e),
            })?;

        tracing::debug!(path = %path.display(), "Created identifier file");

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append one identifier followed by a newline
    pub async fn append(&mut self, id: &ObjectId) -> Result<(), SinkError> {
        self.writer.write_all(id.as_str().as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.written += 1;
        Ok(())
    }

    /// Flush buffered identifiers and sync the file to disk
    pub async fn finish(mut self) -> Result<usize, SinkError> {
        self.writer.flush().await?;
        self.writer.get_ref().sync_all().await?;

        tracing::debug!(
            path = %self.path.display(),
            written = self.written,
            "Flushed identifier file"
        );
        Ok(self.written)
    }
}
