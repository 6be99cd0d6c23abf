// Copyright 2025 Cowboy AI, LLC.

//! Generic flat-file record store
//!
//! One text file, one record per line. All updates and deletes go through a
//! whole-file rewrite; there are no random-access edits. The rewrite goes to a
//! temporary sibling file first and is renamed over the target, so a reader
//! never observes a partially written file.
//!
//! ```mermaid
//! graph TD
//!     A[scan_all] -->|decode per line| B[Vec of records]
//!     C[append] -->|open append, write one line| D[file]
//!     E[rewrite_all] -->|encode all| F[temp file]
//!     F -->|rename| D
//! ```

use crate::errors::{DomainError, DomainResult};
use crate::record::FlatRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Store over a single text file of one-record-per-line
///
/// A missing file is an empty store: the user and ticket files do not exist
/// before the first write. Each store instance owns its backing path for its
/// lifetime; callers re-scan rather than share in-memory state.
#[derive(Debug, Clone)]
pub struct FlatFileStore<R: FlatRecord> {
    path: PathBuf,
    _marker: PhantomData<R>,
}

impl<R: FlatRecord> FlatFileStore<R> {
    /// Create a store over the given backing file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every decodable record, preserving file order
    ///
    /// Blank lines and lines that fail to decode under any known schema are
    /// skipped; a bad row never aborts the scan.
    pub fn scan_all(&self) -> DomainResult<Vec<R>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| DomainError::storage(&self.path, e))?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|e| DomainError::storage(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            match R::decode(&line) {
                Some(record) => records.push(record),
                None => {
                    debug!(kind = R::KIND, %line, "skipping undecodable line");
                }
            }
        }
        Ok(records)
    }

    /// Append one newly encoded record line
    ///
    /// The record is not assumed persisted unless this returns `Ok`.
    pub fn append(&self, record: &R) -> DomainResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DomainError::storage(&self.path, e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| DomainError::storage(&self.path, e))?;
        writeln!(file, "{}", record.encode()).map_err(|e| DomainError::storage(&self.path, e))?;

        debug!(kind = R::KIND, path = %self.path.display(), "appended record");
        Ok(())
    }

    /// Replace the file contents with the given records, in order
    ///
    /// Writes to a temporary sibling and renames it over the target so the
    /// previous contents survive a failure mid-write. Old rows come back in
    /// the newest schema on the next scan.
    pub fn rewrite_all(&self, records: &[R]) -> DomainResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DomainError::storage(&self.path, e))?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file =
            File::create(&temp_path).map_err(|e| DomainError::storage(&temp_path, e))?;
        for record in records {
            writeln!(file, "{}", record.encode())
                .map_err(|e| DomainError::storage(&temp_path, e))?;
        }
        file.sync_all()
            .map_err(|e| DomainError::storage(&temp_path, e))?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            warn!(path = %self.path.display(), error = %e, "rewrite rename failed");
            let _ = fs::remove_file(&temp_path);
            return Err(DomainError::storage(&self.path, e));
        }

        debug!(
            kind = R::KIND,
            path = %self.path.display(),
            count = records.len(),
            "rewrote store"
        );
        Ok(())
    }

    /// First record matching the predicate, in file order
    pub fn find<P>(&self, predicate: P) -> DomainResult<Option<R>>
    where
        P: Fn(&R) -> bool,
    {
        Ok(self.scan_all()?.into_iter().find(|r| predicate(r)))
    }

    /// All records matching the predicate, original order preserved
    pub fn filter<P>(&self, predicate: P) -> DomainResult<Vec<R>>
    where
        P: Fn(&R) -> bool,
    {
        Ok(self
            .scan_all()?
            .into_iter()
            .filter(|r| predicate(r))
            .collect())
    }
}
