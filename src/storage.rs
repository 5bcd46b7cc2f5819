//! Sled-based history of produced summaries.
//!
//! Entries are keyed by a monotonic sled id so iteration order is insertion
//! order. The log is bounded: recording past the limit drops the oldest.

use crate::extract::ExtractedContent;
use crate::summary::{SummaryMethod, SummaryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    DbError(#[from] sled::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// A stored summary with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub method: SummaryMethod,
    /// Word count of the source content
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Bounded summary history.
pub struct Storage {
    db: sled::Db,
    limit: usize,
}

impl Storage {
    /// Open or create storage at the given path
    pub fn open<P: AsRef<Path>>(path: P, limit: usize) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            limit: limit.max(1),
        })
    }

    /// Record a summary, pruning the oldest entries beyond the limit
    pub fn record(
        &self,
        content: &ExtractedContent,
        result: &SummaryResult,
    ) -> Result<HistoryEntry, StorageError> {
        let key = self.db.generate_id()?;
        let entry = HistoryEntry {
            id: format!("{key:x}"),
            url: content.url.clone(),
            title: content.title.clone(),
            summary: result.text.clone(),
            method: result.method,
            word_count: content.word_count,
            created_at: Utc::now(),
        };

        self.db
            .insert(key.to_be_bytes(), serde_json::to_vec(&entry)?)?;
        let pruned = self.prune()?;
        self.db.flush()?;

        debug!(id = %entry.id, pruned, "summary saved to history");
        Ok(entry)
    }

    /// Newest entries first, at most `limit` of them
    pub fn list(&self, limit: usize) -> Result<Vec<HistoryEntry>, StorageError> {
        let mut results = Vec::new();
        for item in self.db.iter().rev().take(limit) {
            let (_key, value) = item?;
            results.push(serde_json::from_slice(&value)?);
        }
        Ok(results)
    }

    /// Retrieve an entry by id
    pub fn get(&self, id: &str) -> Result<Option<HistoryEntry>, StorageError> {
        let Ok(key) = u64::from_str_radix(id, 16) else {
            return Ok(None);
        };
        match self.db.get(key.to_be_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Remove every entry, returning how many there were
    pub fn clear(&self) -> Result<usize, StorageError> {
        let count = self.db.len();
        self.db.clear()?;
        self.db.flush()?;
        Ok(count)
    }

    /// Get the number of stored summaries
    pub fn count(&self) -> usize {
        self.db.len()
    }

    fn prune(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        while self.db.len() > self.limit {
            match self.db.first()? {
                Some((key, _)) => {
                    self.db.remove(key)?;
                    removed += 1;
                }
                None => break,
            }
        }
        Ok(removed)
    }
}
