//! Error types for the diary

use crate::diary_entry::EntryKey;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage file {} is not a key-value snapshot: {source}", .path.display())]
    CorruptStorage {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Choose a mood before saving the entry")]
    MissingMood,

    #[error("Entry {0} no longer exists")]
    EntryNotFound(EntryKey),
}

pub type Result<T> = std::result::Result<T, DiaryError>;
