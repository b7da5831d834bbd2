pub mod app;
pub mod cli;
pub mod dialog;
pub mod diary_entry;
pub mod diary_state;
pub mod error;
pub mod logging;
pub mod render;
pub mod storage;
pub mod ui;

pub use diary_entry::{DiaryEntry, EntryKey, Mood};
pub use diary_state::DiaryState;
pub use error::{DiaryError, Result};
