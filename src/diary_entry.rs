use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of an entry. Unlike `id` it survives deletions of
/// other entries, so mutations always resolve against the current list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryKey(Uuid);

impl EntryKey {
    pub fn generate() -> Self {
        EntryKey(Uuid::new_v4())
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "😊")]
    Happy,
    #[serde(rename = "🥰")]
    Loved,
    #[serde(rename = "😌")]
    Calm,
    #[serde(rename = "🤔")]
    Thoughtful,
    #[serde(rename = "😢")]
    Sad,
    #[serde(rename = "😴")]
    Sleepy,
}

impl Mood {
    /// Selector order.
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Loved,
        Mood::Calm,
        Mood::Thoughtful,
        Mood::Sad,
        Mood::Sleepy,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Loved => "🥰",
            Mood::Calm => "😌",
            Mood::Thoughtful => "🤔",
            Mood::Sad => "😢",
            Mood::Sleepy => "😴",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Loved => "Loved",
            Mood::Calm => "Calm",
            Mood::Thoughtful => "Thoughtful",
            Mood::Sad => "Sad",
            Mood::Sleepy => "Sleepy",
        }
    }

    fn index(self) -> usize {
        Mood::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    /// Next mood in selector order, wrapping. No selection picks the first.
    pub fn next(current: Option<Mood>) -> Mood {
        match current {
            None => Mood::ALL[0],
            Some(mood) => Mood::ALL[(mood.index() + 1) % Mood::ALL.len()],
        }
    }

    /// Previous mood in selector order, wrapping. No selection picks the last.
    pub fn previous(current: Option<Mood>) -> Mood {
        match current {
            None => Mood::ALL[Mood::ALL.len() - 1],
            Some(mood) => Mood::ALL[(mood.index() + Mood::ALL.len() - 1) % Mood::ALL.len()],
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: usize,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub date: DateTime<Utc>,
    #[serde(default = "EntryKey::generate")]
    pub key: EntryKey,
}

impl DiaryEntry {
    pub fn new(id: usize, title: String, content: String, mood: Mood) -> Self {
        DiaryEntry {
            id,
            title,
            content,
            mood,
            date: Utc::now(),
            key: EntryKey::generate(),
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.content.to_lowercase().contains(&query)
    }
}
