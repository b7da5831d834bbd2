//! Projection of the entry list into displayable cards, and the HTML
//! rendering of those cards.

use crate::diary_entry::{DiaryEntry, EntryKey, Mood};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Position in the entry sequence at render time.
    pub position: usize,
    pub key: EntryKey,
    pub id: usize,
    pub date_label: String,
    pub mood: Mood,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryList {
    /// The diary holds no entries at all.
    Empty,
    Cards(Vec<Card>),
}

impl EntryList {
    pub fn cards(&self) -> &[Card] {
        match self {
            EntryList::Empty => &[],
            EntryList::Cards(cards) => cards,
        }
    }
}

pub fn project(entries: &[DiaryEntry]) -> EntryList {
    project_matches(entries.is_empty(), entries.iter().enumerate())
}

/// Cards for a subset of the diary, as `(position, entry)` pairs.
/// `diary_empty` picks the empty state over an empty result.
pub fn project_matches<'a>(
    diary_empty: bool,
    matches: impl IntoIterator<Item = (usize, &'a DiaryEntry)>,
) -> EntryList {
    if diary_empty {
        return EntryList::Empty;
    }

    let cards = matches
        .into_iter()
        .map(|(position, e)| Card {
            position,
            key: e.key,
            id: e.id,
            date_label: long_date(&e.date),
            mood: e.mood,
            title: e.title.clone(),
            content: e.content.clone(),
        })
        .collect();

    EntryList::Cards(cards)
}

/// "Wednesday, February 4, 2026" in the local time zone.
pub fn long_date(date: &DateTime<Utc>) -> String {
    long_date_in(date, &Local)
}

pub fn long_date_in<Tz>(date: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.with_timezone(tz).format("%A, %B %-d, %Y").to_string()
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const EMPTY_STATE_HTML: &str = r#"<div class="empty-state">
    <div class="empty-icon">📝</div>
    <h2>No entries yet</h2>
    <p>Start writing your first diary entry!</p>
    <button class="btn-new-entry" data-action="create-entry">Create Entry</button>
</div>
"#;

/// Inner markup of the entries container.
pub fn render_html(list: &EntryList) -> String {
    let cards = match list {
        EntryList::Empty => return EMPTY_STATE_HTML.to_string(),
        EntryList::Cards(cards) => cards,
    };

    let mut html = String::new();
    for card in cards {
        html.push_str(&format!(
            r#"<div class="entry-card" data-id="{id}">
    <div class="entry-header">
        <div class="entry-date">{date}</div>
        <div class="entry-actions">
            <button class="edit-btn" data-action="edit" data-position="{position}">✏️</button>
            <button class="delete-btn" data-action="delete" data-position="{position}">🗑️</button>
        </div>
    </div>
    <div class="entry-decorations">
        <span class="deco-item">✨</span>
        <span class="deco-item">🌸</span>
        <span class="deco-item">⭐</span>
        <span class="deco-item">🦋</span>
    </div>
    <div class="entry-content-wrapper">
        <div class="entry-mood" title="{label}">{mood}</div>
        <h2 class="entry-title">{title}</h2>
        <div class="entry-content">{content}</div>
    </div>
    <div class="entry-footer">
        <div class="author-info">
            <span class="author-icon">🐰</span>
            <span class="author-text">hi sweeties this is me</span>
        </div>
        <div class="made-with-love">made with love ˚ˑ༄ؘ ·˚</div>
    </div>
</div>
"#,
            id = card.id,
            date = escape_html(&card.date_label),
            position = card.position,
            label = card.mood.label(),
            mood = card.mood.symbol(),
            title = escape_html(&card.title),
            content = escape_html(&card.content),
        ));
    }
    html
}

/// A standalone document around `render_html`, used by `export`.
pub fn render_page(list: &EntryList) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>My Diary</title>
</head>
<body>
<main id="entriesContainer">
{}</main>
</body>
</html>
"#,
        render_html(list)
    )
}
