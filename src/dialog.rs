//! Overlay dialogs and the form state behind them.

use crate::diary_entry::{DiaryEntry, EntryKey, Mood};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

/// Editable text with a cursor kept on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        TextField {
            cursor: value.len(),
            value,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    fn line_start(&self, at: usize) -> usize {
        self.value[..at].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, at: usize) -> usize {
        self.value[at..].find('\n').map_or(self.value.len(), |i| at + i)
    }

    /// Byte offset of the `column`th char of the line `start..end`,
    /// clamped to the line end.
    fn offset_in_line(&self, start: usize, end: usize, column: usize) -> usize {
        self.value[start..end]
            .char_indices()
            .nth(column)
            .map_or(end, |(i, _)| start + i)
    }

    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return;
        }
        let column = self.value[start..self.cursor].chars().count();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_in_line(prev_start, start - 1, column);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.value.len() {
            return;
        }
        let column = self.value[self.line_start(self.cursor)..self.cursor]
            .chars()
            .count();
        let next_start = end + 1;
        let next_end = self.line_end(next_start);
        self.cursor = self.offset_in_line(next_start, next_end, column);
    }

    pub fn home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    /// Cursor as (line, display column).
    pub fn cursor_row_col(&self) -> (u16, u16) {
        let before = &self.value[..self.cursor];
        let row = before.matches('\n').count();
        let column = before[self.line_start(self.cursor)..].width();
        (
            u16::try_from(row).unwrap_or(u16::MAX),
            u16::try_from(column).unwrap_or(u16::MAX),
        )
    }

    /// Applies an editing key. Returns false when the key is not an edit.
    pub fn handle_key(&mut self, key: &KeyEvent, multiline: bool) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.insert(c),
            KeyCode::Enter if multiline => self.insert('\n'),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up if multiline => self.move_up(),
            KeyCode::Down if multiline => self.move_down(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Title,
    Content,
    Mood,
}

impl EntryField {
    fn next(self) -> Self {
        match self {
            EntryField::Title => EntryField::Content,
            EntryField::Content => EntryField::Mood,
            EntryField::Mood => EntryField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            EntryField::Title => EntryField::Mood,
            EntryField::Content => EntryField::Title,
            EntryField::Mood => EntryField::Content,
        }
    }
}

/// What a submitted entry form carries. `mood` is `None` when nothing
/// was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInput {
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    pub title: TextField,
    pub content: TextField,
    pub mood: Option<Mood>,
    pub focus: EntryField,
}

impl Default for EntryForm {
    fn default() -> Self {
        EntryForm {
            title: TextField::new(),
            content: TextField::new(),
            mood: None,
            focus: EntryField::Title,
        }
    }
}

impl EntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefilled(entry: &DiaryEntry) -> Self {
        EntryForm {
            title: TextField::with_value(entry.title.clone()),
            content: TextField::with_value(entry.content.clone()),
            mood: Some(entry.mood),
            focus: EntryField::Title,
        }
    }

    pub fn input(&self) -> EntryInput {
        EntryInput {
            title: self.title.value().to_string(),
            content: self.content.value().to_string(),
            mood: self.mood,
        }
    }

    /// Returns true when the key submits the form.
    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return true;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return false;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return false;
            }
            _ => {}
        }

        match self.focus {
            EntryField::Title => {
                if key.code == KeyCode::Enter {
                    self.focus = EntryField::Content;
                } else {
                    self.title.handle_key(key, false);
                }
            }
            EntryField::Content => {
                self.content.handle_key(key, true);
            }
            EntryField::Mood => match key.code {
                KeyCode::Enter => return true,
                KeyCode::Right | KeyCode::Char(' ') => self.mood = Some(Mood::next(self.mood)),
                KeyCode::Left => self.mood = Some(Mood::previous(self.mood)),
                KeyCode::Char(c) => {
                    let picked = c
                        .to_digit(10)
                        .and_then(|d| usize::try_from(d).ok())
                        .and_then(|d| d.checked_sub(1))
                        .and_then(|i| Mood::ALL.get(i).copied());
                    if picked.is_some() {
                        self.mood = picked;
                    }
                }
                _ => {}
            },
        }
        false
    }
}

/// The single overlay that may be open at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dialog {
    #[default]
    Closed,
    /// Placeholder for multiple diaries; submitting only acknowledges.
    CreateDiary(TextField),
    CreateEntry(EntryForm),
    EditEntry {
        key: EntryKey,
        form: EntryForm,
    },
    ConfirmDelete {
        key: EntryKey,
        title: String,
    },
    Search(TextField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    None,
    Cancel,
    SubmitDiary(String),
    SubmitEntry(EntryInput),
    SubmitEdit(EntryKey, EntryInput),
    ConfirmDelete(EntryKey),
    SubmitSearch(String),
}

impl Dialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::Closed)
    }

    pub fn close(&mut self) {
        *self = Dialog::Closed;
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dialog::Closed => "",
            Dialog::CreateDiary(_) => "Create New Diary",
            Dialog::CreateEntry(_) => "New Entry",
            Dialog::EditEntry { .. } => "Edit Entry",
            Dialog::ConfirmDelete { .. } => "Delete Entry",
            Dialog::Search(_) => "Search Entries",
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> DialogAction {
        if event.code == KeyCode::Esc {
            return DialogAction::Cancel;
        }

        match self {
            Dialog::Closed => DialogAction::None,
            Dialog::CreateDiary(field) => {
                if event.code == KeyCode::Enter {
                    DialogAction::SubmitDiary(field.value().trim().to_string())
                } else {
                    field.handle_key(&event, false);
                    DialogAction::None
                }
            }
            Dialog::CreateEntry(form) => {
                if form.handle_key(&event) {
                    DialogAction::SubmitEntry(form.input())
                } else {
                    DialogAction::None
                }
            }
            Dialog::EditEntry { key, form } => {
                if form.handle_key(&event) {
                    DialogAction::SubmitEdit(*key, form.input())
                } else {
                    DialogAction::None
                }
            }
            Dialog::ConfirmDelete { key, .. } => match event.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    DialogAction::ConfirmDelete(*key)
                }
                KeyCode::Char('n') | KeyCode::Char('N') => DialogAction::Cancel,
                _ => DialogAction::None,
            },
            Dialog::Search(field) => {
                if event.code == KeyCode::Enter {
                    DialogAction::SubmitSearch(field.value().trim().to_string())
                } else {
                    field.handle_key(&event, false);
                    DialogAction::None
                }
            }
        }
    }
}
