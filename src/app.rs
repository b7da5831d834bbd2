use crate::dialog::{Dialog, DialogAction, EntryForm, TextField};
use crate::diary_entry::EntryKey;
use crate::diary_state::DiaryState;
use crate::error::{DiaryError, Result};
use crate::render::{self, EntryList};
use crate::storage::Storage;
use crate::ui;
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::{backend::Backend, layout::Rect, Terminal};
use tracing::{error, info};

/// Terminal front end over a `DiaryState`. Every event is handled to
/// completion before the next one is read.
pub struct App<S: Storage> {
    pub(crate) diary: DiaryState<S>,
    pub(crate) dialog: Dialog,
    pub(crate) selected: usize,
    pub(crate) filter: Option<String>,
    pub(crate) status: Option<String>,
    /// Where the open dialog was last drawn; clicks outside it close it.
    pub(crate) dialog_area: Option<Rect>,
    should_quit: bool,
}

impl<S: Storage> App<S> {
    pub fn new(diary: DiaryState<S>) -> Self {
        let status = match diary.quarantined() {
            0 => None,
            n => Some(format!("{n} unreadable record(s) were set aside while loading")),
        };

        App {
            diary,
            dialog: Dialog::Closed,
            selected: 0,
            filter: None,
            status,
            dialog_area: None,
            should_quit: false,
        }
    }

    pub fn diary(&self) -> &DiaryState<S> {
        &self.diary
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn into_diary(self) -> DiaryState<S> {
        self.diary
    }

    /// The cards currently shown, after the search filter.
    pub fn visible(&self) -> EntryList {
        match self.filter.as_deref() {
            Some(query) => render::project_matches(self.diary.is_empty(), self.diary.search(query)),
            None => render::project(self.diary.entries()),
        }
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> color_eyre::Result<()> {
        let mut events = EventStream::new();

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;

            match events.next().await {
                Some(Ok(event)) => self.dispatch(event),
                Some(Err(e)) => return Err(e.into()),
                None => break,
            }
        }

        Ok(())
    }

    /// Handles one event. A failing handler only affects its own
    /// interaction: the error goes to the log and the status line.
    pub fn dispatch(&mut self, event: Event) {
        if let Err(err) = self.handle_event(event) {
            error!(error = %err, "event handler failed");
            self.status = Some(err.to_string());
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if self.dialog.is_open() {
                    let action = self.dialog.handle_key(key);
                    self.apply(action)
                } else {
                    self.handle_main_key(key);
                    Ok(())
                }
            }
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) || !self.dialog.is_open() {
            return;
        }
        let inside = self.dialog_area.is_some_and(|area| {
            mouse.column >= area.x
                && mouse.column < area.x.saturating_add(area.width)
                && mouse.row >= area.y
                && mouse.row < area.y.saturating_add(area.height)
        });
        if !inside {
            self.close_dialog();
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) {
        let shown = self.visible().cards().len();
        self.status = None;

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('n') => self.open(Dialog::CreateEntry(EntryForm::new())),
            KeyCode::Char('c') => self.open(Dialog::CreateDiary(TextField::new())),
            KeyCode::Char('/') => {
                let query = self.filter.clone().unwrap_or_default();
                self.open(Dialog::Search(TextField::with_value(query)));
            }
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit(),
            KeyCode::Char('d') | KeyCode::Delete => self.open_delete(),
            KeyCode::Esc => {
                self.filter = None;
                self.selected = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < shown {
                    self.selected += 1;
                }
            }
            _ => {}
        }
    }

    fn selected_card_key(&self) -> Option<EntryKey> {
        self.visible().cards().get(self.selected).map(|c| c.key)
    }

    fn open(&mut self, dialog: Dialog) {
        self.dialog = dialog;
        self.dialog_area = None;
    }

    fn open_edit(&mut self) {
        let Some(entry) = self.selected_card_key().and_then(|k| self.diary.get(k)) else {
            return;
        };
        let dialog = Dialog::EditEntry {
            key: entry.key,
            form: EntryForm::prefilled(entry),
        };
        self.open(dialog);
    }

    fn open_delete(&mut self) {
        let Some(entry) = self.selected_card_key().and_then(|k| self.diary.get(k)) else {
            return;
        };
        let dialog = Dialog::ConfirmDelete {
            key: entry.key,
            title: entry.title.clone(),
        };
        self.open(dialog);
    }

    fn close_dialog(&mut self) {
        self.dialog.close();
        self.dialog_area = None;
    }

    fn clamp_selection(&mut self) {
        let shown = self.visible().cards().len();
        self.selected = self.selected.min(shown.saturating_sub(1));
    }

    fn apply(&mut self, action: DialogAction) -> Result<()> {
        match action {
            DialogAction::None => {}
            DialogAction::Cancel => self.close_dialog(),
            DialogAction::SubmitDiary(title) => {
                info!(%title, "create diary requested, only a single diary is supported");
                self.close_dialog();
                self.status = Some(format!(
                    "Diary \"{title}\" created! (entries are kept in a single diary)"
                ));
            }
            DialogAction::SubmitEntry(input) => {
                self.diary.create(input.title, input.content, input.mood)?;
                self.close_dialog();
                self.filter = None;
                self.selected = 0;
                self.status = Some("Entry saved".to_string());
            }
            DialogAction::SubmitEdit(key, input) => {
                let result = self.diary.update(key, input.title, input.content, input.mood);
                if !matches!(result, Err(DiaryError::MissingMood)) {
                    self.close_dialog();
                }
                result?;
                self.clamp_selection();
                self.status = Some("Entry updated".to_string());
            }
            DialogAction::ConfirmDelete(key) => {
                self.close_dialog();
                self.diary.delete(key)?;
                self.clamp_selection();
                self.status = Some("Entry deleted".to_string());
            }
            DialogAction::SubmitSearch(query) => {
                self.close_dialog();
                self.filter = Some(query).filter(|q| !q.is_empty());
                self.selected = 0;
            }
        }
        Ok(())
    }
}
