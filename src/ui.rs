use crate::app::App;
use crate::dialog::{Dialog, EntryField, EntryForm, TextField};
use crate::diary_entry::Mood;
use crate::render::{Card, EntryList};
use crate::storage::Storage;
use color_eyre::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const CONTENT_PREVIEW_LINES: usize = 3;

/// Raw-mode alternate screen with mouse capture, restored on drop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout()
            .execute(EnterAlternateScreen)?
            .execute(EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Tui { terminal })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(DisableMouseCapture);
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn heading(text: impl Into<String>) -> Paragraph<'static> {
    Paragraph::new(text.into())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}

fn key_hint(keys: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw("Press ")];
    for (i, (key, what)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(format!(" to {what}")));
    }
    Line::from(spans)
}

pub fn draw<S: Storage>(frame: &mut Frame, app: &mut App<S>) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .margin(1)
    .areas(frame.area());

    let title = match &app.filter {
        Some(query) => format!("My Diary | filter: \"{query}\""),
        None => "My Diary".to_string(),
    };
    frame.render_widget(heading(title), header);

    let visible = app.visible();
    match &visible {
        EntryList::Empty => draw_empty_state(frame, body),
        EntryList::Cards(cards) if cards.is_empty() => {
            let message = Paragraph::new("No entries match the search. Press Esc to clear it.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Entries"));
            frame.render_widget(message, body);
        }
        EntryList::Cards(cards) => draw_cards(frame, body, cards, app.selected),
    }

    let controls = match app.status.as_deref() {
        Some(status) => Line::from(Span::raw(status.to_string())),
        None if visible == EntryList::Empty => {
            key_hint(&[("n", "write"), ("c", "create a diary"), ("q", "quit")])
        }
        None => key_hint(&[
            ("n", "write"),
            ("e", "edit"),
            ("d", "delete"),
            ("/", "search"),
            ("q", "quit"),
        ]),
    };
    let controls_paragraph = Paragraph::new(controls)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    frame.render_widget(controls_paragraph, footer);

    app.dialog_area = draw_dialog(frame, &app.dialog);
}

fn draw_empty_state(frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from("📝"),
        Line::from(""),
        Line::from(Span::styled(
            "No entries yet",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Start writing your first diary entry!"),
        Line::from(""),
        Line::from(vec![
            Span::raw("[ "),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" ] Create Entry"),
        ]),
    ]);
    let block = Block::default().borders(Borders::ALL).title("Entries");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Fill(1),
    ])
    .areas(inner);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), middle);
}

fn draw_cards(frame: &mut Frame, area: Rect, cards: &[Card], selected: usize) {
    // Borders plus the highlight symbol.
    let width = usize::from(area.width.saturating_sub(4)).max(1);
    let items: Vec<ListItem> = cards.iter().map(|card| card_item(card, width)).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Entries"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(
        list,
        area,
        &mut ListState::default().with_selected(Some(selected)),
    );
}

fn card_item(card: &Card, width: usize) -> ListItem<'static> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(card.date_label.clone(), Style::default().fg(Color::Magenta)),
            Span::styled(
                format!("  #{}", card.id),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::raw(format!("{} ", card.mood.symbol())),
            Span::styled(
                card.title.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let mut preview = wrap_text(&card.content, width);
    let truncated = preview.len() > CONTENT_PREVIEW_LINES;
    preview.truncate(CONTENT_PREVIEW_LINES);
    if truncated {
        if let Some(last) = preview.last_mut() {
            last.push_str(" …");
        }
    }
    lines.extend(preview.into_iter().map(Line::from));

    lines.push(Line::from(Span::styled(
        "[e] edit  [d] delete",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
    ListItem::new(lines)
}

/// Greedy word wrap by display width. Words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();

    for paragraph in text.lines() {
        let mut row = String::new();
        let mut row_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let gap = usize::from(!row.is_empty());

            if row_width + gap + word_width <= width {
                if gap == 1 {
                    row.push(' ');
                }
                row.push_str(word);
                row_width += gap + word_width;
                continue;
            }

            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if row_width + w > width && !row.is_empty() {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                row.push(c);
                row_width += w;
            }
        }
        rows.push(row);
    }

    rows
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn field_block(title: &'static str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

/// Draws a text field, scrolled so the cursor stays visible, and places
/// the terminal cursor when focused.
fn draw_field(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    field: &TextField,
    focused: bool,
) {
    let block = field_block(title, focused);
    let inner = block.inner(area);
    let (row, column) = field.cursor_row_col();
    let scroll_y = row.saturating_sub(inner.height.saturating_sub(1));
    let scroll_x = column.saturating_sub(inner.width.saturating_sub(1));

    frame.render_widget(
        Paragraph::new(field.value().to_string())
            .block(block)
            .scroll((scroll_y, scroll_x)),
        area,
    );

    if focused && inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position(Position {
            x: inner.x + column - scroll_x,
            y: inner.y + row - scroll_y,
        });
    }
}

fn mood_selector(selected: Option<Mood>) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, mood) in Mood::ALL.into_iter().enumerate() {
        let style = if selected == Some(mood) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(
            format!(" {} {} {} ", i + 1, mood.symbol(), mood.label()),
            style,
        ));
    }
    Line::from(spans)
}

fn draw_entry_form(frame: &mut Frame, area: Rect, form: &EntryForm) {
    let [title, content, mood, hint] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(4),
        Constraint::Length(1),
    ])
    .areas(area);

    let mood_title = if form.mood.is_some() {
        "Mood"
    } else {
        "Mood (pick one)"
    };
    draw_field(frame, title, "Title", &form.title, form.focus == EntryField::Title);
    draw_field(
        frame,
        content,
        "Write your thoughts...",
        &form.content,
        form.focus == EntryField::Content,
    );
    frame.render_widget(
        Paragraph::new(mood_selector(form.mood))
            .block(field_block(mood_title, form.focus == EntryField::Mood))
            .wrap(Wrap { trim: true }),
        mood,
    );
    frame.render_widget(
        Paragraph::new("Tab: next field, ←/→ or 1-6: mood, Ctrl-S: save, Esc: cancel")
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center),
        hint,
    );
}

/// Draws the open dialog over the main view and returns its area.
fn draw_dialog(frame: &mut Frame, dialog: &Dialog) -> Option<Rect> {
    let screen = frame.area();
    let popup = match dialog {
        Dialog::Closed => return None,
        Dialog::CreateEntry(_) | Dialog::EditEntry { .. } => centered(
            screen,
            screen.width.saturating_mul(4) / 5,
            screen.height.saturating_mul(4) / 5,
        ),
        Dialog::CreateDiary(_) | Dialog::Search(_) | Dialog::ConfirmDelete { .. } => {
            centered(screen, 60, 8)
        }
    };

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(dialog.title());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    match dialog {
        Dialog::Closed => {}
        Dialog::CreateEntry(form) | Dialog::EditEntry { form, .. } => {
            draw_entry_form(frame, inner, form)
        }
        Dialog::CreateDiary(field) => {
            draw_prompt(frame, inner, "Diary title", field, "Enter: create, Esc: cancel")
        }
        Dialog::Search(field) => {
            draw_prompt(frame, inner, "Search Query", field, "Enter: submit, Esc: cancel")
        }
        Dialog::ConfirmDelete { title, .. } => {
            let text = Text::from(vec![
                Line::from("Delete this entry?"),
                Line::from(Span::styled(
                    title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "y: delete, n/Esc: keep",
                    Style::default().fg(Color::Yellow),
                )),
            ]);
            frame.render_widget(
                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                inner,
            );
        }
    }

    Some(popup)
}

fn draw_prompt(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    field: &TextField,
    hint: &'static str,
) {
    let [input, _, instructions] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    draw_field(frame, input, title, field, true);
    frame.render_widget(
        Paragraph::new(hint)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center),
        instructions,
    );
}
