#![forbid(unsafe_code)]

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::error::TaskuiError;
use crate::tui;
use crate::tui::TerminalGuard;

#[derive(Debug, Clone)]
pub struct PickerItem {
    pub title: String,
    pub preview: String,
}

/// Fuzzy-ish single-select list with a preview pane; used by CLI commands
/// that accept an interactive choice (task, status).
pub fn pick_one(title: &str, items: &[PickerItem]) -> Result<usize, TaskuiError> {
    if items.is_empty() {
        return Err(TaskuiError::Other(
            "no items available for selection".to_owned(),
        ));
    }
    if !tui::is_tty() {
        return Err(TaskuiError::Other(
            "interactive selection requires a TTY".to_owned(),
        ));
    }

    let terminal = tui::init_terminal()?;
    let mut guard = TerminalGuard::new(terminal);

    let lower_titles: Vec<String> = items.iter().map(|i| i.title.to_lowercase()).collect();

    let mut query = String::new();
    let mut filtered: Vec<usize> = (0..items.len()).collect();
    let mut selected = 0usize;
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        let terminal = guard
            .terminal
            .as_mut()
            .ok_or_else(|| TaskuiError::Other("terminal unavailable".to_owned()))?;
        terminal
            .draw(|f| draw(f, title, items, &query, &filtered, selected, &mut list_state))
            .map_err(|e| TaskuiError::Other(format!("failed to draw picker: {e}")))?;

        if event::poll(Duration::from_millis(50))
            .map_err(|e| TaskuiError::Other(format!("event poll failed: {e}")))?
            && let Event::Key(key) = event::read()
                .map_err(|e| TaskuiError::Other(format!("event read failed: {e}")))?
            && handle_key(
                key,
                &lower_titles,
                &mut query,
                &mut filtered,
                &mut selected,
                &mut list_state,
            )?
        {
            return Ok(filtered.get(selected).copied().unwrap_or(0));
        }
    }
}

fn handle_key(
    key: KeyEvent,
    lower_titles: &[String],
    query: &mut String,
    filtered: &mut Vec<usize>,
    selected: &mut usize,
    list_state: &mut ListState,
) -> Result<bool, TaskuiError> {
    // returns Ok(true) when accepted
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        return Err(TaskuiError::Cancelled);
    }

    match key.code {
        KeyCode::Esc => return Err(TaskuiError::Cancelled),
        KeyCode::Enter => return Ok(true),
        KeyCode::Up => {
            if *selected > 0 {
                *selected -= 1;
                list_state.select(Some(*selected));
            }
        }
        KeyCode::Down => {
            if *selected + 1 < filtered.len() {
                *selected += 1;
                list_state.select(Some(*selected));
            }
        }
        KeyCode::Backspace => {
            query.pop();
            recompute_filter(query, lower_titles, filtered, selected, list_state);
        }
        KeyCode::Char(c) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT)
            {
                query.push(c);
                recompute_filter(query, lower_titles, filtered, selected, list_state);
            }
        }
        _ => {}
    }

    Ok(false)
}

fn recompute_filter(
    query: &str,
    lower_titles: &[String],
    filtered: &mut Vec<usize>,
    selected: &mut usize,
    list_state: &mut ListState,
) {
    let q = query.to_lowercase();
    if q.is_empty() {
        *filtered = (0..lower_titles.len()).collect();
    } else {
        *filtered = lower_titles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.contains(&q).then_some(i))
            .collect();
    }

    if filtered.is_empty() {
        *filtered = (0..lower_titles.len()).collect();
    }

    if *selected >= filtered.len() {
        *selected = 0;
    }
    list_state.select(Some(*selected));
}

fn draw(
    f: &mut Frame<'_>,
    title: &str,
    items: &[PickerItem],
    query: &str,
    filtered: &[usize],
    selected: usize,
    list_state: &mut ListState,
) {
    let area = f.area();
    let outer = Block::default().title(title).borders(Borders::ALL);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    let list_items: Vec<ListItem> = filtered
        .iter()
        .map(|&idx| ListItem::new(Line::from(items[idx].title.clone())))
        .collect();

    let list = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title("Items"))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">");
    f.render_stateful_widget(list, body[0], list_state);

    let preview_idx = filtered.get(selected).copied().unwrap_or(0);
    let preview = Paragraph::new(items[preview_idx].preview.clone())
        .block(Block::default().borders(Borders::ALL).title("Preview"))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, body[1]);

    let bottom = Paragraph::new(Line::from(vec![
        Span::styled("Query: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(query),
        Span::raw("  "),
        Span::styled(
            "Type to filter • ↑/↓ move • Enter accept • Esc cancel",
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    f.render_widget(bottom, chunks[1]);
}
