#![forbid(unsafe_code)]

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use crate::api::{ApiClient, NewTask, TaskPatch};
use crate::output::format_timestamp;
use crate::session::Session;
use crate::task::list::{LoadState, TaskList};
use crate::task::model::{Task, TaskDraft, TaskStatus};
use crate::tui;
use crate::tui::TerminalGuard;
use crate::tui::input::TextInput;

/// Why the board loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppOutcome {
    Quit,
    /// The user logged out, or the stored token was rejected on load; the
    /// caller clears the session and shows the login screen again.
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Searching,
    TaskForm,
    StatusPick,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Title,
    Description,
    Status,
}

/// Create/edit dialog. One dialog serves both: `editing` is `None` for a
/// fresh draft and carries the task id when populated from an existing task.
#[derive(Debug)]
struct TaskFormDialog {
    editing: Option<i64>,
    title: TextInput,
    description: TextInput,
    status: Option<TaskStatus>,
    field: FormField,
    error: Option<String>,
}

impl TaskFormDialog {
    fn create() -> Self {
        Self {
            editing: None,
            title: TextInput::new(""),
            description: TextInput::new(""),
            status: None,
            field: FormField::Title,
            error: None,
        }
    }

    fn edit(task: &Task) -> Self {
        let draft = TaskDraft::from_task(task);
        Self {
            editing: Some(task.id),
            title: TextInput::new(draft.title),
            description: TextInput::new(draft.description),
            status: draft.status,
            field: FormField::Title,
            error: None,
        }
    }

    fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.as_str().to_owned(),
            description: self.description.as_str().to_owned(),
            status: self.status,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Status,
            FormField::Status => FormField::Title,
        };
    }

    fn cycle_status(&mut self) {
        self.status = Some(self.status.map_or(TaskStatus::Pending, TaskStatus::next));
    }

    fn cycle_status_back(&mut self) {
        self.status = Some(self.status.map_or(TaskStatus::Completed, TaskStatus::prev));
    }
}

#[derive(Debug)]
struct StatusDialog {
    id: i64,
    selected: usize,
}

#[derive(Debug)]
struct ConfirmDelete {
    id: i64,
    title: String,
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    until: Instant,
}

impl Toast {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            until: Instant::now() + Duration::from_secs(3),
        }
    }
}

struct AppState {
    cfg: crate::config::Config,
    session: Session,

    mode: Mode,
    list: TaskList,
    search: String,
    search_input: TextInput,
    table_state: TableState,

    form: Option<TaskFormDialog>,
    status_pick: Option<StatusDialog>,
    confirm: Option<ConfirmDelete>,

    toast: Option<Toast>,
    should_quit: bool,
    outcome: AppOutcome,
}

impl AppState {
    fn new(cfg: crate::config::Config, session: Session) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));
        Self {
            cfg,
            session,
            mode: Mode::Normal,
            list: TaskList::new(),
            search: String::new(),
            search_input: TextInput::new(""),
            table_state,
            form: None,
            status_pick: None,
            confirm: None,
            toast: None,
            should_quit: false,
            outcome: AppOutcome::Quit,
        }
    }

    fn visible_ids(&self) -> Vec<i64> {
        self.list.visible(&self.search).iter().map(|t| t.id).collect()
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_task_id(&self) -> Option<i64> {
        let ids = self.visible_ids();
        ids.get(self.selected_index().min(ids.len().saturating_sub(1)))
            .copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            self.table_state.select(Some(0));
            return;
        }
        let idx = self.selected_index().min(len - 1);
        self.table_state.select(Some(idx));
    }

    fn move_selection(&mut self, delta: i64) {
        let len = self.visible_ids().len();
        if len == 0 {
            return;
        }
        let cur = i64::try_from(self.selected_index()).unwrap_or(0);
        let max = i64::try_from(len - 1).unwrap_or(0);
        let next = (cur + delta).clamp(0, max);
        self.table_state.select(Some(usize::try_from(next).unwrap_or(0)));
    }
}

/// Runs the task board for an established session.
pub async fn run(
    cfg: crate::config::Config,
    api: &ApiClient,
    session: Session,
) -> anyhow::Result<AppOutcome> {
    let terminal = tui::init_terminal()?;
    let mut guard = TerminalGuard::new(terminal);

    let mut app = AppState::new(cfg, session);

    // Show the loading frame before the first fetch so slow servers do not
    // leave a blank alternate screen.
    draw_frame(&mut guard, &mut app)?;
    if let Some(outcome) = initial_load(&mut app, api).await {
        return Ok(outcome);
    }

    loop {
        if let Some(toast) = &app.toast
            && Instant::now() >= toast.until
        {
            app.toast = None;
        }

        draw_frame(&mut guard, &mut app)?;

        if app.should_quit {
            return Ok(app.outcome);
        }

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            handle_key(key, &mut app, api).await?;
        }
    }
}

fn draw_frame(guard: &mut TerminalGuard, app: &mut AppState) -> anyhow::Result<()> {
    let Some(terminal) = guard.terminal.as_mut() else {
        anyhow::bail!("terminal unavailable");
    };
    terminal.draw(|f| draw(f, app))?;
    Ok(())
}

/// First fetch: success -> Ready, failure -> Failed. A rejected token short
/// circuits straight back to the login screen.
async fn initial_load(app: &mut AppState, api: &ApiClient) -> Option<AppOutcome> {
    match api.list_tasks(&app.session.token).await {
        Ok(tasks) => {
            app.list.load_ok(tasks);
            app.clamp_selection();
            None
        }
        Err(e) if e.is_auth() => Some(AppOutcome::Logout),
        Err(e) => {
            app.list.load_failed(e.to_string());
            None
        }
    }
}

async fn handle_key(key: KeyEvent, app: &mut AppState, api: &ApiClient) -> anyhow::Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        app.should_quit = true;
        return Ok(());
    }

    match app.mode {
        Mode::Searching => handle_search_key(key, app),
        Mode::TaskForm => handle_form_key(key, app, api).await?,
        Mode::StatusPick => handle_status_key(key, app, api).await?,
        Mode::Confirm => handle_confirm_key(key, app, api).await?,
        Mode::Normal => handle_normal_key(key, app, api).await?,
    }
    Ok(())
}

async fn handle_normal_key(
    key: KeyEvent,
    app: &mut AppState,
    api: &ApiClient,
) -> anyhow::Result<()> {
    match *app.list.state() {
        LoadState::Failed(_) => {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                KeyCode::Char('r') => {
                    let _ = initial_load_retry(app, api).await;
                }
                KeyCode::Char('L') => {
                    app.outcome = AppOutcome::Logout;
                    app.should_quit = true;
                }
                _ => {}
            }
            return Ok(());
        }
        LoadState::Loading => return Ok(()),
        LoadState::Ready => {}
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => {
            if app.list.action_error().is_some() {
                app.list.clear_action_error();
            } else if !app.search.is_empty() {
                app.search.clear();
                app.search_input = TextInput::new("");
                app.clamp_selection();
            } else {
                app.should_quit = true;
            }
        }
        KeyCode::Char('L') => {
            app.outcome = AppOutcome::Logout;
            app.should_quit = true;
        }
        KeyCode::Char('/') => {
            app.search_input = TextInput::new(app.search.clone());
            app.mode = Mode::Searching;
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Char('r') => refetch(app, api).await,
        KeyCode::Char('n') => {
            app.form = Some(TaskFormDialog::create());
            app.mode = Mode::TaskForm;
        }
        KeyCode::Char('e') => {
            if let Some(id) = app.selected_task_id()
                && let Some(task) = app.list.get(id)
            {
                app.form = Some(TaskFormDialog::edit(task));
                app.mode = Mode::TaskForm;
            }
        }
        KeyCode::Char('s') => {
            if let Some(id) = app.selected_task_id()
                && let Some(task) = app.list.get(id)
            {
                let selected = TaskStatus::ALL
                    .iter()
                    .position(|s| *s == task.status)
                    .unwrap_or(0);
                app.status_pick = Some(StatusDialog { id, selected });
                app.mode = Mode::StatusPick;
            }
        }
        KeyCode::Char(' ') => {
            if let Some(id) = app.selected_task_id()
                && let Some(task) = app.list.get(id)
            {
                let next = task.status.next();
                change_status(app, api, id, next).await;
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = app.selected_task_id()
                && let Some(task) = app.list.get(id)
            {
                app.confirm = Some(ConfirmDelete {
                    id,
                    title: task.title.clone(),
                });
                app.mode = Mode::Confirm;
            }
        }
        _ => {}
    }
    Ok(())
}

async fn initial_load_retry(app: &mut AppState, api: &ApiClient) -> Option<AppOutcome> {
    app.list = TaskList::new();
    let out = initial_load(app, api).await;
    if let Some(AppOutcome::Logout) = out {
        app.outcome = AppOutcome::Logout;
        app.should_quit = true;
    }
    out
}

fn handle_search_key(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            app.search = app.search_input.as_str().to_owned();
            app.mode = Mode::Normal;
            app.clamp_selection();
        }
        KeyCode::Left => app.search_input.move_left(),
        KeyCode::Right => app.search_input.move_right(),
        KeyCode::Home => app.search_input.move_home(),
        KeyCode::End => app.search_input.move_end(),
        KeyCode::Backspace => {
            app.search_input.backspace();
            app.search = app.search_input.as_str().to_owned();
            app.clamp_selection();
        }
        KeyCode::Delete => app.search_input.delete(),
        KeyCode::Char(c) => {
            app.search_input.insert_char(c);
            // Live filtering: the visible list is derived on every render.
            app.search = app.search_input.as_str().to_owned();
            app.clamp_selection();
        }
        _ => {}
    }
}

async fn handle_form_key(key: KeyEvent, app: &mut AppState, api: &ApiClient) -> anyhow::Result<()> {
    let Some(form) = app.form.as_mut() else {
        app.mode = Mode::Normal;
        return Ok(());
    };

    match key.code {
        KeyCode::Esc => {
            app.form = None;
            app.mode = Mode::Normal;
        }
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::Enter => {
            let draft = form.draft();
            if let Err(msg) = draft.validate() {
                form.error = Some(msg);
                return Ok(());
            }
            let editing = form.editing;
            submit_form(app, api, editing, draft).await;
        }
        KeyCode::Left if form.field == FormField::Status => form.cycle_status_back(),
        KeyCode::Right | KeyCode::Char(' ') if form.field == FormField::Status => {
            form.cycle_status();
        }
        KeyCode::Left => {
            if let Some(input) = active_form_input(form) {
                input.move_left();
            }
        }
        KeyCode::Right => {
            if let Some(input) = active_form_input(form) {
                input.move_right();
            }
        }
        KeyCode::Home => {
            if let Some(input) = active_form_input(form) {
                input.move_home();
            }
        }
        KeyCode::End => {
            if let Some(input) = active_form_input(form) {
                input.move_end();
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = active_form_input(form) {
                input.backspace();
            }
        }
        KeyCode::Delete => {
            if let Some(input) = active_form_input(form) {
                input.delete();
            }
        }
        KeyCode::Char(c) => {
            if let Some(input) = active_form_input(form) {
                input.insert_char(c);
            }
        }
        _ => {}
    }
    Ok(())
}

/// The text input under the cursor; `None` while the status selector is
/// focused so editing keys cannot leak into the title.
fn active_form_input(form: &mut TaskFormDialog) -> Option<&mut TextInput> {
    match form.field {
        FormField::Title => Some(&mut form.title),
        FormField::Description => Some(&mut form.description),
        FormField::Status => None,
    }
}

/// Create or save: optimistic list patch, then full re-fetch to reconcile.
/// The draft is cleared only on success.
async fn submit_form(app: &mut AppState, api: &ApiClient, editing: Option<i64>, draft: TaskDraft) {
    let token = app.session.token.clone();
    let result = match editing {
        None => {
            let new = NewTask {
                title: &draft.title,
                description: &draft.description,
                status: draft.status.unwrap_or(TaskStatus::Pending),
            };
            api.create_task(&token, &new).await.map(Some)
        }
        Some(id) => {
            let patch = TaskPatch {
                title: Some(draft.title.clone()),
                description: Some(draft.description.clone()),
                status: draft.status,
            };
            api.update_task(&token, id, &patch).await.map(|()| None)
        }
    };

    match result {
        Ok(created) => {
            match (editing, created) {
                (Some(id), _) => app.list.apply_updated(id, &draft),
                (None, Some(task)) => app.list.apply_created(task),
                (None, None) => {}
            }
            app.form = None;
            app.mode = Mode::Normal;
            app.toast = Some(Toast::info(if editing.is_some() {
                "task updated"
            } else {
                "task created"
            }));
            refetch(app, api).await;
        }
        Err(e) => {
            if let Some(form) = app.form.as_mut() {
                form.error = Some(e.to_string());
            }
        }
    }
}

async fn handle_status_key(
    key: KeyEvent,
    app: &mut AppState,
    api: &ApiClient,
) -> anyhow::Result<()> {
    let Some(dialog) = app.status_pick.as_mut() else {
        app.mode = Mode::Normal;
        return Ok(());
    };

    match key.code {
        KeyCode::Esc => {
            app.status_pick = None;
            app.mode = Mode::Normal;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            dialog.selected = dialog.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            dialog.selected = (dialog.selected + 1).min(TaskStatus::ALL.len() - 1);
        }
        KeyCode::Enter => {
            let id = dialog.id;
            let status = TaskStatus::ALL[dialog.selected];
            app.status_pick = None;
            app.mode = Mode::Normal;
            change_status(app, api, id, status).await;
        }
        _ => {}
    }
    Ok(())
}

async fn change_status(app: &mut AppState, api: &ApiClient, id: i64, status: TaskStatus) {
    match api.update_task_status(&app.session.token, id, status).await {
        Ok(()) => {
            app.list.apply_status(id, status);
            refetch(app, api).await;
        }
        Err(e) => app.list.action_failed(e.to_string()),
    }
}

async fn handle_confirm_key(
    key: KeyEvent,
    app: &mut AppState,
    api: &ApiClient,
) -> anyhow::Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            if let Some(confirm) = app.confirm.take() {
                app.mode = Mode::Normal;
                match api.delete_task(&app.session.token, confirm.id).await {
                    Ok(()) => {
                        app.list.apply_deleted(confirm.id);
                        app.clamp_selection();
                        app.toast = Some(Toast::info("task deleted"));
                        refetch(app, api).await;
                    }
                    Err(e) => app.list.action_failed(e.to_string()),
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.confirm = None;
            app.mode = Mode::Normal;
        }
        _ => {}
    }
    Ok(())
}

/// The re-fetch half of every mutation: the server list overwrites the
/// optimistic patch. A failed re-fetch keeps the optimistic list and
/// surfaces the error; the next action or 'r' tries again.
async fn refetch(app: &mut AppState, api: &ApiClient) {
    match api.list_tasks(&app.session.token).await {
        Ok(tasks) => {
            app.list.reconcile(tasks);
            app.clamp_selection();
        }
        Err(e) => app.list.action_failed(e.to_string()),
    }
}

fn draw(f: &mut Frame<'_>, app: &mut AppState) {
    let area = f.area();

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, root[0], app);
    draw_search(f, root[1], app);
    draw_body(f, root[2], app);
    draw_footer(f, root[3], app);

    if let Some(form) = &app.form {
        draw_task_form(f, form);
    }
    if let Some(dialog) = &app.status_pick {
        draw_status_pick(f, dialog, app);
    }
    if let Some(confirm) = &app.confirm {
        draw_confirm(f, confirm);
    }

    if app.mode == Mode::Searching {
        let inner = Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .inner(root[1]);
        let x = inner.x + u16::try_from(app.search_input.cursor).unwrap_or(0);
        f.set_cursor_position((x, inner.y));
    }
}

fn draw_header(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let welcome = if app.session.name.trim().is_empty() {
        "Welcome!".to_owned()
    } else {
        format!("Welcome, {}!", app.session.name)
    };
    f.render_widget(
        Paragraph::new(Line::from(welcome)).style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    f.render_widget(
        Paragraph::new(Line::from("Taskui"))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

fn draw_search(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let block = Block::default().borders(Borders::ALL).title("Search");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = if app.mode == Mode::Searching {
        app.search_input.as_str()
    } else {
        app.search.as_str()
    };
    let line = if text.is_empty() && app.mode != Mode::Searching {
        Line::from(Span::styled(
            "press / to search title, description, or status",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(text.to_owned())
    };
    f.render_widget(Paragraph::new(line), inner);
}

fn draw_body(f: &mut Frame<'_>, area: Rect, app: &mut AppState) {
    match app.list.state().clone() {
        LoadState::Loading => {
            let p = Paragraph::new("Loading tasks…")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Tasks"));
            f.render_widget(p, area);
        }
        LoadState::Failed(message) => {
            let lines = vec![
                Line::from(Span::styled(
                    format!("Could not load tasks: {message}"),
                    Style::default().fg(Color::Red),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "r retry • L logout • q quit",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            let p = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Tasks"));
            f.render_widget(p, area);
        }
        LoadState::Ready => draw_ready(f, area, app),
    }
}

fn draw_ready(f: &mut Frame<'_>, area: Rect, app: &mut AppState) {
    let visible: Vec<Task> = app
        .list
        .visible(&app.search)
        .into_iter()
        .cloned()
        .collect();

    if visible.is_empty() {
        // Dedicated empty state: zero task cards.
        let message = if app.search.trim().is_empty() {
            "No tasks yet. Press 'n' to add one.".to_owned()
        } else {
            format!("No tasks match '{}'.", app.search.trim())
        };
        let p = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Tasks"));
        f.render_widget(p, area);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_task_table(f, layout[0], app, &visible);
    draw_task_detail(f, layout[1], app, &visible);
}

fn draw_task_table(f: &mut Frame<'_>, area: Rect, app: &mut AppState, visible: &[Task]) {
    let headers = Row::new(vec!["ID", "STATUS", "TITLE", "UPDATED"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = visible.iter().map(|t| {
        let mut status = t.status.label().to_owned();
        if app.cfg.ui.icons {
            status = format!("{} {status}", t.status.icon());
        }
        Row::new(vec![
            Cell::from(t.id.to_string()),
            Cell::from(status).style(status_style(t.status)),
            Cell::from(t.title.clone()),
            Cell::from(format_timestamp(&t.updated_at, &app.cfg.ui.date_format)),
        ])
    });

    let table = Table::new(
        rows,
        vec![
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Min(10),
            Constraint::Length(17),
        ],
    )
    .header(headers)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Tasks ({})", visible.len())),
    )
    .row_highlight_style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_task_detail(f: &mut Frame<'_>, area: Rect, app: &AppState, visible: &[Task]) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let idx = app.selected_index().min(visible.len() - 1);
    let t = &visible[idx];

    let lines = vec![
        Line::from(vec![
            Span::styled("Title: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(&t.title),
        ]),
        Line::from(vec![
            Span::styled("Status: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(t.status.label(), status_style(t.status)),
        ]),
        Line::from(format!(
            "Created: {}",
            format_timestamp(&t.created_at, &app.cfg.ui.date_format)
        )),
        Line::from(format!(
            "Updated: {}",
            format_timestamp(&t.updated_at, &app.cfg.ui.date_format)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Description:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(if t.description.trim().is_empty() {
            "-".to_owned()
        } else {
            t.description.clone()
        }),
    ];

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let mut left = match app.mode {
        Mode::Normal => {
            "q quit • j/k move • / search • n new • e edit • s status • Space cycle • d delete • r refresh • L logout"
                .to_owned()
        }
        Mode::Searching => "Enter apply • Esc cancel".to_owned(),
        Mode::TaskForm => {
            "Enter save • Tab next field • Space cycle status • Esc cancel".to_owned()
        }
        Mode::StatusPick => "j/k move • Enter apply • Esc cancel".to_owned(),
        Mode::Confirm => "y delete • n cancel".to_owned(),
    };

    let mut style = Style::default().fg(Color::White).bg(Color::Blue);
    if let Some(err) = app.list.action_error() {
        left = format!("Error: {err} (Esc to dismiss)");
        style = Style::default().fg(Color::White).bg(Color::Red);
    } else if let Some(toast) = &app.toast {
        left.clone_from(&toast.message);
    }

    let p = Paragraph::new(Line::from(Span::styled(left, style)))
        .style(Style::default().bg(style.bg.unwrap_or(Color::Blue)));
    f.render_widget(p, area);
}

fn draw_task_form(f: &mut Frame<'_>, form: &TaskFormDialog) {
    let area = centered_rect(70, 50, f.area());
    f.render_widget(Clear, area);
    let title = if form.editing.is_some() {
        "Edit task"
    } else {
        "New task"
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let field_style = |active: bool| {
        if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let status_text = form
        .status
        .map_or("< select >".to_owned(), |s| format!("< {} >", s.as_wire()));

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Title:       ", field_style(form.field == FormField::Title)),
            Span::raw(form.title.as_str().to_owned()),
        ]),
        Line::from(vec![
            Span::styled(
                "Description: ",
                field_style(form.field == FormField::Description),
            ),
            Span::raw(form.description.as_str().to_owned()),
        ]),
        Line::from(vec![
            Span::styled("Status:      ", field_style(form.field == FormField::Status)),
            Span::raw(status_text),
        ]),
    ];

    if let Some(err) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    if form.field != FormField::Status {
        let (row, input) = match form.field {
            FormField::Title => (0u16, &form.title),
            _ => (1u16, &form.description),
        };
        let x = inner.x + 13 + u16::try_from(input.cursor).unwrap_or(0);
        f.set_cursor_position((x, inner.y + row));
    }
}

fn draw_status_pick(f: &mut Frame<'_>, dialog: &StatusDialog, app: &AppState) {
    let area = centered_rect(40, 30, f.area());
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title("Change status");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = TaskStatus::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let marker = if i == dialog.selected { "▸ " } else { "  " };
            let mut label = s.label().to_owned();
            if app.cfg.ui.icons {
                label = format!("{} {label}", s.icon());
            }
            let style = if i == dialog.selected {
                status_style(*s).add_modifier(Modifier::BOLD)
            } else {
                status_style(*s)
            };
            Line::from(vec![Span::raw(marker.to_owned()), Span::styled(label, style)])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm(f: &mut Frame<'_>, confirm: &ConfirmDelete) {
    let area = centered_rect(60, 25, f.area());
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title("Delete task");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(format!("Delete '{}'?", confirm.title)),
        Line::from("This cannot be undone; the task is removed from the server."),
        Line::from(""),
        Line::from("[y] delete    [n] cancel"),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Pending => Style::default().fg(Color::Yellow),
        TaskStatus::InProgress => Style::default().fg(Color::Blue),
        TaskStatus::Completed => Style::default().fg(Color::Green),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: 1,
            title: "Buy milk".to_owned(),
            description: "from the corner shop".to_owned(),
            status: TaskStatus::Pending,
            created_at: "2024-11-02T09:00:00Z".to_owned(),
            updated_at: "2024-11-02T09:00:00Z".to_owned(),
        }
    }

    fn app_with_form(form: TaskFormDialog) -> AppState {
        let mut app = AppState::new(
            crate::config::Config::default(),
            Session {
                token: "tok".to_owned(),
                name: "Ada".to_owned(),
            },
        );
        app.form = Some(form);
        app.mode = Mode::TaskForm;
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn editing_keys_on_status_field_leave_text_fields_alone() {
        let api = ApiClient::new("http://localhost:1").expect("client");
        let mut form = TaskFormDialog::edit(&sample_task());
        form.field = FormField::Status;
        let mut app = app_with_form(form);

        for code in [
            KeyCode::Backspace,
            KeyCode::Delete,
            KeyCode::Home,
            KeyCode::End,
            KeyCode::Char('x'),
        ] {
            handle_form_key(key(code), &mut app, &api).await.unwrap();
        }

        let form = app.form.as_ref().unwrap();
        assert_eq!(form.title.as_str(), "Buy milk");
        assert_eq!(form.description.as_str(), "from the corner shop");
    }

    #[tokio::test]
    async fn left_and_right_cycle_status_in_opposite_directions() {
        let api = ApiClient::new("http://localhost:1").expect("client");
        let mut form = TaskFormDialog::edit(&sample_task());
        form.field = FormField::Status;
        let mut app = app_with_form(form);

        handle_form_key(key(KeyCode::Right), &mut app, &api)
            .await
            .unwrap();
        assert_eq!(
            app.form.as_ref().unwrap().status,
            Some(TaskStatus::InProgress)
        );

        handle_form_key(key(KeyCode::Left), &mut app, &api)
            .await
            .unwrap();
        assert_eq!(app.form.as_ref().unwrap().status, Some(TaskStatus::Pending));

        handle_form_key(key(KeyCode::Left), &mut app, &api)
            .await
            .unwrap();
        assert_eq!(
            app.form.as_ref().unwrap().status,
            Some(TaskStatus::Completed)
        );
    }

    #[tokio::test]
    async fn typing_still_edits_the_focused_text_field() {
        let api = ApiClient::new("http://localhost:1").expect("client");
        let mut app = app_with_form(TaskFormDialog::create());

        for c in ['H', 'i'] {
            handle_form_key(key(KeyCode::Char(c)), &mut app, &api)
                .await
                .unwrap();
        }
        handle_form_key(key(KeyCode::Backspace), &mut app, &api)
            .await
            .unwrap();

        assert_eq!(app.form.as_ref().unwrap().title.as_str(), "H");
    }
}
