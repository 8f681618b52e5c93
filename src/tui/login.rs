#![forbid(unsafe_code)]

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::api::ApiClient;
use crate::auth::{FieldError, LoginForm, RegisterForm};
use crate::session::Session;
use crate::tui;
use crate::tui::TerminalGuard;
use crate::tui::input::TextInput;

/// What the auth screen produced: a fresh session, or the user quit.
#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn(Session),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Email,
    Password,
}

struct FormState {
    screen: Screen,
    name: TextInput,
    email: TextInput,
    password: TextInput,
    field: Field,
    field_errors: Vec<FieldError>,
    server_error: Option<String>,
    info: Option<String>,
}

impl FormState {
    fn new() -> Self {
        Self {
            screen: Screen::Login,
            name: TextInput::new(""),
            email: TextInput::new(""),
            password: TextInput::new(""),
            field: Field::Email,
            field_errors: Vec::new(),
            server_error: None,
            info: None,
        }
    }

    fn fields(&self) -> &'static [Field] {
        match self.screen {
            Screen::Login => &[Field::Email, Field::Password],
            Screen::Register => &[Field::Name, Field::Email, Field::Password],
        }
    }

    fn next_field(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(idx + 1) % fields.len()];
    }

    fn active_input_mut(&mut self) -> &mut TextInput {
        match self.field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    fn error_for(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Switch screens; entered values persist, stale errors do not.
    fn switch_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.field = match screen {
            Screen::Login => Field::Email,
            Screen::Register => Field::Name,
        };
        self.field_errors.clear();
        self.server_error = None;
        self.info = None;
    }
}

/// Runs the login/registration forms until a session is established or the
/// user gives up. Successful registration drops back to the login form; a
/// session is only created by logging in.
pub async fn run(api: &ApiClient) -> anyhow::Result<LoginOutcome> {
    let terminal = tui::init_terminal()?;
    let mut guard = TerminalGuard::new(terminal);

    let mut form = FormState::new();

    loop {
        {
            let Some(terminal) = guard.terminal.as_mut() else {
                anyhow::bail!("terminal unavailable");
            };
            terminal.draw(|f| draw(f, &form))?;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match handle_key(key, &mut form, api).await? {
            Some(outcome) => return Ok(outcome),
            None => {}
        }
    }
}

async fn handle_key(
    key: KeyEvent,
    form: &mut FormState,
    api: &ApiClient,
) -> anyhow::Result<Option<LoginOutcome>> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Ok(Some(LoginOutcome::Quit)),
            KeyCode::Char('r') => {
                form.switch_to(match form.screen {
                    Screen::Login => Screen::Register,
                    Screen::Register => Screen::Login,
                });
                return Ok(None);
            }
            _ => return Ok(None),
        }
    }

    match key.code {
        KeyCode::Esc => return Ok(Some(LoginOutcome::Quit)),
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => {
            // Cycling backwards is just cycling forwards n-1 times.
            for _ in 1..form.fields().len() {
                form.next_field();
            }
        }
        KeyCode::Enter => return submit(form, api).await,
        KeyCode::Left => form.active_input_mut().move_left(),
        KeyCode::Right => form.active_input_mut().move_right(),
        KeyCode::Home => form.active_input_mut().move_home(),
        KeyCode::End => form.active_input_mut().move_end(),
        KeyCode::Backspace => form.active_input_mut().backspace(),
        KeyCode::Delete => form.active_input_mut().delete(),
        KeyCode::Char(c) => form.active_input_mut().insert_char(c),
        _ => {}
    }

    Ok(None)
}

async fn submit(form: &mut FormState, api: &ApiClient) -> anyhow::Result<Option<LoginOutcome>> {
    form.server_error = None;
    form.info = None;

    match form.screen {
        Screen::Login => {
            let login = LoginForm {
                email: form.email.as_str().to_owned(),
                password: form.password.as_str().to_owned(),
            };
            form.field_errors = login.validate();
            if !form.field_errors.is_empty() {
                return Ok(None);
            }

            match api.login(&login.email, &login.password).await {
                Ok(creds) => {
                    return Ok(Some(LoginOutcome::LoggedIn(Session {
                        token: creds.token,
                        name: creds.name,
                    })));
                }
                Err(e) => {
                    // Entered values stay put so the user can correct and resubmit.
                    form.server_error = Some(e.to_string());
                }
            }
        }
        Screen::Register => {
            let register = RegisterForm {
                name: form.name.as_str().to_owned(),
                email: form.email.as_str().to_owned(),
                password: form.password.as_str().to_owned(),
            };
            form.field_errors = register.validate();
            if !form.field_errors.is_empty() {
                return Ok(None);
            }

            match api
                .register(&register.name, &register.email, &register.password)
                .await
            {
                Ok(()) => {
                    let email = form.email.as_str().to_owned();
                    form.switch_to(Screen::Login);
                    form.email = TextInput::new(email);
                    form.password = TextInput::new("");
                    form.field = Field::Password;
                    form.info = Some("account created - log in to continue".to_owned());
                }
                Err(e) => {
                    form.server_error = Some(e.to_string());
                }
            }
        }
    }

    Ok(None)
}

fn draw(f: &mut Frame<'_>, form: &FormState) {
    let area = f.area();
    let card = centered_rect(60, 70, area);

    let title = match form.screen {
        Screen::Login => "Taskui - sign in",
        Screen::Register => "Taskui - create account",
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(card);
    f.render_widget(block, card);

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor: Option<(u16, u16)> = None;

    if form.screen == Screen::Register {
        push_field(
            &mut lines,
            &mut cursor,
            inner,
            "Name:     ",
            form.name.as_str(),
            form.name.cursor,
            form.field == Field::Name,
            form.error_for("name"),
            false,
        );
    }
    push_field(
        &mut lines,
        &mut cursor,
        inner,
        "Email:    ",
        form.email.as_str(),
        form.email.cursor,
        form.field == Field::Email,
        form.error_for("email"),
        false,
    );
    push_field(
        &mut lines,
        &mut cursor,
        inner,
        "Password: ",
        form.password.as_str(),
        form.password.cursor,
        form.field == Field::Password,
        form.error_for("password"),
        true,
    );

    lines.push(Line::from(""));
    if let Some(err) = &form.server_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(info) = &form.info {
        lines.push(Line::from(Span::styled(
            info.clone(),
            Style::default().fg(Color::Green),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        match form.screen {
            Screen::Login => "Enter submit • Tab next field • Ctrl-R register • Esc quit",
            Screen::Register => "Enter submit • Tab next field • Ctrl-R back to login • Esc quit",
        },
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    if let Some((x, y)) = cursor {
        f.set_cursor_position((x, y));
    }
}

#[allow(clippy::too_many_arguments)]
fn push_field(
    lines: &mut Vec<Line<'_>>,
    cursor: &mut Option<(u16, u16)>,
    inner: Rect,
    label: &'static str,
    value: &str,
    input_cursor: usize,
    active: bool,
    error: Option<&str>,
    mask: bool,
) {
    let shown = if mask {
        "•".repeat(value.chars().count())
    } else {
        value.to_owned()
    };

    let label_style = if active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let row = u16::try_from(lines.len()).unwrap_or(0);
    lines.push(Line::from(vec![
        Span::styled(label, label_style),
        Span::raw(shown),
    ]));

    if active {
        let x = inner.x
            + u16::try_from(label.chars().count()).unwrap_or(0)
            + u16::try_from(input_cursor).unwrap_or(0);
        *cursor = Some((x, inner.y + row));
    }

    if let Some(msg) = error {
        lines.push(Line::from(Span::styled(
            format!("  {msg}"),
            Style::default().fg(Color::Red),
        )));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
