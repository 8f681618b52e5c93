#![forbid(unsafe_code)]

use std::io::Write as _;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, Subcommand};

use crate::api::{ApiClient, NewTask, TaskPatch};
use crate::auth::{LoginForm, RegisterForm};
use crate::config;
use crate::output::format_timestamp;
use crate::output::table::Table;
use crate::session::{Session, SessionStore};
use crate::task::model::{Task, TaskStatus, filter_tasks};
use crate::tui;
use crate::tui::app::AppOutcome;
use crate::tui::login::LoginOutcome;
use crate::tui::picker::{self, PickerItem};

#[derive(Debug, Parser)]
#[command(name = "taskui", version, about = "Terminal client for the task manager")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login(LoginArgs),
    /// Create a new account
    Register(RegisterArgs),
    /// Discard the stored session
    Logout,
    /// Show who is currently logged in
    Whoami,
    /// List tasks
    List(ListArgs),
    /// Create a task
    Add(AddArgs),
    /// Edit a task's title, description, or status
    Edit(EditArgs),
    /// Change a task's status
    Status(StatusArgs),
    #[command(alias = "rm")]
    /// Delete a task
    Remove(RemoveArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Parser)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    pub email: Option<String>,
    /// Password (prompted when omitted)
    #[arg(short = 'p', long = "password")]
    pub password: Option<String>,
}

#[derive(Debug, Parser)]
pub struct RegisterArgs {
    /// Display name (prompted when omitted)
    pub name: Option<String>,
    /// Account email (prompted when omitted)
    #[arg(short = 'e', long = "email")]
    pub email: Option<String>,
    /// Password (prompted when omitted)
    #[arg(short = 'p', long = "password")]
    pub password: Option<String>,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Show description and creation time columns
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    /// Output in JSON format
    #[arg(long = "json")]
    pub json: bool,
    /// Output in CSV format
    #[arg(long = "csv")]
    pub csv: bool,
    /// Keep only tasks with this status
    #[arg(short = 's', long = "status")]
    pub status: Option<String>,
    /// Keep only tasks matching this text
    #[arg(short = 'q', long = "query", default_value = "")]
    pub query: String,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Task description
    #[arg(short = 'd', long = "description", default_value = "")]
    pub description: String,
    /// Initial status (pending, in-progress, completed)
    #[arg(short = 's', long = "status", default_value = "pending")]
    pub status: String,
}

#[derive(Debug, Parser)]
pub struct EditArgs {
    /// Task id (picked interactively when omitted)
    pub id: Option<i64>,
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,
    /// New status (pending, in-progress, completed)
    #[arg(short = 's', long = "status")]
    pub status: Option<String>,
}

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// New status (pending, in-progress, completed)
    pub status: String,
    /// Task id (picked interactively when omitted)
    pub id: Option<i64>,
}

#[derive(Debug, Parser)]
pub struct RemoveArgs {
    /// Task id (picked interactively when omitted)
    pub id: Option<i64>,
    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    /// Print the resolved configuration as TOML
    List,
    /// Set a configuration value
    Set(ConfigSetArgs),
    /// Get a configuration value
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

pub async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        None => cmd_default().await,
        Some(Commands::Completion(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "taskui", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config(args)) => match args.cmd {
            ConfigCmd::List => {
                print!("{}", config::list_resolved_toml()?);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Set(set) => {
                config::set_value_string(&set.key, &set.value)?;
                println!("Set {} = {}", set.key, set.value);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Get(get) => {
                let val = config::get_value_string(&get.key)?;
                match val {
                    Some(v) => {
                        println!("{v}");
                        Ok(ExitCode::SUCCESS)
                    }
                    None => anyhow::bail!(
                        "configuration key '{}' not found - use 'taskui config list' to see available keys",
                        get.key
                    ),
                }
            }
        },
        Some(Commands::Login(args)) => cmd_login(args).await,
        Some(Commands::Register(args)) => cmd_register(args).await,
        Some(Commands::Logout) => cmd_logout().await,
        Some(Commands::Whoami) => cmd_whoami().await,
        Some(Commands::List(args)) => cmd_list(args).await,
        Some(Commands::Add(args)) => cmd_add(args).await,
        Some(Commands::Edit(args)) => cmd_edit(args).await,
        Some(Commands::Status(args)) => cmd_status(args).await,
        Some(Commands::Remove(args)) => cmd_remove(args).await,
        Some(Commands::Version) => Ok(cmd_version()),
    }
}

async fn load_cfg() -> anyhow::Result<crate::config::Config> {
    let cfg = tokio::task::spawn_blocking(config::load).await??;
    Ok(cfg)
}

fn session_store(cfg: &crate::config::Config) -> anyhow::Result<SessionStore> {
    let path = config::expand_path(&cfg.session.file)?;
    Ok(SessionStore::new(path))
}

fn client(cfg: &crate::config::Config) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::new(cfg.api.base_url.clone())?)
}

/// No subcommand: the interactive session. The login screen and the task
/// board alternate until the user quits; a logout from the board clears the
/// stored session and drops back to the login screen.
async fn cmd_default() -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let api = client(&cfg)?;
    let store = session_store(&cfg)?;

    if !tui::is_tty() {
        // Non-TTY fallback: a single plain task listing.
        let session = store.require()?;
        let tasks = api.list_tasks(&session.token).await?;
        print_task_table(&cfg, &tasks, false)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut session = store.load();
    loop {
        let current = match session.take() {
            Some(s) => s,
            None => match tui::login::run(&api).await? {
                LoginOutcome::LoggedIn(s) => {
                    store.save(&s)?;
                    s
                }
                LoginOutcome::Quit => return Ok(ExitCode::SUCCESS),
            },
        };

        match tui::app::run(cfg.clone(), &api, current).await? {
            AppOutcome::Quit => return Ok(ExitCode::SUCCESS),
            AppOutcome::Logout => {
                store.clear()?;
            }
        }
    }
}

async fn cmd_login(args: LoginArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let api = client(&cfg)?;
    let store = session_store(&cfg)?;

    let email = match args.email {
        Some(e) => e,
        None => prompt("Email: ")?,
    };
    let password = match args.password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    let form = LoginForm { email, password };
    bail_on_field_errors(&form.validate())?;

    let creds = api.login(&form.email, &form.password).await?;
    let session = Session {
        token: creds.token,
        name: creds.name,
    };
    store.save(&session)?;
    println!("Logged in as {}", session.name);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_register(args: RegisterArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let api = client(&cfg)?;

    let name = match args.name {
        Some(n) => n,
        None => prompt("Name: ")?,
    };
    let email = match args.email {
        Some(e) => e,
        None => prompt("Email: ")?,
    };
    let password = match args.password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    let form = RegisterForm {
        name,
        email,
        password,
    };
    bail_on_field_errors(&form.validate())?;

    api.register(&form.name, &form.email, &form.password).await?;
    println!("Account created - log in with 'taskui login {}'", form.email);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_logout() -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let store = session_store(&cfg)?;
    store.clear()?;
    println!("Logged out");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_whoami() -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let store = session_store(&cfg)?;
    let session = store.require()?;
    println!("{}", session.name);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_list(args: ListArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let api = client(&cfg)?;
    let session = session_store(&cfg)?.require()?;

    let mut tasks = api.list_tasks(&session.token).await?;

    if let Some(status) = &args.status {
        let want = TaskStatus::parse(status).map_err(anyhow::Error::msg)?;
        tasks.retain(|t| t.status == want);
    }
    if !args.query.trim().is_empty() {
        tasks = filter_tasks(&tasks, &args.query)
            .into_iter()
            .cloned()
            .collect();
    }

    if args.json {
        let mut out = serde_json::to_string_pretty(&tasks)?;
        out.push('\n');
        print!("{out}");
        return Ok(ExitCode::SUCCESS);
    }

    if args.csv {
        task_table(&cfg, &tasks, args.verbose).write_csv()?;
        return Ok(ExitCode::SUCCESS);
    }

    print_task_table(&cfg, &tasks, args.verbose)?;
    Ok(ExitCode::SUCCESS)
}

async fn cmd_add(args: AddArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let api = client(&cfg)?;
    let session = session_store(&cfg)?.require()?;

    let status = TaskStatus::parse(&args.status).map_err(anyhow::Error::msg)?;
    let title = args.title.trim();
    if title.is_empty() {
        anyhow::bail!("title cannot be empty");
    }

    let task = api
        .create_task(
            &session.token,
            &NewTask {
                title,
                description: &args.description,
                status,
            },
        )
        .await?;
    println!("Created task {} '{}'", task.id, task.title);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_edit(args: EditArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let api = client(&cfg)?;
    let session = session_store(&cfg)?.require()?;

    if args.title.is_none() && args.description.is_none() && args.status.is_none() {
        anyhow::bail!("nothing to change - pass at least one of --title, --description, --status");
    }
    if let Some(title) = &args.title
        && title.trim().is_empty()
    {
        anyhow::bail!("title cannot be empty");
    }

    let status = args
        .status
        .as_deref()
        .map(TaskStatus::parse)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let id = resolve_task_id(&cfg, &api, &session, args.id, "Edit task").await?;
    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        status,
    };
    api.update_task(&session.token, id, &patch).await?;
    println!("Updated task {id}");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_status(args: StatusArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let api = client(&cfg)?;
    let session = session_store(&cfg)?.require()?;

    let status = TaskStatus::parse(&args.status).map_err(anyhow::Error::msg)?;
    let id = resolve_task_id(&cfg, &api, &session, args.id, "Change status").await?;

    api.update_task_status(&session.token, id, status).await?;
    println!("Task {id} is now {}", status.label());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_remove(args: RemoveArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let api = client(&cfg)?;
    let session = session_store(&cfg)?.require()?;

    let id = resolve_task_id(&cfg, &api, &session, args.id, "Delete task").await?;

    if !args.yes {
        let answer = prompt(&format!("Delete task {id}? [y/N] "))?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted");
            return Ok(ExitCode::SUCCESS);
        }
    }

    api.delete_task(&session.token, id).await?;
    println!("Deleted task {id}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_version() -> ExitCode {
    println!("taskui version {}", env!("CARGO_PKG_VERSION"));
    if let Some(commit) = option_env!("TASKUI_GIT_COMMIT") {
        println!("  commit: {commit}");
    }
    println!("  rust: {}", rustc_version_runtime::version());
    println!(
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    ExitCode::SUCCESS
}

/// Takes an explicit id when given, otherwise opens the picker over the
/// current server list.
async fn resolve_task_id(
    cfg: &crate::config::Config,
    api: &ApiClient,
    session: &Session,
    id: Option<i64>,
    title: &str,
) -> anyhow::Result<i64> {
    if let Some(id) = id {
        return Ok(id);
    }

    let tasks = api.list_tasks(&session.token).await?;
    if tasks.is_empty() {
        anyhow::bail!("no tasks to choose from");
    }

    let items: Vec<PickerItem> = tasks
        .iter()
        .map(|t| PickerItem {
            title: format!("#{} [{}] {}", t.id, t.status.label(), t.title),
            preview: task_preview(cfg, t),
        })
        .collect();
    let idx = picker::pick_one(title, &items)?;
    Ok(tasks[idx].id)
}

fn task_preview(cfg: &crate::config::Config, task: &Task) -> String {
    format!(
        "Title: {}\nStatus: {}\nCreated: {}\nUpdated: {}\n\nDescription:\n{}",
        task.title,
        task.status.label(),
        format_timestamp(&task.created_at, &cfg.ui.date_format),
        format_timestamp(&task.updated_at, &cfg.ui.date_format),
        if task.description.trim().is_empty() {
            "-"
        } else {
            task.description.as_str()
        }
    )
}

fn task_table(cfg: &crate::config::Config, tasks: &[Task], verbose: bool) -> Table {
    let mut t = if verbose {
        Table::new(["ID", "STATUS", "TITLE", "DESCRIPTION", "CREATED", "UPDATED"])
    } else {
        Table::new(["ID", "STATUS", "TITLE", "UPDATED"])
    };
    for task in tasks {
        let mut status = task.status.label().to_owned();
        if cfg.ui.icons {
            status = format!("{} {status}", task.status.icon());
        }
        if verbose {
            t.row([
                task.id.to_string(),
                status,
                task.title.clone(),
                task.description.clone(),
                format_timestamp(&task.created_at, &cfg.ui.date_format),
                format_timestamp(&task.updated_at, &cfg.ui.date_format),
            ]);
        } else {
            t.row([
                task.id.to_string(),
                status,
                task.title.clone(),
                format_timestamp(&task.updated_at, &cfg.ui.date_format),
            ]);
        }
    }
    t
}

fn print_task_table(
    cfg: &crate::config::Config,
    tasks: &[Task],
    verbose: bool,
) -> anyhow::Result<()> {
    if tasks.is_empty() {
        println!("No tasks found");
        return Ok(());
    }
    task_table(cfg, tasks, verbose).print()?;
    Ok(())
}

fn bail_on_field_errors(errors: &[crate::auth::FieldError]) -> anyhow::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let mut msg = String::from("invalid input:");
    for e in errors {
        msg.push_str(&format!("\n  {}: {}", e.field, e.message));
    }
    anyhow::bail!(msg)
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_list_flags() {
        let cli = Cli::parse_from(["taskui", "list", "--json", "-s", "pending", "-q", "report"]);
        let Some(Commands::List(args)) = cli.cmd else {
            panic!("expected list command");
        };
        assert!(args.json);
        assert_eq!(args.status.as_deref(), Some("pending"));
        assert_eq!(args.query, "report");
    }

    #[test]
    fn cli_parses_rm_alias() {
        let cli = Cli::parse_from(["taskui", "rm", "7", "-y"]);
        let Some(Commands::Remove(args)) = cli.cmd else {
            panic!("expected remove command");
        };
        assert_eq!(args.id, Some(7));
        assert!(args.yes);
    }

    #[test]
    fn cli_defaults_to_tui() {
        let cli = Cli::parse_from(["taskui"]);
        assert!(cli.cmd.is_none());
    }

    #[test]
    fn status_requires_value() {
        assert!(Cli::try_parse_from(["taskui", "status"]).is_err());
        let cli = Cli::parse_from(["taskui", "status", "done", "3"]);
        let Some(Commands::Status(args)) = cli.cmd else {
            panic!("expected status command");
        };
        assert_eq!(args.status, "done");
        assert_eq!(args.id, Some(3));
    }
}
