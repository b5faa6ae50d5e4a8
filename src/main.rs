mod app;
mod event;
mod ui;

/// Version injected at compile time via TERP_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("TERP_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use app::{App, Task};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use serde_json::Value;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use terp::config::{Config, ConnectionOverrides};
use terp::data::DataAccess;
use terp::erp::{
    format_erp_error, CredentialStore, ErpClient, FileCredentialStore, ListQuery,
    MemoryCredentialStore,
};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use ui::splash::{render as render_splash, InitStep, SplashState};

/// Terminal UI and client for ERPNext
#[derive(Parser, Debug)]
#[command(name = "terp", version, about, long_about = None)]
struct Args {
    /// ERP base URL (overrides ERPNEXT_URL and the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// API key for token authentication
    #[arg(long)]
    api_key: Option<String>,

    /// API secret for token authentication
    #[arg(long)]
    api_secret: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Run in read-only mode (block all write operations)
    #[arg(long)]
    readonly: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// One-shot commands; without one the terminal UI starts
#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and keep the session token
    ///
    /// The password is taken from ERPNEXT_PASSWORD, a line on piped stdin,
    /// or an interactive prompt.
    Login { username: String },
    /// End the session and forget the token
    Logout,
    /// List documents of a doctype
    List {
        doctype: String,
        /// Comma-separated field names
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        /// Filters as JSON
        #[arg(long)]
        filters: Option<String>,
        /// Maximum number of records
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a single document
    Get { doctype: String, name: String },
    /// Invoke a whitelisted server method
    Call {
        method: String,
        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("terp {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("terp").join("terp.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".terp").join("terp.log");
    }
    PathBuf::from("terp.log")
}

fn credential_store() -> Arc<dyn CredentialStore> {
    match FileCredentialStore::default_path() {
        Some(path) => Arc::new(FileCredentialStore::new(path)),
        None => {
            tracing::warn!("No config directory, session will not be persisted");
            Arc::new(MemoryCredentialStore::new())
        },
    }
}

fn build_client(args: &Args, config: &Config) -> Result<ErpClient> {
    let overrides = ConnectionOverrides {
        url: args.url.clone(),
        api_key: args.api_key.clone(),
        api_secret: args.api_secret.clone(),
        timeout_secs: args.timeout,
    };
    let connection = config.effective_connection(&overrides);
    tracing::info!("Using ERP endpoint: {:?}", connection.base_endpoint);
    Ok(ErpClient::new(connection, credential_store())?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Some(command) = &args.command {
        return run_command(&args, command).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initialize and run
    let result = initialize_with_splash(&mut terminal, &args).await;

    match result {
        Ok(Some(mut app)) => {
            let run_result = run_app(&mut terminal, &mut app).await;
            cleanup_terminal(&mut terminal)?;

            if let Err(err) = run_result {
                eprintln!("Error: {err:?}");
            }
        },
        Ok(None) => {
            cleanup_terminal(&mut terminal)?;
        },
        Err(err) => {
            cleanup_terminal(&mut terminal)?;
            eprintln!("Initialization error: {err:?}");
        },
    }

    Ok(())
}

fn parse_json_arg(name: &str, raw: &Option<String>) -> Result<Option<Value>> {
    raw.as_deref()
        .map(|s| serde_json::from_str(s).with_context(|| format!("--{} is not valid JSON", name)))
        .transpose()
}

/// Environment variable consulted by `terp login` before prompting
const ENV_PASSWORD: &str = "ERPNEXT_PASSWORD";

fn login_password() -> Result<String> {
    if let Some(password) = std::env::var(ENV_PASSWORD).ok().filter(|s| !s.is_empty()) {
        return Ok(password);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        prompt_password("Password: ")
    } else {
        read_password_line(stdin.lock())
    }
}

fn read_password_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line).context("Failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("No password given");
    }
    Ok(password)
}

/// Read a password from the terminal without echoing it
fn prompt_password(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;

    enable_raw_mode()?;
    let result = read_hidden_line();
    disable_raw_mode()?;
    eprintln!();

    let password = result?;
    if password.is_empty() {
        anyhow::bail!("No password given");
    }
    Ok(password)
}

fn read_hidden_line() -> Result<String> {
    let mut password = String::new();
    loop {
        let Event::Key(key) = read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Esc => anyhow::bail!("Login cancelled"),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                anyhow::bail!("Login cancelled")
            },
            KeyCode::Backspace => {
                password.pop();
            },
            KeyCode::Char(c) => password.push(c),
            _ => {},
        }
    }
}

async fn run_command(args: &Args, command: &Command) -> Result<()> {
    let config = Config::load();
    let client = build_client(args, &config)?;

    let result = match command {
        Command::Login { username } => {
            let password = login_password()?;
            client.login(username, &password).await
        },
        Command::Logout => client.logout().await,
        Command::List {
            doctype,
            fields,
            filters,
            limit,
        } => {
            let mut query = ListQuery::new(doctype);
            if let Some(fields) = fields {
                query = query.fields(fields);
            }
            if let Some(filters) = parse_json_arg("filters", filters)? {
                query = query.filters(filters);
            }
            if let Some(limit) = limit {
                query = query.limit(*limit);
            }
            client.get_list(&query).await
        },
        Command::Get { doctype, name } => client.get_doc(doctype, name).await,
        Command::Call { method, args: call_args } => {
            let call_args = parse_json_arg("args", call_args)?;
            client.call_method(method, call_args.as_ref()).await
        },
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        },
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            Err(anyhow::anyhow!(format_erp_error(&e)))
        },
    }
}

fn cleanup_terminal<B: Backend + std::io::Write>(terminal: &mut Terminal<B>) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn initialize_with_splash<B: Backend>(
    terminal: &mut Terminal<B>,
    args: &Args,
) -> Result<Option<App>>
where
    B::Error: Send + Sync + 'static,
{
    let mut splash = SplashState::new();

    // Render initial splash
    terminal.draw(|f| render_splash(f, &splash))?;

    if check_abort()? {
        return Ok(None);
    }

    // Step 1: Load configuration
    splash.begin(InitStep::Config, "reading config.json");
    terminal.draw(|f| render_splash(f, &splash))?;

    let config = Config::load();
    let entity = config.effective_entity();
    splash.finish(format!("start with {}", entity.display_name().to_lowercase()));

    if check_abort()? {
        return Ok(None);
    }

    // Step 2: Build the client
    splash.begin(InitStep::Client, "building client");
    terminal.draw(|f| render_splash(f, &splash))?;

    let client = build_client(args, &config)?;
    if client.config().has_valid_endpoint() {
        splash.finish(client.base_endpoint().to_string());
    } else {
        splash.warn("no valid endpoint configured (--url or ERPNEXT_URL)");
    }

    if check_abort()? {
        return Ok(None);
    }

    // Step 3: Check who we are
    splash.begin(
        InitStep::Session,
        format!("checking {} credentials", client.auth_method().display_name()),
    );
    terminal.draw(|f| render_splash(f, &splash))?;

    let user = match client.logged_user().await {
        Ok(user) => {
            tracing::info!("Logged in as {}", user);
            splash.finish(format!("logged in as {}", user));
            Some(user)
        },
        Err(e) => {
            tracing::warn!("Session check failed: {}", e);
            splash.warn(format_erp_error(&e));
            None
        },
    };

    if check_abort()? {
        return Ok(None);
    }

    // Step 4: Fetch initial data
    splash.begin(InitStep::FirstList, format!("fetching {}", entity.doctype()));
    terminal.draw(|f| render_splash(f, &splash))?;

    let mut app = App::from_initialized(DataAccess::new(client), entity, config, user, args.readonly);
    app.load_current().await;

    match &app.list.is_error {
        Some(err) => splash.warn(format_erp_error(err)),
        None => splash.finish(format!("{} records", app.list.records.len())),
    }
    terminal.draw(|f| render_splash(f, &splash))?;

    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(Some(app))
}

fn check_abort() -> Result<bool> {
    if poll(Duration::from_millis(50))? {
        if let Event::Key(key) = read()? {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Network work runs after the frame showing its loading state
        if let Some(task) = app.take_pending_task() {
            let refreshing_list = matches!(task, Task::LoadList | Task::RefreshList);
            app.run_task(task).await;
            if refreshing_list {
                app.ensure_visible();
            }
            continue;
        }

        if event::handle_events(app).await? {
            return Ok(());
        }
    }
}
