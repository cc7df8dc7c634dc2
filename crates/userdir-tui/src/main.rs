//! userdir - a terminal client for a remote user directory.
//!
//! The list is fetched once at startup and every add, edit and delete is
//! applied to the local cache before the server answers, then reverted if the
//! request fails.

mod app;
mod ui;
mod utils;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use userdir_core::{Config, DirectoryClient, HttpDirectoryClient};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name prefix inside the cache directory
const LOG_FILE: &str = "userdir.log";

const USAGE: &str = "\
Usage: userdir [OPTIONS]

Options:
      --dump         Fetch the user list once and print it as JSON
      --init-config  Write the effective configuration to the config file
  -h, --help         Print this help
  -V, --version      Print the version

Environment:
  USERDIR_BASE_URL   Override the directory collection URL
  RUST_LOG           Log filter (default: warn)";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to a daily file in the cache directory; the terminal belongs to the UI.
fn init_file_tracing(config: &Config) -> Result<WorkerGuard> {
    let dir = config.cache_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();

    Ok(guard)
}

fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Load config, falling back to defaults when the file is unreadable.
fn load_config() -> (Config, Option<anyhow::Error>) {
    match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some("-V") | Some("--version") => {
            println!("userdir {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("--dump") => {
            init_stderr_tracing();
            let (config, load_error) = load_config();
            if let Some(e) = load_error {
                warn!(error = %e, "Using default configuration");
            }
            return dump_users(&config).await;
        }
        Some("--init-config") => {
            let (config, load_error) = load_config();
            if let Some(e) = load_error {
                eprintln!("Warning: {:#}; writing defaults", e);
            }
            config.effective().save()?;
            println!("Configuration written");
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown argument: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
        None => {}
    }

    let (config, load_error) = load_config();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = match init_file_tracing(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {:#}", e);
            None
        }
    };
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!("userdir starting");

    // Create app before touching the terminal so errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("userdir shutting down");
    Ok(())
}

/// Fetch the user list once and print it to stdout as JSON
async fn dump_users(config: &Config) -> Result<()> {
    let base_url = config.base_url();
    eprintln!("Fetching users from {}...", base_url);

    let client = HttpDirectoryClient::new(base_url.as_str(), config.request_timeout())?;
    let users = client
        .list()
        .await
        .with_context(|| format!("Failed to fetch users from {}", base_url))?;

    let json = serde_json::to_string_pretty(&users)?;
    println!("{}", json);

    eprintln!("Done! {} users exported.", users.len());
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
