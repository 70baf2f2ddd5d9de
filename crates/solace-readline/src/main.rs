use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use solace_application::WellnessEngine;
use solace_core::config::EngineConfig;
use solace_core::conversation::{ChatMessage, Sender};
use solace_core::error::SolaceError;
use solace_core::store::{DurableStore, MemoryStore};
use solace_infrastructure::{ConfigService, FileStore, SolacePaths};

mod commands;

use commands::{BreatheAction, COMMANDS, Command, HELP};

#[derive(Parser)]
#[command(name = "solace")]
#[command(about = "Solace - a local-first wellness companion", long_about = None)]
struct Cli {
    /// Keep config, store and logs under this directory instead of the platform defaults
    #[arg(long)]
    home: Option<PathBuf>,

    /// Path to an alternative config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep everything in memory; nothing is read from or written to disk
    #[arg(long)]
    ephemeral: bool,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Installs a daily-rolling file subscriber so log lines never interleave
/// with the prompt. The returned guard flushes on drop.
fn init_logging(config: &EngineConfig, logs_dir: &Path) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log filter")?;

    let appender = tracing_appender::rolling::daily(logs_dir, "solace.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn print_notice(error: &SolaceError) {
    match error {
        SolaceError::Validation(_) | SolaceError::Conflict(_) | SolaceError::Auth => {
            println!("{}", error.notice().yellow());
        }
        _ if error.is_persistence() => {
            eprintln!("{}", error.notice().yellow());
        }
        _ => eprintln!("{}", error.notice().red()),
    }
}

fn print_message(message: &ChatMessage) {
    let stamp = message.timestamp.with_timezone(&chrono::Local).format("%H:%M");
    match message.sender {
        Sender::User => println!("{} {}", stamp.to_string().bright_black(), message.text.green()),
        Sender::Agent => {
            println!("{}", stamp.to_string().bright_black());
            for line in message.text.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }
}

fn print_breathing(engine: &WellnessEngine) {
    let s = engine.breathing().snapshot();
    let state = if s.active { "running".green() } else { "paused".yellow() };
    let bar_width = 20;
    let filled = (s.expansion * bar_width as f64).round() as usize;
    println!(
        "{} [{}{}] {:.1}s left  cycles: {}  ({})",
        s.instruction.bright_magenta(),
        "#".repeat(filled),
        " ".repeat(bar_width - filled.min(bar_width)),
        s.remaining,
        s.completed_cycles,
        state
    );
}

/// Runs one command. Returns `false` when the REPL should exit.
fn dispatch(engine: &WellnessEngine, command: Command) -> bool {
    let outcome = match command {
        Command::Quit => return false,
        Command::Help => {
            println!("{}", HELP.bright_black());
            Ok(())
        }
        Command::Register { name, password } => engine.register(&name, &password).map(|account| {
            println!("{}", format!("Welcome, {}!", account.name).bright_green());
        }),
        Command::Login { name, password } => engine.login(&name, &password).map(|account| {
            println!(
                "{}",
                format!("Welcome back, {}. {} day streak.", account.name, account.streak_days)
                    .bright_green()
            );
        }),
        Command::Logout => engine.logout().map(|()| println!("{}", "Logged out.".bright_black())),
        Command::Profile { new_name: Some(name) } => engine.update_profile(&name).map(|account| {
            println!("{}", format!("Profile updated: {}", account.name).bright_green());
        }),
        Command::Profile { new_name: None } => {
            match engine.current_user() {
                Some(account) => println!(
                    "{} ({}) {} day streak",
                    account.name.bold(),
                    account.initial().map(String::from).unwrap_or_default(),
                    account.streak_days
                ),
                None => println!("{}", "Not logged in.".bright_black()),
            }
            Ok(())
        }
        Command::RecordMood { mood, notes } => engine
            .record_mood(mood.or_else(|| engine.current_mood()), notes.as_deref())
            .map(|entry| {
                if let Some(mood) = entry.mood {
                    println!("{}", format!("Recorded {} {}", mood.emoji(), mood.label()).bright_green());
                }
            }),
        Command::SelectMood(mood) => {
            engine.select_mood(mood);
            println!("{} {}", mood.emoji(), mood.label());
            Ok(())
        }
        Command::Trend { days } => {
            for point in engine.mood_trend(days) {
                let cell = match (point.value, point.mood()) {
                    (Some(value), Some(mood)) => format!("{value:.1} {}", mood.emoji()),
                    _ => "-".bright_black().to_string(),
                };
                println!("{:>6}  {}", point.label, cell);
            }
            Ok(())
        }
        Command::Dominant => {
            match engine.dominant_mood() {
                Some(mood) => println!("{} {}", mood.emoji(), mood.label()),
                None => println!("{}", "No moods recorded yet.".bright_black()),
            }
            Ok(())
        }
        Command::History => {
            for entry in engine.mood_history() {
                let when = entry.date.with_timezone(&chrono::Local).format("%b %d %H:%M");
                let mood = entry.mood.map_or("-", |m| m.label());
                match &entry.notes {
                    Some(notes) => println!("{when}  {mood}  {}", notes.bright_black()),
                    None => println!("{when}  {mood}"),
                }
            }
            Ok(())
        }
        Command::Breathe(action) => {
            let breathing = engine.breathing();
            match action {
                BreatheAction::Start => breathing.start(),
                BreatheAction::Pause => breathing.pause(),
                BreatheAction::Toggle => breathing.toggle(),
                BreatheAction::Reset => breathing.reset(),
                BreatheAction::Status => {}
            }
            print_breathing(engine);
            Ok(())
        }
        Command::ChatLog => {
            engine.chat_log().iter().for_each(print_message);
            Ok(())
        }
        Command::ToggleDark => engine.toggle_dark_mode().map(|on| {
            println!("Dark mode {}", if on { "on" } else { "off" });
        }),
        Command::Say(text) => engine.send_chat_message(&text).map(|pending| {
            println!("{}", "...".bright_black());
            tokio::spawn(async move {
                match pending.reply().await {
                    Ok(reply) => print_message(&reply),
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            });
        }),
    };

    if let Err(e) = outcome {
        print_notice(&e);
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = SolacePaths::new(cli.home.clone());

    // ===== Configuration and logging =====
    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(&paths)?,
    };
    let config = config_service.get_config();
    let logs_dir = paths.logs_dir()?;
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Cannot create {}", logs_dir.display()))?;
    let _log_guard = init_logging(&config, &logs_dir)?;
    tracing::info!(config = %config_service.path().display(), "Starting Solace");

    // ===== Engine =====
    let store: Arc<dyn DurableStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(paths.store_dir()?))
    };
    println!("{}", "Loading...".bright_black());
    let engine = WellnessEngine::open(config, store).await?;
    if engine.is_loading() {
        println!("{}", "Still reading saved data; it will appear shortly.".bright_black());
    }

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Solace ===".bright_magenta().bold());
    println!(
        "{}",
        "Talk to your companion, or type /help for commands and 'quit' to exit.".bright_black()
    );
    if let Some(account) = engine.current_user() {
        println!("{}", format!("Logged in as {}", account.name).bright_black());
    }
    println!();
    if let Some(last) = engine.chat_log().last() {
        print_message(last);
    }

    // ===== Main REPL Loop =====
    loop {
        let prompt = if engine.dark_mode() { "» " } else { ">> " };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match Command::parse(trimmed) {
                    Ok(command) => {
                        if !dispatch(&engine, command) {
                            println!("{}", "Take care!".bright_green());
                            break;
                        }
                    }
                    Err(usage) => println!("{}", usage.yellow()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    engine.breathing().reset();
    tracing::info!("Solace stopped");
    Ok(())
}
