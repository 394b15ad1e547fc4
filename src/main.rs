//! Pomodoro Timer CLI - a terminal pomodoro timer
//!
//! This tool helps you stay focused using the Pomodoro Technique:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 15 minutes of long break after every 4 pomodoros

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, Utc};
use clap::{CommandFactory, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use pomodoro_scheduler::cli::{
    parse_command, Cli, Commands, Display, HistoryArgs, InputError, RunArgs, SettingsArgs,
    TaskCommand, UserCommand,
};
use pomodoro_scheduler::{
    SchedulerDriver, SchedulerEvent, SessionKind, SessionScheduler, Store, TaskError, TaskId,
};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }

    // A blocking stdin read left behind by `run` would keep the runtime
    // from shutting down, so exit without waiting for it
    let _ = std::io::stdout().flush();
    std::process::exit(0);
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so the countdown line on stdout stays intact.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => {
            let store = open_store(cli.data_dir)?;
            run_timer(&store, &args).await?;
        }
        Some(Commands::History(args)) => {
            let store = open_store(cli.data_dir)?;
            show_history(&store, &args)?;
        }
        Some(Commands::Settings(args)) => {
            let store = open_store(cli.data_dir)?;
            update_settings(&store, &args)?;
        }
        Some(Commands::Task { command }) => {
            let store = open_store(cli.data_dir)?;
            manage_tasks(&store, command)?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Opens the store at `--data-dir`, or at `~/.pomodoro` when not given.
fn open_store(data_dir: Option<PathBuf>) -> Result<Store> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => Store::default_dir()?,
    };
    debug!(dir = %dir.display(), "Opening store");
    Ok(Store::open(dir)?)
}

// ============================================================================
// Run
// ============================================================================

/// Runs the timer in the foreground until `q`, end of input or Ctrl-C.
///
/// Each completed session is appended to the stored history as soon as its
/// completion event arrives.
async fn run_timer(store: &Store, args: &RunArgs) -> Result<()> {
    let mut settings = store.load_settings()?;
    settings.merge(&args.to_update());

    if let Some(id) = args.task {
        if store.load_tasks()?.get(id).is_none() {
            return Err(TaskError::NotFound(id).into());
        }
    }

    let mut scheduler = SessionScheduler::new(settings);
    let bell = !args.no_bell;
    let task_store = store.clone();
    let task = args.task;
    scheduler.set_notification_callback(move |kind| {
        debug!(session = %kind, bell, "Notifying completion");
        if kind == SessionKind::Work {
            if let Some(id) = task {
                credit_task(&task_store, id)?;
            }
        }
        if bell {
            Display::ring_bell()?;
        }
        Ok(())
    });

    let (mut driver, mut events) = SchedulerDriver::spawn(scheduler);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut saved = 0;

    Display::show_help();
    Display::show_status(&driver.snapshot());

    loop {
        // Events are shown before the next input line is read
        tokio::select! {
            biased;

            result = &mut ctrl_c => {
                result?;
                debug!("Interrupted");
                break;
            }
            Some(event) = events.recv() => {
                if let SchedulerEvent::Completed { completed, .. } = event {
                    match save_new_records(&driver, store, saved).await {
                        Ok(count) => saved += count,
                        Err(e) => {
                            warn!(error = %e, "Failed to save history");
                            Display::show_error(&e.to_string());
                        }
                    }
                    show_event(&driver, event)?;
                    if completed == SessionKind::Work {
                        show_task_credit(store, task);
                    }
                } else {
                    show_event(&driver, event)?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(UserCommand::Quit) => break,
                    Ok(command) => apply_command(&driver, command).await,
                    Err(InputError::Empty) => {}
                    Err(e) => Display::show_error(&e.to_string()),
                }
            }
        }
    }

    // Anything a failed save left behind
    saved += save_new_records(&driver, store, saved).await?;
    driver.dispose().await;

    println!();
    if saved > 0 {
        println!("* {}件のセッションを履歴に保存しました", saved);
    }
    Ok(())
}

/// Appends the records completed after the first `saved` ones to the store.
/// Returns how many were appended.
async fn save_new_records(driver: &SchedulerDriver, store: &Store, saved: usize) -> Result<usize> {
    let records = driver
        .with_scheduler(|s| {
            s.history()
                .records()
                .get(saved..)
                .map(<[_]>::to_vec)
                .unwrap_or_default()
        })
        .await;
    store.append_history(&records)?;
    Ok(records.len())
}

/// Attributes a completed pomodoro to a stored task.
fn credit_task(store: &Store, id: TaskId) -> Result<()> {
    let mut tasks = store.load_tasks()?;
    let count = tasks.record_pomodoro(id)?;
    store.save_tasks(&tasks)?;
    debug!(task = id, count, "Credited pomodoro to task");
    Ok(())
}

/// Prints the selected task's pomodoro count after a work session.
fn show_task_credit(store: &Store, task: Option<TaskId>) {
    let Some(id) = task else {
        return;
    };
    match store.load_tasks() {
        Ok(tasks) => {
            if let Some(task) = tasks.get(id) {
                Display::show_task_credit(task);
            }
        }
        Err(e) => warn!(error = %e, "Failed to read tasks"),
    }
}

/// Applies an interactive command and shows the resulting state.
async fn apply_command(driver: &SchedulerDriver, command: UserCommand) {
    match command {
        UserCommand::Start => driver.start().await,
        UserCommand::Pause => driver.pause().await,
        UserCommand::Reset => driver.reset().await,
        UserCommand::Skip => {
            // The completion is reported through the event channel
            driver.skip().await;
            return;
        }
        UserCommand::Switch(kind) => driver.switch_session(kind).await,
        UserCommand::Set(update) => {
            let mut preview = driver.snapshot().settings;
            let rejected = preview.merge(&update);
            if !rejected.is_empty() {
                Display::show_error("時間は1分以上で指定してください");
            }
            driver.update_settings(update).await;
        }
        UserCommand::Help => {
            Display::show_help();
            return;
        }
        UserCommand::Status | UserCommand::Quit => {}
    }
    Display::show_status(&driver.snapshot());
}

/// Prints a scheduler event.
fn show_event(driver: &SchedulerDriver, event: SchedulerEvent) -> Result<()> {
    match event {
        SchedulerEvent::Ticked { .. } => {
            Display::show_status_inline(&driver.snapshot())?;
        }
        SchedulerEvent::Completed {
            completed,
            next,
            auto_start,
            ..
        } => {
            Display::show_completion(completed, next, auto_start);
            Display::show_status(&driver.snapshot());
        }
        SchedulerEvent::AutoStarted { .. } => {
            Display::show_status_inline(&driver.snapshot())?;
        }
        SchedulerEvent::Idle => {}
    }
    Ok(())
}

// ============================================================================
// History and Settings
// ============================================================================

/// Number of records to list for the history command.
fn history_limit(args: &HistoryArgs) -> usize {
    if args.all {
        usize::MAX
    } else {
        args.limit
    }
}

/// Shows the stored history with today's goal progress.
fn show_history(store: &Store, args: &HistoryArgs) -> Result<()> {
    let history = store.load_history()?;
    let today = Local::now().date_naive();
    Display::show_history(&history, today, &Local, history_limit(args));
    Ok(())
}

/// Shows the stored settings, or saves the given changes.
fn update_settings(store: &Store, args: &SettingsArgs) -> Result<()> {
    let mut settings = store.load_settings()?;
    let update = args.to_update();

    if update.is_empty() {
        Display::show_settings(&settings);
        return Ok(());
    }

    settings.merge(&update);
    store.save_settings(&settings)?;
    Display::show_settings_saved(&settings);
    Ok(())
}

// ============================================================================
// Tasks
// ============================================================================

/// Runs a `task` subcommand against the stored task list.
fn manage_tasks(store: &Store, command: TaskCommand) -> Result<()> {
    let mut tasks = store.load_tasks()?;

    match command {
        TaskCommand::Add {
            text,
            category,
            estimate,
        } => {
            let task = tasks.add(&text.join(" "), category, estimate, Utc::now())?.clone();
            store.save_tasks(&tasks)?;
            Display::show_task_saved("タスクを追加しました", &task);
        }
        TaskCommand::List { filter } => {
            Display::show_tasks(&tasks, filter);
        }
        TaskCommand::Done { id } => {
            let completed = tasks.toggle_complete(id, Utc::now())?;
            store.save_tasks(&tasks)?;
            let message = if completed {
                "タスクを完了しました"
            } else {
                "タスクを未完了に戻しました"
            };
            if let Some(task) = tasks.get(id) {
                Display::show_task_saved(message, task);
            }
        }
        TaskCommand::Edit { id, text } => {
            tasks.rename(id, &text.join(" "))?;
            store.save_tasks(&tasks)?;
            if let Some(task) = tasks.get(id) {
                Display::show_task_saved("タスクを更新しました", task);
            }
        }
        TaskCommand::Rm { id } => {
            let task = tasks.remove(id)?;
            store.save_tasks(&tasks)?;
            Display::show_task_saved("タスクを削除しました", &task);
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
