use std::fs;
use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{self, Instant as TokioInstant};

use super::view::TerminalView;
use crate::models::countdown::TickState;
use crate::models::settings::{Settings, StorageBackend};
use crate::services::countdown::{
    Collaborators, CountdownController, CountdownEvent, CountdownView, JsonFileStore,
    KeyValueStore, MemoryStore, SqliteStore, SystemClock, TokioScheduler,
};
use crate::services::notification::NotificationService;
use crate::services::settings::{settings_to_options, SettingsService};

/// What to do once the controller has been initialized.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Target to set right after restoring any saved one.
    pub initial_target: Option<String>,
    /// Reset the saved countdown and exit.
    pub reset_only: bool,
    /// Leave the event loop as soon as the countdown finishes.
    pub exit_on_finish: bool,
}

/// Opens the key-value store selected in the settings.
pub fn open_store(settings: &Settings) -> Result<Box<dyn KeyValueStore>> {
    let data_dir = SettingsService::data_dir(settings);
    let file = settings
        .storage
        .file_name()
        .map(|name| data_dir.join(name));

    let store: Box<dyn KeyValueStore> = match (settings.storage, file) {
        (StorageBackend::Json, Some(path)) => {
            log::info!("Persisting countdown to {}", path.display());
            Box::new(JsonFileStore::new(path))
        }
        (StorageBackend::Sqlite, Some(path)) => {
            ensure_dir(&data_dir)?;
            log::info!("Persisting countdown to {}", path.display());
            let path = path
                .to_str()
                .context("Database path is not valid UTF-8")?
                .to_string();
            Box::new(SqliteStore::open(&path)?)
        }
        _ => {
            log::info!("Countdown target will not survive a restart");
            Box::new(MemoryStore::new())
        }
    };
    Ok(store)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create dir {}", dir.display()))
}

/// Maps one line typed on stdin to an event. Blank lines map to nothing.
pub fn parse_command(line: &str) -> std::result::Result<Option<CountdownEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "set" => Ok(Some(CountdownEvent::Set(rest.to_string()))),
        "reset" => Ok(Some(CountdownEvent::Reset)),
        "status" => Ok(Some(CountdownEvent::Status)),
        "quit" | "exit" | "q" => Ok(Some(CountdownEvent::Quit)),
        other => Err(format!("Unknown command `{}`", other)),
    }
}

/// Handles one event to completion. Returns `false` when the loop should stop.
pub fn dispatch(
    controller: &mut CountdownController,
    view: &mut TerminalView,
    event: CountdownEvent,
    exit_on_finish: bool,
) -> bool {
    match event {
        CountdownEvent::Set(raw) => {
            if let Err(err) = controller.set_target(&raw) {
                log::debug!("set rejected: {}", err);
            }
        }
        CountdownEvent::Reset => controller.reset(),
        CountdownEvent::Status => view.show_status(&controller.status()),
        CountdownEvent::Tick(handle) => {
            if controller.on_tick(handle) == Some(TickState::Finished) && exit_on_finish {
                return false;
            }
        }
        CountdownEvent::Quit => return false,
    }
    true
}

fn spawn_stdin_reader(events: UnboundedSender<CountdownEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(event)) => {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => eprintln!("{}", message),
                },
                Ok(None) => {
                    log::debug!("stdin closed, waiting for ticks or Ctrl-C");
                    break;
                }
                Err(err) => {
                    log::warn!("Failed to read stdin: {}", err);
                    break;
                }
            }
        }
    });
}

/// Brings the controller up according to `options`. Returns `false` when
/// there is nothing left to wait for.
///
/// `--reset` skips the restore so a saved target that already passed is
/// cleared without celebrating it first.
pub fn start(controller: &mut CountdownController, options: &RunOptions) -> bool {
    if options.reset_only {
        controller.reset();
        return false;
    }

    controller.initialize();

    if let Some(raw) = options.initial_target.as_deref() {
        if let Err(err) = controller.set_target(raw) {
            log::warn!("Ignoring --target {:?}: {}", raw, err);
        }
    }

    !(options.exit_on_finish && controller.last_tick() == TickState::Finished)
}

/// Handles events until `quit`, `shutdown` resolves, the channel closes, or
/// completion with `exit_on_finish`.
///
/// Every event is handled on this one task, so ticks and commands never
/// interleave. `shutdown` is polled across iterations, so a signal that
/// arrives while an event is being handled is still seen.
pub async fn drive<F>(
    controller: &mut CountdownController,
    view: &mut TerminalView,
    events: &mut UnboundedReceiver<CountdownEvent>,
    exit_on_finish: bool,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let expiry = view.next_expiry();
        let wake_at = expiry
            .map(TokioInstant::from_std)
            .unwrap_or_else(|| TokioInstant::now() + time::Duration::from_secs(3600));

        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if !dispatch(controller, view, event, exit_on_finish) {
                    break;
                }
            }
            _ = time::sleep_until(wake_at), if expiry.is_some() => {
                view.expire(std::time::Instant::now());
            }
            _ = &mut shutdown => break,
        }
    }
}

/// Runs the countdown until `quit`, Ctrl-C, or completion with
/// `exit_on_finish`.
pub async fn run(settings: Settings, options: RunOptions) -> Result<()> {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut view = TerminalView::stdout(NotificationService::new(settings.desktop_notifications));

    let mut controller = CountdownController::new(
        Collaborators {
            clock: Box::new(SystemClock),
            store: open_store(&settings)?,
            scheduler: Box::new(TokioScheduler::new(events_tx.clone())),
            view: Box::new(view.clone()),
            input: Box::new(view.clone()),
        },
        settings_to_options(&settings),
    );

    if !start(&mut controller, &options) {
        return Ok(());
    }

    spawn_stdin_reader(events_tx);

    let interrupted = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("Interrupted"),
            Err(err) => {
                log::warn!("Failed to listen for Ctrl-C: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    drive(
        &mut controller,
        &mut view,
        &mut events_rx,
        options.exit_on_finish,
        interrupted,
    )
    .await;

    println!();
    Ok(())
}
