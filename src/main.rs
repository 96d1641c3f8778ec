mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{
    AppCommand, AppError, AppEvent, AppModel, MutationKind, MutationOutcome, PendingMutation,
};
use crate::cli::CliInvocation;
use crate::domain::{TodoDraft, TodoRecord};
use crate::infra::{ApiClient, freshness_changed};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::sync::mpsc::{Sender, channel};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),
}

/// Result of a background list fetch or freshness probe.
#[derive(Clone, Debug)]
enum FetchSignal {
    Loaded {
        records: Vec<TodoRecord>,
        freshness: Option<String>,
    },
    Unchanged,
    Failed(String),
}

#[derive(Clone, Debug)]
enum MutationSignal {
    Done {
        kind: MutationKind,
        result: Result<MutationOutcome, String>,
    },
}

#[derive(Clone, Debug)]
enum MutationRequest {
    Create { draft: TodoDraft },
    Update { id: u64, draft: TodoDraft },
    Delete { id: u64 },
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui {
            api_url,
            refresh_secs,
        } => Ok(run_tui(api_url, refresh_secs)?),
        CliInvocation::Command(command) => {
            crate::cli::run(command)?;
            Ok(())
        }
    }
}

fn print_help() {
    let text = format!(
        "{name} — terminal client for a todo HTTP API\n\nUSAGE:\n  {name} [--api-url URL] [--refresh SECS]       Start the TUI\n  {name} list [--completed] [--date LABEL]      Print todos as TSV\n  {name} add --title TITLE [--day D] [--month MM] [--year YYYY] [--description TEXT]\n  {name} complete <id>                          Mark a todo completed\n  {name} delete <id>                            Delete a todo\n  {name} --help | --version\n\nFLAGS:\n  --api-url URL  API base URL (default: http://localhost:3000/api)\n  --refresh SECS Periodic refresh interval for the TUI; 0 disables (default: 30)\n\nOUTPUT:\n  list: id<TAB>state<TAB>due<TAB>title  (state is open|done)\n\nENV:\n  TUDU_API_URL       Same as --api-url\n  TUDU_REFRESH_SECS  Same as --refresh\n  TUDU_STATE_DIR     Log file directory (default: ~/.tudu)\n",
        name = env!("CARGO_PKG_NAME")
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn run_tui(api_url_flag: Option<String>, refresh_flag: Option<u64>) -> Result<(), AppError> {
    let api_url = crate::infra::resolve_api_url(api_url_flag.as_deref());
    let refresh_interval = crate::infra::resolve_refresh_interval(refresh_flag);

    // Logging is best-effort: without a home directory the TUI still
    // runs, it just can't keep a log file.
    let _log_guard = match crate::infra::resolve_state_dir() {
        Ok(state_dir) => crate::infra::init_file_logging(&state_dir).ok(),
        Err(_) => None,
    };
    tracing::info!(%api_url, "starting tui");

    let client = ApiClient::new(api_url.clone());
    let mut model = AppModel::new(api_url);
    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut model, &client, refresh_interval);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let _ = stdout.execute(EnableBracketedPaste);
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), AppError> {
    disable_raw_mode()?;
    let _ = execute!(terminal.backend_mut(), DisableBracketedPaste);
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    client: &ApiClient,
    refresh_interval: Option<Duration>,
) -> Result<(), AppError> {
    let (fetch_tx, fetch_rx) = channel::<FetchSignal>();
    let (mutation_tx, mutation_rx) = channel::<MutationSignal>();

    // The placeholder frame goes up immediately; the first fetch runs
    // behind it.
    model.fetch_in_flight = true;
    spawn_list_fetch(client, &fetch_tx);
    let mut last_refresh = Instant::now();

    loop {
        while let Ok(signal) = fetch_rx.try_recv() {
            model.fetch_in_flight = false;
            match signal {
                FetchSignal::Loaded { records, freshness } => {
                    app::apply_load_result(
                        model,
                        Ok(crate::infra::TodoListing { records, freshness }),
                    );
                    model.last_sync = Some(now_local());
                }
                FetchSignal::Unchanged => {
                    // Freshness token matched; skip the re-install, but
                    // the data is confirmed current.
                    model.last_sync = Some(now_local());
                }
                FetchSignal::Failed(error) => {
                    app::apply_load_result(model, Err(error));
                }
            }
        }

        while let Ok(MutationSignal::Done { kind, result }) = mutation_rx.try_recv() {
            app::apply_mutation_result(model, kind, result);
        }

        if let Some(interval) = refresh_interval {
            if model.phase == app::Phase::Ready
                && !model.fetch_in_flight
                && last_refresh.elapsed() >= interval
            {
                last_refresh = Instant::now();
                model.fetch_in_flight = true;
                spawn_freshness_refresh(client, &fetch_tx, model.freshness.clone());
            }
        }

        terminal.draw(|frame| ui::render(frame, model))?;

        if event::poll(Duration::from_millis(200))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    let (next, command) = app::update(model.clone(), AppEvent::Key(key));
                    *model = next;
                    match command {
                        AppCommand::None => {}
                        AppCommand::Quit => return Ok(()),
                        AppCommand::Refresh => {
                            if !model.fetch_in_flight {
                                model.fetch_in_flight = true;
                                last_refresh = Instant::now();
                                spawn_list_fetch(client, &fetch_tx);
                            }
                        }
                        AppCommand::CreateTodo { draft } => {
                            model.pending = Some(PendingMutation {
                                kind: MutationKind::Create,
                                todo_id: None,
                            });
                            spawn_mutation(
                                client,
                                &mutation_tx,
                                MutationKind::Create,
                                MutationRequest::Create { draft },
                            );
                        }
                        AppCommand::UpdateTodo { id, draft } => {
                            model.pending = Some(PendingMutation {
                                kind: MutationKind::Update,
                                todo_id: Some(id),
                            });
                            spawn_mutation(
                                client,
                                &mutation_tx,
                                MutationKind::Update,
                                MutationRequest::Update { id, draft },
                            );
                        }
                        AppCommand::ToggleTodo { id, draft } => {
                            model.pending = Some(PendingMutation {
                                kind: MutationKind::Toggle,
                                todo_id: Some(id),
                            });
                            spawn_mutation(
                                client,
                                &mutation_tx,
                                MutationKind::Toggle,
                                MutationRequest::Update { id, draft },
                            );
                        }
                        AppCommand::DeleteTodo { id } => {
                            model.pending = Some(PendingMutation {
                                kind: MutationKind::Delete,
                                todo_id: Some(id),
                            });
                            spawn_mutation(
                                client,
                                &mutation_tx,
                                MutationKind::Delete,
                                MutationRequest::Delete { id },
                            );
                        }
                    }
                }
                Event::Paste(text) => {
                    let (next, _) = app::update(model.clone(), AppEvent::Paste(text));
                    *model = next;
                }
                // Resize is handled implicitly: the next draw reads the
                // new terminal size.
                _ => {}
            }
        }
    }
}

fn now_local() -> time::OffsetDateTime {
    time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc())
}

fn spawn_list_fetch(client: &ApiClient, tx: &Sender<FetchSignal>) {
    let client = client.clone();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let signal = match client.list_todos() {
            Ok(listing) => {
                tracing::debug!(count = listing.records.len(), "todo list fetched");
                FetchSignal::Loaded {
                    records: listing.records,
                    freshness: listing.freshness,
                }
            }
            Err(error) => FetchSignal::Failed(error.to_string()),
        };
        let _ = tx.send(signal);
    });
}

/// HEAD first; the full GET only happens when the freshness token
/// moved or is unknown.
fn spawn_freshness_refresh(client: &ApiClient, tx: &Sender<FetchSignal>, last: Option<String>) {
    let client = client.clone();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let signal = match client.fetch_freshness() {
            Ok(current) => {
                if freshness_changed(last.as_deref(), current.as_deref()) {
                    match client.list_todos() {
                        Ok(listing) => FetchSignal::Loaded {
                            records: listing.records,
                            freshness: listing.freshness,
                        },
                        Err(error) => FetchSignal::Failed(error.to_string()),
                    }
                } else {
                    tracing::debug!("freshness unchanged, skipping fetch");
                    FetchSignal::Unchanged
                }
            }
            Err(error) => FetchSignal::Failed(error.to_string()),
        };
        let _ = tx.send(signal);
    });
}

fn spawn_mutation(
    client: &ApiClient,
    tx: &Sender<MutationSignal>,
    kind: MutationKind,
    request: MutationRequest,
) {
    let client = client.clone();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let result = match request {
            MutationRequest::Create { draft } => client
                .create_todo(&draft)
                .map(MutationOutcome::Created)
                .map_err(|error| error.to_string()),
            MutationRequest::Update { id, draft } => client
                .update_todo(id, &draft)
                .map(MutationOutcome::Updated)
                .map_err(|error| error.to_string()),
            MutationRequest::Delete { id } => client
                .delete_todo(id)
                .map(|()| MutationOutcome::Deleted { id })
                .map_err(|error| error.to_string()),
        };
        let _ = tx.send(MutationSignal::Done { kind, result });
    });
}
