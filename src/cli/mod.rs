use crate::domain::{TodoDraft, TodoFilter, TodoList, TodoNotFound, validate_draft};
use crate::infra::{ApiClient, ApiError, resolve_api_url};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui {
        api_url: Option<String>,
        refresh_secs: Option<u64>,
    },
    Command(CliCommand),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    List {
        api_url: Option<String>,
        completed: bool,
        due_label: Option<String>,
    },
    Add {
        api_url: Option<String>,
        draft: TodoDraft,
    },
    Complete {
        api_url: Option<String>,
        id: u64,
    },
    Delete {
        api_url: Option<String>,
        id: u64,
    },
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },

    #[error("missing required flag: {0}")]
    MissingRequiredFlag(String),

    #[error("missing todo id for: {0}")]
    MissingTodoId(String),

    #[error("invalid todo id: {0}")]
    InvalidTodoId(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid todo: {0}")]
    Draft(#[from] crate::domain::DraftError),

    #[error(transparent)]
    NotFound(#[from] TodoNotFound),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut iter = args.iter().skip(1).peekable();
    let mut api_url: Option<String> = None;
    let mut refresh_secs: Option<u64> = None;
    while let Some(arg) = iter.peek() {
        match arg.as_str() {
            "--api-url" | "-u" => {
                let _ = iter.next();
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--api-url".to_string()))?;
                api_url = Some(value.clone());
            }
            "--refresh" => {
                let _ = iter.next();
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--refresh".to_string()))?;
                refresh_secs = Some(parse_u64_flag("--refresh", value)?);
            }
            _ => break,
        }
    }

    let Some(subcommand) = iter.next() else {
        return Ok(CliInvocation::Tui {
            api_url,
            refresh_secs,
        });
    };

    match subcommand.as_str() {
        "list" => {
            let mut completed = false;
            let mut due_label: Option<String> = None;

            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--api-url" | "-u" => {
                        let value = iter.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--api-url".to_string())
                        })?;
                        api_url = Some(value.clone());
                    }
                    "--completed" | "-c" => {
                        completed = true;
                    }
                    "--date" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--date".to_string()))?;
                        due_label = Some(value.clone());
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                    }
                }
            }

            Ok(CliInvocation::Command(CliCommand::List {
                api_url,
                completed,
                due_label,
            }))
        }
        "add" => {
            let mut title: Option<String> = None;
            let mut day: Option<String> = None;
            let mut month: Option<String> = None;
            let mut year: Option<String> = None;
            let mut description = String::new();

            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--api-url" | "-u" => {
                        let value = iter.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--api-url".to_string())
                        })?;
                        api_url = Some(value.clone());
                    }
                    "--title" | "-t" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--title".to_string()))?;
                        title = Some(value.clone());
                    }
                    "--day" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--day".to_string()))?;
                        day = Some(value.clone());
                    }
                    "--month" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--month".to_string()))?;
                        month = Some(value.clone());
                    }
                    "--year" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--year".to_string()))?;
                        year = Some(value.clone());
                    }
                    "--description" | "-d" => {
                        let value = iter.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--description".to_string())
                        })?;
                        description = value.clone();
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                    }
                }
            }

            let title =
                title.ok_or_else(|| CliParseError::MissingRequiredFlag("--title".to_string()))?;
            let draft = TodoDraft {
                title,
                day,
                month,
                year,
                completed: false,
                description,
            };
            Ok(CliInvocation::Command(CliCommand::Add { api_url, draft }))
        }
        "complete" | "delete" => {
            let name = subcommand.clone();
            let mut id: Option<u64> = None;

            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--api-url" | "-u" => {
                        let value = iter.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--api-url".to_string())
                        })?;
                        api_url = Some(value.clone());
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        if id.is_some() {
                            return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                        }
                        id = Some(
                            arg.parse::<u64>()
                                .map_err(|_| CliParseError::InvalidTodoId(arg.to_string()))?,
                        );
                    }
                }
            }

            let id = id.ok_or(CliParseError::MissingTodoId(name.clone()))?;
            let command = if name == "complete" {
                CliCommand::Complete { api_url, id }
            } else {
                CliCommand::Delete { api_url, id }
            };
            Ok(CliInvocation::Command(command))
        }
        other => Err(CliParseError::UnknownSubcommand(other.to_string())),
    }
}

fn parse_u64_flag(flag: &str, value: &str) -> Result<u64, CliParseError> {
    value
        .parse::<u64>()
        .map_err(|_| CliParseError::InvalidFlagValue {
            flag: flag.to_string(),
            value: value.to_string(),
        })
}

pub fn run(command: CliCommand) -> Result<(), CliRunError> {
    match command {
        CliCommand::List {
            api_url,
            completed,
            due_label,
        } => {
            let client = ApiClient::new(resolve_api_url(api_url.as_deref()));
            let listing = client.list_todos()?;
            let todos = TodoList::from_records(listing.records);
            let filter = TodoFilter {
                completed: completed.then_some(true),
                due_label,
            };

            let mut out = io::stdout().lock();
            for todo in todos.filter(&filter) {
                let state = if todo.completed { "done" } else { "open" };
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    todo.id,
                    state,
                    todo.due_label(),
                    todo.title
                )?;
            }
            Ok(())
        }
        CliCommand::Add { api_url, draft } => {
            // Validation blocks the request entirely, same as the form.
            validate_draft(&draft)?;
            let client = ApiClient::new(resolve_api_url(api_url.as_deref()));
            let record = client.create_todo(&draft)?;

            let mut out = io::stdout().lock();
            writeln!(out, "added {}\t{}", record.id, record.title)?;
            Ok(())
        }
        CliCommand::Complete { api_url, id } => {
            let client = ApiClient::new(resolve_api_url(api_url.as_deref()));
            // PUT carries the full field set, so the current record is
            // needed first.
            let listing = client.list_todos()?;
            let mut todos = TodoList::from_records(listing.records);
            let draft = todos.complete(id)?.to_draft();
            let record = client.update_todo(id, &draft)?;

            let mut out = io::stdout().lock();
            writeln!(out, "completed {}\t{}", record.id, record.title)?;
            Ok(())
        }
        CliCommand::Delete { api_url, id } => {
            let client = ApiClient::new(resolve_api_url(api_url.as_deref()));
            client.delete_todo(id)?;

            let mut out = io::stdout().lock();
            writeln!(out, "deleted {id}")?;
            Ok(())
        }
    }
}
