use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use taskmaster_cli::cli::{Cli, Command, collect_overrides};
use taskmaster_cli::render;
use taskmaster_core::config::{load_config_with_fallback, merge_overrides, palette_for_theme};
use taskmaster_core::error::AppError;
use taskmaster_core::lifecycle::TransitionStrategy;
use taskmaster_core::notify::notifier_from_env;
use taskmaster_core::storage::store_from_config;
use taskmaster_core::task_api::{TaskBoard, notify_overdue};
use taskmaster_core::timestamp::{local_offset, parse_optional, parse_timestamp};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TASKMASTER_LOG";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    if let Command::Add { title, .. } = &cli.command
        && title.as_deref().is_none_or(|value| value.trim().is_empty())
    {
        return Err(AppError::invalid_input("title is required"));
    }

    let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        tracing::warn!(error = %err, "using default configuration");
    }
    let config = merge_overrides(&loaded.config, &overrides);
    let palette = palette_for_theme(config.theme.as_deref());

    let mut board = TaskBoard::load(store_from_config(&config)?)?;
    let now = local_now();

    match cli.command {
        Command::Add { title, start, due } => {
            let title = title.unwrap_or_default();
            let start_date = parse_optional(start.as_deref(), now.offset())?;
            let due_date = parse_optional(due.as_deref(), now.offset())?;
            let task = board.add(&title, start_date, due_date)?;
            if cli.json {
                println!("{}", render::task_json(&task, now)?);
            } else {
                println!(
                    "Added task: {} ({})",
                    task.title,
                    task.id.as_deref().unwrap_or("-")
                );
            }
        }
        Command::List { overdue } => {
            let tasks = if overdue {
                board.overdue(now)
            } else {
                board.tasks().to_vec()
            };
            if cli.json {
                println!("{}", render::tasks_json(&tasks, now)?);
            } else if tasks.is_empty() {
                println!("No tasks yet.");
            } else {
                for task in &tasks {
                    println!("{}", render::task_line(task, now, &palette)?);
                }
            }
        }
        Command::Show { id } => {
            let task = board.get(&id)?;
            if cli.json {
                println!("{}", render::task_json(task, now)?);
            } else {
                println!("{}", render::task_line(task, now, &palette)?);
            }
        }
        Command::Advance { id, strategy } => {
            let strategy = match strategy {
                Some(raw) => raw.parse::<TransitionStrategy>()?,
                None => config.transition()?,
            };
            let task = board.advance(&id, strategy)?;
            if cli.json {
                println!("{}", render::task_json(&task, now)?);
            } else {
                println!(
                    "Task {} ({}) is now {}",
                    task.title,
                    id.trim(),
                    render::status_label(task.status, &palette)
                );
            }
        }
        Command::Delete { id } => {
            let record = board.delete(&id)?;
            if cli.json {
                println!("{}", render::record_json(&record)?);
            } else {
                println!("Deleted task: {} ({})", record.title, id.trim());
            }
        }
        Command::Report { window, at } => {
            let reference = match at.as_deref() {
                Some(raw) => parse_timestamp(raw, now.offset())?,
                None => now,
            };
            let window_size = window.unwrap_or_else(|| config.window_size());
            let report = board.report(reference, window_size)?;
            if cli.json {
                println!("{}", render::report_json(&report)?);
            } else {
                println!("{}", render::report_plain(&report));
            }
        }
        Command::Seed => {
            let message = board.seed()?;
            if cli.json {
                println!("{}", serde_json::json!({ "message": message }));
            } else {
                println!("{message}");
            }
        }
        Command::Notify => {
            let notifier = notifier_from_env();
            let outcome = notify_overdue(&board, notifier.as_ref(), now);
            for failure in &outcome.failures {
                eprintln!("ERROR: {} ({})", failure.error, failure.task_id);
            }
            if cli.json {
                println!("{}", render::tasks_json(&outcome.tasks, now)?);
            } else if outcome.tasks.is_empty() {
                println!("No overdue tasks.");
            } else {
                for task in &outcome.tasks {
                    println!(
                        "Notified: {} ({})",
                        task.title,
                        task.id.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) if args.is_empty() => continue,
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        let argv = std::iter::once("taskmaster".to_string()).chain(args);
        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
