use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use recurrent_core::{config::RecurrentConfig, DueDate, TaskRecord};
use recurrent_worker::{RecurringWorker, TaskStore, WorkerError};
use tracing::info;

#[derive(Parser)]
#[command(name = "recurrent")]
#[command(about = "Recurring tasks driven by plain-English schedules", long_about = None)]
struct Cli {
    /// Path to recurrent.toml (overrides RECURRENT_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Path to the SQLite database (overrides the config file)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a schedule phrase against the current time
    Next {
        phrase: String,

        /// Due date of the task: YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due: Option<String>,

        /// Completion time of the task (defaults to now)
        #[arg(long)]
        modified: Option<String>,
    },
    /// Print the parsed form of a schedule phrase as JSON
    Explain { phrase: String },
    /// Add an open task
    Add {
        name: String,

        #[arg(short, long)]
        schedule: Option<String>,

        /// YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due: Option<String>,
    },
    /// Mark a task done
    Complete { id: String },
    /// List all tasks
    List {
        #[arg(long)]
        json: bool,
    },
    /// Run a single worker pass
    Once,
    /// Run the worker until Ctrl-C
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recurrent=info,recurrent_worker=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Next {
            phrase,
            due,
            modified,
        } => {
            let now = Local::now();
            let last_modified = match modified {
                Some(s) => parse_instant(&s)?,
                None => now.with_timezone(&Utc),
            };
            let record = TaskRecord {
                id: String::new(),
                name: "cli".to_string(),
                schedule: Some(phrase),
                due_date: due.as_deref().map(str::parse).transpose()?,
                done: true,
                last_modified,
                parent_id: None,
            };
            let next = recurrent_schedule::next_due(&record, &now)?;
            println!("{next}");
        }
        Command::Explain { phrase } => {
            let descriptor = recurrent_schedule::describe(&phrase)?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Command::Add {
            name,
            schedule,
            due,
        } => {
            let due: Option<DueDate> = due.as_deref().map(str::parse).transpose()?;
            let store = open_store(cli.config.as_deref(), cli.db.as_deref())?;
            let task = store.add_task(&name, schedule.as_deref(), due, Utc::now())?;
            println!("{}", task.id);
        }
        Command::Complete { id } => {
            let store = open_store(cli.config.as_deref(), cli.db.as_deref())?;
            store.complete_task(&id, Utc::now())?;
        }
        Command::List { json } => {
            let store = open_store(cli.config.as_deref(), cli.db.as_deref())?;
            let tasks = store.list_tasks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                for t in tasks {
                    println!(
                        "{}  [{}]  {:<30}  due {:<25}  {}",
                        t.id,
                        if t.done { "x" } else { " " },
                        t.name,
                        t.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                        t.schedule.as_deref().unwrap_or(""),
                    );
                }
            }
        }
        Command::Once => {
            let store = open_store(cli.config.as_deref(), cli.db.as_deref())?;
            let worker = RecurringWorker::new(store);
            match worker.run_once(&Local::now()) {
                Ok(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                Err(e @ WorkerError::BatchFailed { .. }) => {
                    eprintln!("{}: {e}", e.code());
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Run => {
            let config = load_config(cli.config.as_deref());
            let poll = Duration::from_secs(config.worker.poll_interval_secs.max(1));
            let store = open_store(cli.config.as_deref(), cli.db.as_deref())?;
            let worker = RecurringWorker::new(store);

            let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
            let handle = tokio::spawn(worker.run(poll, shutdown_rx));

            tokio::signal::ctrl_c().await?;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
            handle.await?;
        }
    }

    Ok(())
}

// load config: --config flag > RECURRENT_CONFIG env > ~/.recurrent/recurrent.toml
fn load_config(flag: Option<&str>) -> RecurrentConfig {
    let path = flag
        .map(String::from)
        .or_else(|| std::env::var("RECURRENT_CONFIG").ok());
    RecurrentConfig::load(path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        RecurrentConfig::default()
    })
}

fn open_store(config_flag: Option<&str>, db_flag: Option<&str>) -> anyhow::Result<TaskStore> {
    let mut config = load_config(config_flag);
    if let Some(path) = db_flag {
        config.database.path = path.to_string();
    }
    config.database.ensure_parent_dir()?;
    info!(path = %config.database.path, "opening SQLite database");

    let conn = rusqlite::Connection::open(&config.database.path)
        .with_context(|| format!("opening {}", config.database.path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(TaskStore::new(conn)?)
}

/// RFC 3339, or a bare date taken as local midnight.
fn parse_instant(s: &str) -> anyhow::Result<DateTime<Utc>> {
    match s.parse::<DueDate>()? {
        DueDate::DateTime(dt) => Ok(dt.with_timezone(&Utc)),
        DueDate::Date(d) => Local
            .from_local_datetime(&d.and_time(NaiveTime::MIN))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("{d} has no local midnight")),
    }
}
