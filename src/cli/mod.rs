//! Command-line interface for daybook
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{Event, EventDestination, EventKind, EventSink};
use crate::output::OutputOptions;
use crate::store::FileStore;

mod holiday;
mod prefs;
mod stats;
mod task;

/// daybook - a calendar-oriented to-do list
///
/// Plan tasks per day, drag them into order, mark holidays and follow
/// completion statistics.
#[derive(Parser, Debug)]
#[command(name = "daybook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "DAYBOOK_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit JSONL events to a file, or `-` for stdout
    #[arg(long, global = true, value_name = "PATH")]
    pub events: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Holiday markers
    #[command(subcommand)]
    Holiday(HolidayCommands),

    /// Per-day overview of a month
    Month {
        /// Month to show as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Completion statistics
    Stats {
        /// Show the last five years instead of the last six months
        #[arg(long)]
        yearly: bool,

        #[command(subcommand)]
        command: Option<StatsCommands>,
    },

    /// Theme and language preferences
    #[command(subcommand)]
    Prefs(PrefsCommands),
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task at the end of its day
    Add {
        /// Task title
        title: String,

        /// Due date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Due time as HH:MM (omit for an all-day task)
        #[arg(long)]
        time: Option<String>,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Category (defaults to the configured default)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List tasks of a day, a range, or everything
    #[command(alias = "ls")]
    List {
        /// Day to list as YYYY-MM-DD (defaults to today)
        #[arg(long, conflicts_with_all = ["from", "all"])]
        date: Option<String>,

        /// First day of a range
        #[arg(long, requires = "to", conflicts_with = "all")]
        from: Option<String>,

        /// Last day of a range
        #[arg(long, requires = "from", conflicts_with = "all")]
        to: Option<String>,

        /// List every task
        #[arg(long)]
        all: bool,
    },

    /// Edit fields of a task
    Edit {
        /// Task ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        /// New due date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        /// New due time as HH:MM
        #[arg(long, conflicts_with = "all_day")]
        time: Option<String>,

        /// Make the task an all-day task
        #[arg(long)]
        all_day: bool,
    },

    /// Mark a task completed
    Done {
        /// Task ID
        id: String,

        /// Mark the task open again
        #[arg(long)]
        undo: bool,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: String,
    },

    /// Move a task within its day (zero-based positions)
    Mv {
        /// Source position
        from: usize,

        /// Target position
        to: usize,

        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

/// Holiday subcommands
#[derive(Subcommand, Debug)]
pub enum HolidayCommands {
    /// Mark a day as a holiday
    Add {
        /// Holiday name
        name: String,

        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
    },

    /// List holidays, optionally for one month
    #[command(alias = "ls")]
    List {
        /// Month as YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },

    /// Remove a holiday
    Rm {
        /// Holiday ID
        id: String,
    },
}

/// Stats subcommands
#[derive(Subcommand, Debug)]
pub enum StatsCommands {
    /// Badges unlocked this month
    Achievements,
}

/// Preferences subcommands
#[derive(Subcommand, Debug)]
pub enum PrefsCommands {
    /// Show saved preferences
    Show,

    /// Change one or more preferences
    Set {
        /// blue, green, purple, orange, pink
        #[arg(long)]
        theme: Option<String>,

        /// light, dark, system
        #[arg(long)]
        mode: Option<String>,

        /// en, zh-CN, zh-TW, ja, in
        #[arg(long)]
        language: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mut ctx = Context::open(self.dir, self.json, self.quiet, self.events.as_deref())?;
        let command = self.command;
        runtime.block_on(async move {
            match command {
                Commands::Task(cmd) => task::run(&mut ctx, cmd).await,
                Commands::Holiday(cmd) => holiday::run(&mut ctx, cmd).await,
                Commands::Month { month } => holiday::run_month(&mut ctx, month).await,
                Commands::Stats { yearly, command } => match command {
                    Some(StatsCommands::Achievements) => stats::run_achievements(&mut ctx).await,
                    None => stats::run_summary(&mut ctx, yearly).await,
                },
                Commands::Prefs(cmd) => prefs::run(&mut ctx, cmd),
            }
        })
    }
}

/// Everything a command needs: resolved data directory, config, output
/// settings and the optional event sink.
pub(crate) struct Context {
    data_dir: PathBuf,
    config: Config,
    json: bool,
    quiet: bool,
    events: Option<EventSink>,
    events_to_stdout: bool,
}

impl Context {
    fn open(dir: Option<PathBuf>, json: bool, quiet: bool, events: Option<&str>) -> Result<Self> {
        let data_dir = match dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        std::fs::create_dir_all(&data_dir)?;
        let config = Config::load_from_dir(&data_dir);
        tracing::debug!(dir = %data_dir.display(), "using data directory");

        let destination = EventDestination::parse(events);
        let sink = destination.as_ref().map(|dest| dest.open()).transpose()?;
        let events_to_stdout = matches!(destination, Some(EventDestination::Stdout));

        Ok(Self {
            data_dir,
            config,
            json,
            quiet,
            events: sink,
            events_to_stdout,
        })
    }

    pub(crate) fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn store(&self) -> FileStore {
        FileStore::new(self.config.store.path_in(&self.data_dir))
            .with_lock_timeout(self.config.store.lock_timeout_ms)
    }

    /// Events on stdout take over the stream from regular output.
    pub(crate) fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json && !self.events_to_stdout,
            quiet: self.quiet || self.events_to_stdout,
        }
    }

    /// Emit an event if a sink is configured; returns a warning on failure.
    pub(crate) fn emit<T: Serialize>(&mut self, kind: EventKind, data: T) -> Option<String> {
        let sink = self.events.as_mut()?;
        let event = match Event::new(kind).with_data(data) {
            Ok(event) => event,
            Err(err) => return Some(format!("event output failed: {err}")),
        };
        if let Err(err) = sink.emit(&event) {
            return Some(format!("event output failed: {err}"));
        }
        None
    }
}

fn default_data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("", "", "daybook")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::OperationFailed(
                "cannot determine a data directory; pass --dir or set DAYBOOK_DIR".to_string(),
            )
        })
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_date(label: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
        Error::InvalidArgument(format!("invalid {label} '{value}' (expected YYYY-MM-DD): {err}"))
    })
}

pub(crate) fn parse_date_or_today(label: &str, value: Option<&str>) -> Result<NaiveDate> {
    value.map_or_else(|| Ok(today()), |raw| parse_date(label, raw))
}

pub(crate) fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|err| {
        Error::InvalidArgument(format!("invalid time '{value}' (expected HH:MM): {err}"))
    })
}
