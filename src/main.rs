use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use monthcal::application::{MonthCal, Outcome};
use monthcal::components::month_calendar::{day_detail, month_calendar};
use monthcal::config::{self, MonthCalConfig};
use monthcal::core::error::StoreError;
use monthcal::core::event::{self, EventId};
use monthcal::core::grid::YearMonth;
use monthcal::core::store::EventStore;
use monthcal::message::Message;
use monthcal::storage::FileStorage;

#[derive(Parser)]
#[command(name = "monthcal")]
#[command(about = "Browse months and keep timed events on calendar dates")]
struct Cli {
    /// Config file (defaults to ~/.config/monthcal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding calendarEvents.json, overriding the config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month grid (the current month by default)
    Show {
        /// Month to show, as YYYY-MM
        #[arg(short, long, value_parser = parse_month)]
        month: Option<YearMonth>,

        /// Go back this many months
        #[arg(long, conflicts_with = "next")]
        prev: Option<u32>,

        /// Go forward this many months
        #[arg(long)]
        next: Option<u32>,

        /// Select a date (YYYY-MM-DD) and show its events
        #[arg(short, long, value_parser = parse_date)]
        select: Option<NaiveDate>,
    },
    /// List the events of one date
    List {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Add an event to a date
    Add {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,

        title: String,

        /// Start time, HH:MM
        #[arg(short, long)]
        start: Option<String>,

        /// End time, HH:MM
        #[arg(short, long)]
        end: Option<String>,
    },
    /// Change an existing event
    Edit {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,

        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,
    },
    /// Delete an event
    Delete {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,

        id: String,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    event::parse_date_key(s).ok_or_else(|| format!("expected YYYY-MM-DD, got {s:?}"))
}

fn parse_month(s: &str) -> Result<YearMonth, String> {
    YearMonth::parse(s).ok_or_else(|| format!("expected YYYY-MM, got {s:?}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = match cli.config.clone().or_else(config::config_path) {
        Some(path) => MonthCalConfig::load(&path)?,
        None => MonthCalConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        cfg.data_directory = dir;
    }

    init_logging(cfg.debug_logging);
    log::debug!("Using data directory {}", cfg.data_directory.display());

    let today = chrono::Local::now().date_naive();
    let store = EventStore::load(cfg.storage());
    let mut app = MonthCal::with_form_defaults(store, YearMonth::of(today), cfg.form_defaults());

    let command = cli.command.unwrap_or(Commands::Show {
        month: None,
        prev: None,
        next: None,
        select: None,
    });

    match command {
        Commands::Show {
            month,
            prev,
            next,
            select,
        } => cmd_show(&mut app, today, month, prev, next, select),
        Commands::List { date } => {
            app.update(Message::SelectDay(date))?;
            print!("{}", day_detail(date, today, app.selected_events()));
            Ok(())
        }
        Commands::Add {
            date,
            title,
            start,
            end,
        } => cmd_add(&mut app, date, title, start, end),
        Commands::Edit {
            date,
            id,
            title,
            start,
            end,
        } => cmd_edit(&mut app, date, EventId::from(id), title, start, end),
        Commands::Delete { date, id } => {
            app.update(Message::SelectDay(date))?;
            match app.update(Message::DeleteEvent(EventId::from(id.clone())))? {
                Outcome::Deleted(true) => println!("Deleted {} from {}", id, date),
                _ => println!("No event {} on {}", id, date),
            }
            Ok(())
        }
    }
}

fn cmd_show(
    app: &mut MonthCal<FileStorage>,
    today: NaiveDate,
    month: Option<YearMonth>,
    prev: Option<u32>,
    next: Option<u32>,
    select: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let steps = i64::from(next.unwrap_or(0)) - i64::from(prev.unwrap_or(0));
    let target = month.unwrap_or(app.displayed_month()).offset(steps);
    app.update(Message::ShowMonth(target))?;
    if let Some(date) = select {
        app.update(Message::SelectDay(date))?;
    }

    print!("{}", month_calendar(app, today));
    Ok(())
}

fn cmd_add(
    app: &mut MonthCal<FileStorage>,
    date: NaiveDate,
    title: String,
    start: Option<String>,
    end: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    app.update(Message::SelectDay(date))?;
    app.update(Message::SetTitle(title))?;
    if let Some(start) = start {
        app.update(Message::SetStartTime(start))?;
    }
    if let Some(end) = end {
        app.update(Message::SetEndTime(end))?;
    }

    if let Outcome::Saved(event) = app.update(Message::Submit)? {
        println!("Added {} on {}: {} ({})", event.id, date, event.title, event.time_range());
    }
    Ok(())
}

fn cmd_edit(
    app: &mut MonthCal<FileStorage>,
    date: NaiveDate,
    id: EventId,
    title: Option<String>,
    start: Option<String>,
    end: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    app.update(Message::SelectDay(date))?;
    app.update(Message::EditEvent(id.clone()))?;
    if app.selection().editing() != Some(&id) {
        return Err(StoreError::NotFound { date, id }.into());
    }

    if let Some(title) = title {
        app.update(Message::SetTitle(title))?;
    }
    if let Some(start) = start {
        app.update(Message::SetStartTime(start))?;
    }
    if let Some(end) = end {
        app.update(Message::SetEndTime(end))?;
    }

    if let Outcome::Saved(event) = app.update(Message::Submit)? {
        println!("Updated {} on {}: {} ({})", event.id, date, event.title, event.time_range());
    }
    Ok(())
}

/// Log to the systemd user journal (`journalctl --user -t monthcal -f`).
/// monthcal targets log at info, or debug when enabled; everything else at warn.
fn init_logging(debug: bool) {
    use log::Log;

    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("monthcal") {
                let max = if monthcal::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }

        fn flush(&self) {
            self.inner.flush();
        }
    }

    monthcal::set_debug_logging(debug);

    // No journal (containers, non-systemd hosts): run without logging.
    let Ok(journal) = systemd_journal_logger::JournalLog::new() else {
        return;
    };
    let journal = journal.with_syslog_identifier("monthcal".to_string());

    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so monthcal debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}
