use std::fmt::Write;

use chrono::{Datelike, NaiveDate};

use crate::application::MonthCal;
use crate::core::event::Event;
use crate::core::grid::{self, DayCell, WEEKDAY_LABELS};
use crate::storage::KeyValueStore;

const CELL_WIDTH: usize = 6;

/// Render the displayed month as a 7-column text grid, followed by the
/// titles of each busy day and, if a date is selected, its detail panel.
///
/// Day markers: `[ 5]` selected, `( 5)` today, `·` has events.
pub fn month_calendar<S: KeyValueStore>(app: &MonthCal<S>, today: NaiveDate) -> String {
    let month = app.displayed_month();
    let store = app.store();
    let mut out = String::new();

    // Header: Month Year
    let _ = writeln!(out, "{:^width$}", month.label(), width = CELL_WIDTH * 7);

    let labels: String = WEEKDAY_LABELS
        .iter()
        .map(|label| format!("{:^width$}", label, width = CELL_WIDTH))
        .collect();
    let _ = writeln!(out, "{}", labels.trim_end());

    let cells = app.cells();
    for week in grid::weeks(&cells) {
        let line: String = week
            .iter()
            .map(|cell| day_cell(cell, app, today))
            .collect();
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let busy_days = store.busy_days(month);
    if !busy_days.is_empty() {
        out.push('\n');
    }
    for date in busy_days {
        let titles: Vec<&str> = store
            .events_for(date)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        let _ = writeln!(out, "{:>2}: {}", date.day(), titles.join(", "));
    }

    if let Some(selected) = app.selection().date() {
        out.push('\n');
        out.push_str(&day_detail(selected, today, app.selected_events()));
    }

    out
}

fn day_cell<S: KeyValueStore>(cell: &DayCell, app: &MonthCal<S>, today: NaiveDate) -> String {
    let Some(date) = cell.date else {
        return " ".repeat(CELL_WIDTH);
    };

    let (open, close) = if app.selection().is_selected(date) {
        ('[', ']')
    } else if date == today {
        ('(', ')')
    } else {
        (' ', ' ')
    };
    let busy = if app.store().events_for(date).is_empty() {
        ' '
    } else {
        '·'
    };

    format!("{}{:>2}{}{} ", open, date.day(), close, busy)
}

/// Detail panel for one day: a header and one line per event with its id.
pub fn day_detail(date: NaiveDate, today: NaiveDate, events: &[Event]) -> String {
    let header = if date == today {
        format!("Today, {}", date.format("%A %b %e"))
    } else if date == today.succ_opt().unwrap_or(today) {
        format!("Tomorrow, {}", date.format("%A %b %e"))
    } else {
        date.format("%A, %b %e %Y").to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", header);

    if events.is_empty() {
        let _ = writeln!(out, "  No events");
        return out;
    }

    for event in events {
        let _ = writeln!(out, "  {:<13}  {}  [{}]", event.time_range(), event.title, event.id);
    }

    out
}
