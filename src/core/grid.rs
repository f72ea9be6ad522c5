use std::fmt;

use chrono::{Datelike, Months, NaiveDate};

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One position in the month grid: a leading blank or a day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: Option<NaiveDate>,
}

impl DayCell {
    pub fn blank() -> Self {
        Self { date: None }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self { date: Some(date) }
    }

    pub fn is_blank(&self) -> bool {
        self.date.is_none()
    }
}

/// A calendar month. Always valid: constructors normalize out-of-range months
/// into neighbouring years and clamp to the range of [`NaiveDate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    /// 0 = January
    month0: u32,
}

impl YearMonth {
    /// `month0` is zero-based and may be out of range: 12 is January of the
    /// following year, -1 is December of the previous one.
    pub fn new(year: i32, month0: i32) -> Self {
        Self::from_total(i64::from(year) * 12 + i64::from(month0))
    }

    /// Months since January of year 0, clamped to the months chrono can represent.
    fn from_total(total: i64) -> Self {
        let min = Self::of(NaiveDate::MIN).total();
        let max = Self::of(NaiveDate::MAX).total();
        let total = total.clamp(min, max);
        Self {
            year: total.div_euclid(12) as i32,
            month0: total.rem_euclid(12) as u32,
        }
    }

    fn total(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month0)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn current() -> Self {
        Self::of(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    /// One-based month number.
    pub fn month(&self) -> u32 {
        self.month0 + 1
    }

    pub fn prev(&self) -> Self {
        self.offset(-1)
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    /// Saturates at the first and last representable months.
    pub fn offset(&self, months: i64) -> Self {
        Self::from_total(self.total().saturating_add(months))
    }

    pub fn first_day(&self) -> NaiveDate {
        // In range for every clamped value; MIN is the first day of its month.
        NaiveDate::from_ymd_opt(self.year, self.month(), 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month: the day before the first of the next month.
    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    /// Number of blank cells before day 1 (0 = Sunday .. 6 = Saturday).
    pub fn leading_blanks(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Parse "YYYY-MM".
    pub fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.trim().split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(Self::of)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", MONTH_NAMES[self.month0 as usize], self.year)
    }
}

/// Cells for a month view: leading blanks so day 1 lands in its weekday
/// column, then one cell per day.
pub fn generate(year: i32, month0: i32) -> Vec<DayCell> {
    month_cells(YearMonth::new(year, month0))
}

pub fn month_cells(month: YearMonth) -> Vec<DayCell> {
    let blanks = month.leading_blanks();
    let days = month.days_in_month();

    let mut cells = Vec::with_capacity((blanks + days) as usize);
    cells.extend((0..blanks).map(|_| DayCell::blank()));
    cells.extend(
        (1..=days)
            .filter_map(|day| NaiveDate::from_ymd_opt(month.year(), month.month(), day))
            .map(DayCell::day),
    );
    cells
}

/// Split cells into 7-column rows. The last row may be short.
pub fn weeks(cells: &[DayCell]) -> impl Iterator<Item = &[DayCell]> {
    cells.chunks(7)
}
