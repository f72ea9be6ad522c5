pub mod month_calendar;
