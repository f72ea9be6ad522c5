use chrono::NaiveDate;

use crate::core::event::EventId;
use crate::core::grid::YearMonth;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Month navigation
    PrevMonth,
    NextMonth,
    ShowMonth(YearMonth),
    SelectDay(NaiveDate),

    // Event form
    SetTitle(String),
    SetStartTime(String),
    SetEndTime(String),
    Submit,
    EditEvent(EventId),
    CancelEdit,

    // Event CRUD
    DeleteEvent(EventId),
}
