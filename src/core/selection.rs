use chrono::NaiveDate;

use crate::core::event::EventId;

/// What the event form is currently bound to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No date selected; the form is hidden.
    #[default]
    Idle,
    /// A date is selected and the form adds new events to it.
    DateSelected(NaiveDate),
    /// The form edits an existing event on `date`.
    Editing { date: NaiveDate, event_id: EventId },
}

impl Selection {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Idle => None,
            Self::DateSelected(date) | Self::Editing { date, .. } => Some(*date),
        }
    }

    pub fn editing(&self) -> Option<&EventId> {
        match self {
            Self::Editing { event_id, .. } => Some(event_id),
            _ => None,
        }
    }

    pub fn is_selected(&self, date: NaiveDate) -> bool {
        self.date() == Some(date)
    }

    /// Drop any in-progress edit but keep the date.
    pub fn stop_editing(&mut self) {
        if let Self::Editing { date, .. } = *self {
            *self = Self::DateSelected(date);
        }
    }

    /// Enter edit mode for `event_id` on the selected date. Returns false when
    /// no date is selected.
    pub fn start_editing(&mut self, event_id: EventId) -> bool {
        match self.date() {
            Some(date) => {
                *self = Self::Editing { date, event_id };
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
    }

    #[test]
    fn idle_cannot_start_editing() {
        let mut selection = Selection::Idle;
        assert!(!selection.start_editing(EventId::from("x")));
        assert_eq!(selection, Selection::Idle);
        assert_eq!(selection.date(), None);
    }

    #[test]
    fn edit_then_stop_returns_to_date() {
        let mut selection = Selection::DateSelected(day());
        assert!(selection.start_editing(EventId::from("x")));
        assert_eq!(selection.editing(), Some(&EventId::from("x")));
        assert!(selection.is_selected(day()));

        selection.stop_editing();
        assert_eq!(selection, Selection::DateSelected(day()));
    }
}
