use chrono::NaiveDate;

use crate::core::error::{StoreError, StoreResult, ValidationError};
use crate::core::event::{Event, EventFields};
use crate::core::grid::{self, DayCell, YearMonth};
use crate::core::selection::Selection;
use crate::core::store::EventStore;
use crate::message::Message;
use crate::storage::KeyValueStore;

/// What a handled message changed, for front-ends that report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    None,
    Saved(Event),
    Deleted(bool),
}

/// Month view state: the displayed month, the event form and what it is
/// bound to, and the event store behind it.
///
/// A selected date always lies inside the displayed month.
pub struct MonthCal<S> {
    store: EventStore<S>,
    displayed_month: YearMonth,
    selection: Selection,
    form: EventFields,
    form_defaults: EventFields,
}

impl<S: KeyValueStore> MonthCal<S> {
    pub fn new(store: EventStore<S>, displayed_month: YearMonth) -> Self {
        Self::with_form_defaults(store, displayed_month, EventFields::default())
    }

    pub fn with_form_defaults(
        store: EventStore<S>,
        displayed_month: YearMonth,
        form_defaults: EventFields,
    ) -> Self {
        Self {
            store,
            displayed_month,
            selection: Selection::Idle,
            form: form_defaults.clone(),
            form_defaults,
        }
    }

    pub fn store(&self) -> &EventStore<S> {
        &self.store
    }

    pub fn displayed_month(&self) -> YearMonth {
        self.displayed_month
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn form(&self) -> &EventFields {
        &self.form
    }

    pub fn cells(&self) -> Vec<DayCell> {
        grid::month_cells(self.displayed_month)
    }

    /// Events of the selected date, empty when idle.
    pub fn selected_events(&self) -> &[Event] {
        match self.selection.date() {
            Some(date) => self.store.events_for(date),
            None => &[],
        }
    }

    pub fn update(&mut self, message: Message) -> StoreResult<Outcome> {
        match message {
            Message::PrevMonth => {
                self.show_month(self.displayed_month.prev());
            }

            Message::NextMonth => {
                self.show_month(self.displayed_month.next());
            }

            Message::ShowMonth(month) => {
                self.show_month(month);
            }

            Message::SelectDay(date) => {
                self.select_day(date);
            }

            Message::SetTitle(title) => {
                self.form.title = title;
            }

            Message::SetStartTime(time) => {
                self.form.start_time = time;
            }

            Message::SetEndTime(time) => {
                self.form.end_time = time;
            }

            Message::Submit => return self.submit(),

            Message::EditEvent(id) => {
                let Some(date) = self.selection.date() else {
                    return Ok(Outcome::None);
                };
                match self.store.get(date, &id) {
                    Some(event) => {
                        self.form = event.fields();
                        self.selection.start_editing(id);
                    }
                    None => log::debug!("Ignoring edit of unknown event {} on {}", id, date),
                }
            }

            Message::CancelEdit => {
                if self.selection.editing().is_some() {
                    self.selection.stop_editing();
                    self.reset_form();
                }
            }

            Message::DeleteEvent(id) => {
                let Some(date) = self.selection.date() else {
                    return Ok(Outcome::None);
                };
                let removed = self.store.delete(date, &id)?;
                if self.selection.editing().is_some() {
                    self.selection.stop_editing();
                    self.reset_form();
                }
                return Ok(Outcome::Deleted(removed));
            }
        }

        Ok(Outcome::None)
    }

    fn show_month(&mut self, month: YearMonth) {
        self.displayed_month = month;
        self.selection = Selection::Idle;
        self.reset_form();
    }

    fn select_day(&mut self, date: NaiveDate) {
        if !self.displayed_month.contains(date) {
            self.displayed_month = YearMonth::of(date);
        }
        self.selection = Selection::DateSelected(date);
        self.reset_form();
    }

    fn submit(&mut self) -> StoreResult<Outcome> {
        let saved = match &self.selection {
            Selection::Idle => return Err(ValidationError::NoDateSelected.into()),
            Selection::DateSelected(date) => self.store.add(*date, self.form.clone()),
            Selection::Editing { date, event_id } => {
                self.store.update(*date, event_id, self.form.clone())
            }
        };

        match saved {
            Ok(event) => {
                self.selection.stop_editing();
                self.reset_form();
                Ok(Outcome::Saved(event))
            }
            Err(e @ StoreError::NotFound { .. }) => {
                // The edited event is gone; keep the typed fields for a fresh add.
                log::warn!("{}", e);
                self.selection.stop_editing();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn reset_form(&mut self) {
        self.form = self.form_defaults.clone();
    }
}
