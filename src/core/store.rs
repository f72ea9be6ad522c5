use chrono::NaiveDate;

use crate::core::error::{StoreError, StoreResult, ValidationError};
use crate::core::event::{self, Event, EventFields, EventId, EventsByDate};
use crate::core::grid::YearMonth;
use crate::storage::{EVENTS_BACKUP_KEY, EVENTS_KEY, KeyValueStore};

/// Date-bucketed events mirrored to a single storage key.
///
/// Every mutation is applied to a staged copy, written out once, and only
/// committed in memory after the write succeeds, so the in-memory map always
/// equals what was last persisted.
pub struct EventStore<S> {
    storage: S,
    events: EventsByDate,
    /// Raw stored text that was not read in full. Copied to
    /// [`EVENTS_BACKUP_KEY`] before the first write replaces it.
    unreadable: Option<String>,
}

impl<S: KeyValueStore> EventStore<S> {
    /// Missing or unreadable data yields an empty store. Malformed records
    /// are skipped and the rest kept. Loading never writes.
    pub fn load(storage: S) -> Self {
        let mut unreadable = None;
        let events = match storage.get(EVENTS_KEY) {
            Ok(Some(json)) => match event::parse_events(&json) {
                Ok(parsed) => {
                    let mut events = parsed.events;
                    events.retain(|_, bucket| !bucket.is_empty());
                    if parsed.discarded > 0 {
                        log::warn!(
                            "Skipped {} unreadable stored entries; original kept until the next save",
                            parsed.discarded
                        );
                        unreadable = Some(json);
                    }
                    log::debug!("Loaded events for {} dates", events.len());
                    events
                }
                Err(e) => {
                    log::warn!("Discarding unparseable stored events: {}", e);
                    unreadable = Some(json);
                    EventsByDate::new()
                }
            },
            Ok(None) => EventsByDate::new(),
            Err(e) => {
                log::warn!("Failed to read stored events: {}", e);
                EventsByDate::new()
            }
        };

        Self {
            storage,
            events,
            unreadable,
        }
    }

    pub fn events(&self) -> &EventsByDate {
        &self.events
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// The bucket for `date`, empty if nothing is scheduled.
    pub fn events_for(&self, date: NaiveDate) -> &[Event] {
        self.events.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, date: NaiveDate, id: &EventId) -> Option<&Event> {
        self.events_for(date).iter().find(|e| &e.id == id)
    }

    /// Dates within `month` that have at least one event.
    pub fn busy_days(&self, month: YearMonth) -> Vec<NaiveDate> {
        let first = month.first_day();
        self.events
            .range(first..)
            .map(|(date, _)| *date)
            .take_while(|date| month.contains(*date))
            .collect()
    }

    pub fn add(&mut self, date: NaiveDate, fields: EventFields) -> StoreResult<Event> {
        if !fields.has_title() {
            return Err(ValidationError::EmptyTitle.into());
        }

        let event = Event::new(fields);
        let mut staged = self.events.clone();
        staged.entry(date).or_default().push(event.clone());
        self.commit(staged)?;

        log::info!("Added event {} on {}", event.id, date);
        Ok(event)
    }

    pub fn update(
        &mut self,
        date: NaiveDate,
        id: &EventId,
        fields: EventFields,
    ) -> StoreResult<Event> {
        if !fields.has_title() {
            return Err(ValidationError::EmptyTitle.into());
        }

        let not_found = || StoreError::NotFound {
            date,
            id: id.clone(),
        };

        let mut staged = self.events.clone();
        let slot = staged
            .get_mut(&date)
            .and_then(|bucket| bucket.iter_mut().find(|e| &e.id == id))
            .ok_or_else(not_found)?;
        let event = Event::with_id(id.clone(), fields);
        *slot = event.clone();
        self.commit(staged)?;

        log::info!("Updated event {} on {}", id, date);
        Ok(event)
    }

    /// Returns whether anything was removed. An unknown id writes nothing.
    pub fn delete(&mut self, date: NaiveDate, id: &EventId) -> StoreResult<bool> {
        let Some(bucket) = self.events.get(&date) else {
            return Ok(false);
        };
        if !bucket.iter().any(|e| &e.id == id) {
            return Ok(false);
        }

        let mut staged = self.events.clone();
        if let Some(bucket) = staged.get_mut(&date) {
            bucket.retain(|e| &e.id != id);
            if bucket.is_empty() {
                staged.remove(&date);
            }
        }
        self.commit(staged)?;

        log::info!("Deleted event {} on {}", id, date);
        Ok(true)
    }

    fn commit(&mut self, staged: EventsByDate) -> StoreResult<()> {
        let json = event::serialize_events(&staged).map_err(|e| {
            log::error!("Failed to serialize events: {}", e);
            StoreError::Serialize(e)
        })?;
        if let Some(raw) = &self.unreadable {
            if let Err(e) = self.storage.set(EVENTS_BACKUP_KEY, raw) {
                log::error!("Failed to back up unreadable events: {}", e);
                return Err(e.into());
            }
            log::warn!("Backed up unreadable stored events to {}", EVENTS_BACKUP_KEY);
        }
        if let Err(e) = self.storage.set(EVENTS_KEY, &json) {
            log::error!("Failed to save events: {}", e);
            return Err(e.into());
        }
        self.unreadable = None;
        self.events = staged;
        Ok(())
    }
}
