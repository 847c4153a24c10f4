//! Events, workshops and student registrations.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Entity, Error, Result};
use crate::model::{
    Event, EventId, EventSummary, NewEvent, NewRegistration, NewWorkshop, Recurrence,
    Registration, Workshop,
};
use crate::store::Store;

const UNKNOWN_LOCATION: &str = "TBA";

/// URL name of an event: lowercase alphanumerics, separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }
    slug.trim_matches('_').to_owned()
}

pub async fn create_event(store: &dyn Store, new_event: NewEvent) -> Result<Event> {
    new_event.validate()?;
    let slug = slugify(&new_event.name);
    let event = store.create_event(new_event, slug).await?;
    info!(event_id = %event.id, slug = %event.slug, "created event");
    Ok(event)
}

pub async fn upcoming_events(store: &dyn Store, today: NaiveDate) -> Result<Vec<EventSummary>> {
    store.events_finishing_after(today).await
}

#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    pub event: Event,
    pub workshops: Vec<Workshop>,
    pub location: String,
}

pub async fn event_page(store: &dyn Store, event_id: EventId) -> Result<EventPage> {
    let event = store
        .event(event_id)
        .await?
        .ok_or_else(|| Error::not_found(Entity::Event, event_id.0))?;
    let workshops = store.event_workshops(event_id).await?;
    let location = workshops
        .first()
        .map_or_else(|| UNKNOWN_LOCATION.to_owned(), |workshop| workshop.location.clone());
    Ok(EventPage {
        event,
        workshops,
        location,
    })
}

/// The workshop itself followed by its repetitions up to and including the
/// event's last day.
pub fn expand_recurrence(
    new_workshop: NewWorkshop,
    event: &Event,
    recurrence: Recurrence,
) -> Vec<NewWorkshop> {
    let Some(interval) = recurrence.interval_days() else {
        return vec![new_workshop];
    };
    let mut workshops = Vec::new();
    let mut date = new_workshop.date.checked_add_days(Days::new(interval));
    while let Some(current) = date.filter(|current| *current <= event.finish_date) {
        workshops.push(NewWorkshop {
            date: current,
            ..new_workshop.clone()
        });
        date = current.checked_add_days(Days::new(interval));
    }
    workshops.insert(0, new_workshop);
    workshops
}

pub async fn create_workshops(
    store: &dyn Store,
    new_workshop: NewWorkshop,
    recurrence: Recurrence,
) -> Result<Vec<Workshop>> {
    let event_id = new_workshop.event_id;
    let event = store
        .event(event_id)
        .await?
        .ok_or_else(|| Error::not_found(Entity::Event, event_id.0))?;
    if let Err(err) = new_workshop.validate_for(&event) {
        warn!(%event_id, "rejected workshop: {err}");
        return Err(err.into());
    }
    let workshops = store
        .create_workshops(expand_recurrence(new_workshop, &event, recurrence))
        .await?;
    info!(%event_id, count = workshops.len(), ?recurrence, "created workshops");
    Ok(workshops)
}

pub async fn register(store: &dyn Store, registration: NewRegistration) -> Result<Registration> {
    registration.validate()?;
    let event_id = registration.event_id;
    if store.event(event_id).await?.is_none() {
        return Err(Error::not_found(Entity::Event, event_id.0));
    }
    let registration = store.create_registration(registration).await?;
    info!(%event_id, registration_id = %registration.id, "registered student");
    Ok(registration)
}
