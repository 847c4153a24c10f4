use serde::Serialize;
use tracing::info;

use crate::error::{Entity, Error, Result};
use crate::model::{EventId, VolunteerId, WorkshopId};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

/// Adds the volunteer to the workshop's availability set if absent, removes
/// them otherwise. Assignments are left alone.
pub async fn toggle_availability(
    store: &dyn Store,
    volunteer_id: VolunteerId,
    workshop_id: WorkshopId,
) -> Result<Availability> {
    let availability = Availability::from(
        store
            .toggle_availability(volunteer_id, workshop_id)
            .await?,
    );
    info!(%volunteer_id, %workshop_id, ?availability, "toggled availability");
    Ok(availability)
}

/// Workshops of the event the volunteer currently offers to help with.
pub async fn available_workshops(
    store: &dyn Store,
    volunteer_id: VolunteerId,
    event_id: EventId,
) -> Result<Vec<WorkshopId>> {
    if store.event(event_id).await?.is_none() {
        return Err(Error::not_found(Entity::Event, event_id.0));
    }
    store.available_workshops(volunteer_id, event_id).await
}
