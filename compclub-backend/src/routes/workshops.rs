use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use compclub_volunteering::availability::{self, Availability};
use compclub_volunteering::model::{VolunteerId, WorkshopId};
use compclub_volunteering::Store;
use serde::Serialize;

use crate::error::AppError;
use crate::identity::Identity;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    workshop_id: WorkshopId,
    volunteer_id: VolunteerId,
    availability: Availability,
}

/// Flips the calling volunteer's availability for the workshop.
pub async fn toggle_availability(
    State(store): State<Arc<dyn Store>>,
    identity: Identity,
    path: Result<Path<WorkshopId>, PathRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let Path(workshop_id) = path?;
    let volunteer = store
        .volunteer_for_user(identity.user)
        .await?
        .ok_or(AppError::UnknownUser(identity.user.0))?;
    let availability =
        availability::toggle_availability(store.as_ref(), volunteer.id, workshop_id).await?;
    Ok(Json(AvailabilityResponse {
        workshop_id,
        volunteer_id: volunteer.id,
        availability,
    }))
}
