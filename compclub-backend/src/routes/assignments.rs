use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use compclub_volunteering::model::{EventId, WorkshopId};
use compclub_volunteering::reconciler::{self, parse_decisions, RosterView};
use compclub_volunteering::Store;
use serde_json::Value;

use crate::error::AppError;
use crate::identity::Staff;

pub async fn event_overview(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    path: Result<Path<EventId>, PathRejection>,
) -> Result<Json<Vec<RosterView>>, AppError> {
    let Path(event_id) = path?;
    Ok(Json(reconciler::event_overview(store.as_ref(), event_id).await?))
}

pub async fn workshop_overview(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    path: Result<Path<WorkshopId>, PathRejection>,
) -> Result<Json<RosterView>, AppError> {
    let Path(workshop_id) = path?;
    Ok(Json(
        reconciler::workshop_overview(store.as_ref(), workshop_id).await?,
    ))
}

/// Takes the assignment form as a JSON object of `vol_<id>` fields mapped to
/// status codes and answers with the updated roster. Other fields may hold any
/// JSON value and are ignored. A `vol_<id>` field that is not a string is an
/// invalid status.
pub async fn apply(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    path: Result<Path<WorkshopId>, PathRejection>,
    payload: Result<Json<BTreeMap<String, Value>>, JsonRejection>,
) -> Result<Json<RosterView>, AppError> {
    let Path(workshop_id) = path?;
    let Json(fields) = payload?;
    let decisions = parse_decisions(
        fields
            .iter()
            .map(|(name, value)| {
                (name.as_str(), value.as_str().unwrap_or_default())
            }),
    )
    .map_err(compclub_volunteering::Error::from)?;
    reconciler::apply_assignments(store.as_ref(), workshop_id, decisions).await?;
    Ok(Json(
        reconciler::workshop_overview(store.as_ref(), workshop_id).await?,
    ))
}
