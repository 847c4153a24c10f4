use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use compclub_volunteering::model::{NewUser, Volunteer, VolunteerId};
use compclub_volunteering::{accounts, Store};
use serde::Deserialize;

use crate::error::AppError;
use crate::identity::Staff;

pub async fn create(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<Volunteer>), AppError> {
    let Json(new_user) = payload?;
    let volunteer = accounts::create_user(store.as_ref(), new_user).await?;
    Ok((StatusCode::CREATED, Json(volunteer)))
}

#[derive(Deserialize)]
pub struct PositionPayload {
    #[serde(default)]
    position: Option<String>,
}

pub async fn set_position(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    path: Result<Path<VolunteerId>, PathRejection>,
    payload: Result<Json<PositionPayload>, JsonRejection>,
) -> Result<Json<Volunteer>, AppError> {
    let Path(volunteer_id) = path?;
    let Json(payload) = payload?;
    let volunteer = accounts::set_position(store.as_ref(), volunteer_id, payload.position).await?;
    Ok(Json(volunteer))
}
