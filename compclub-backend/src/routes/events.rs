use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Local, NaiveDate, NaiveTime};
use compclub_volunteering::availability::available_workshops;
use compclub_volunteering::catalogue::{self, EventPage};
use compclub_volunteering::model::{
    Event, EventId, EventSummary, NewEvent, NewRegistration, NewWorkshop, Recurrence,
    Registration, Workshop, WorkshopId,
};
use compclub_volunteering::Store;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::identity::{Identity, Staff};

#[derive(Deserialize)]
pub struct UpcomingQuery {
    /// Defaults to the server's local date.
    today: Option<NaiveDate>,
}

pub async fn upcoming(
    State(store): State<Arc<dyn Store>>,
    query: Result<Query<UpcomingQuery>, QueryRejection>,
) -> Result<Json<Vec<EventSummary>>, AppError> {
    let Query(query) = query?;
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(catalogue::upcoming_events(store.as_ref(), today).await?))
}

pub async fn create(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let Json(new_event) = payload?;
    let event = catalogue::create_event(store.as_ref(), new_event).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Serialize)]
pub struct EventPageResponse {
    #[serde(flatten)]
    page: EventPage,
    /// Only present when the caller is a known volunteer.
    #[serde(skip_serializing_if = "Option::is_none")]
    available_workshops: Option<Vec<WorkshopId>>,
}

pub async fn page(
    State(store): State<Arc<dyn Store>>,
    identity: Option<Identity>,
    path: Result<Path<EventId>, PathRejection>,
) -> Result<Json<EventPageResponse>, AppError> {
    let Path(event_id) = path?;
    let page = catalogue::event_page(store.as_ref(), event_id).await?;
    let volunteer = match identity {
        Some(identity) => store.volunteer_for_user(identity.user).await?,
        None => None,
    };
    let available_workshops = match volunteer {
        Some(volunteer) => {
            Some(available_workshops(store.as_ref(), volunteer.id, event_id).await?)
        }
        None => None,
    };
    Ok(Json(EventPageResponse {
        page,
        available_workshops,
    }))
}

#[derive(Deserialize)]
pub struct WorkshopPayload {
    name: String,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    #[serde(default)]
    description: Option<String>,
    location: String,
    #[serde(default)]
    recurrence: Recurrence,
}

pub async fn create_workshops(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    path: Result<Path<EventId>, PathRejection>,
    payload: Result<Json<WorkshopPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Workshop>>), AppError> {
    let Path(event_id) = path?;
    let Json(payload) = payload?;
    let workshop = NewWorkshop {
        event_id,
        name: payload.name,
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        description: payload.description,
        location: payload.location,
    };
    let workshops =
        catalogue::create_workshops(store.as_ref(), workshop, payload.recurrence).await?;
    Ok((StatusCode::CREATED, Json(workshops)))
}

#[derive(Deserialize)]
pub struct RegistrationPayload {
    name: String,
    email: String,
    phone_number: String,
    date_of_birth: NaiveDate,
    parent_email: String,
    parent_phone_number: String,
}

pub async fn register(
    State(store): State<Arc<dyn Store>>,
    path: Result<Path<EventId>, PathRejection>,
    payload: Result<Json<RegistrationPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let Path(event_id) = path?;
    let Json(payload) = payload?;
    let registration = catalogue::register(
        store.as_ref(),
        NewRegistration {
            event_id,
            name: payload.name,
            email: payload.email,
            phone_number: payload.phone_number,
            date_of_birth: payload.date_of_birth,
            parent_email: payload.parent_email,
            parent_phone_number: payload.parent_phone_number,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(registration)))
}
