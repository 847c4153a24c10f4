use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use compclub_config::MailConfig;
use compclub_volunteering::model::EventId;
use compclub_volunteering::notifier::{self, Mailer, StatusEmail};
use compclub_volunteering::Store;
use serde::Serialize;

use crate::error::AppError;
use crate::identity::Staff;

pub async fn preview(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    State(mail): State<MailConfig>,
    path: Result<Path<EventId>, PathRejection>,
) -> Result<Json<Vec<StatusEmail>>, AppError> {
    let Path(event_id) = path?;
    Ok(Json(
        notifier::generate_status_emails(store.as_ref(), event_id, &mail.from).await?,
    ))
}

#[derive(Serialize)]
pub struct SendReport {
    sent: usize,
}

pub async fn send(
    Staff(_): Staff,
    State(store): State<Arc<dyn Store>>,
    State(mailer): State<Arc<dyn Mailer>>,
    State(mail): State<MailConfig>,
    path: Result<Path<EventId>, PathRejection>,
) -> Result<Json<SendReport>, AppError> {
    let Path(event_id) = path?;
    let sent =
        notifier::send_status_emails(store.as_ref(), mailer.as_ref(), event_id, &mail.from)
            .await?;
    Ok(Json(SendReport { sent }))
}
