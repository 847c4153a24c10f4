//! Assignment status emails.

use core::fmt::Write as _;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{Entity, Error, Result, TransportError};
use crate::model::{AssignmentDetail, Event, EventId, VolunteerId};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEmail {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub recipients: Vec<String>,
}

/// Delivers mail. Failures are reported, never retried here.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_mass(&self, emails: &[StatusEmail]) -> Result<(), TransportError>;
}

fn subject(event: &Event) -> String {
    format!("Your Assignment For Event \"{}\"", event.name)
}

fn body(recipient: &str, event: &Event, lines: &str) -> String {
    format!(
        "\nHello {recipient},\n\nYour current assignments for {event} is as follows:\n\n{lines}\n\nRegards,\nCompClub Team\n",
        event = event.name,
    )
}

/// One email per volunteer with at least one assignment on the event's
/// workshops. Recipients are ordered by volunteer id, each email lists the
/// workshops by name.
pub fn format_status_emails(
    event: &Event,
    assignments: &[AssignmentDetail],
    from: &str,
) -> Vec<StatusEmail> {
    let mut by_volunteer: BTreeMap<VolunteerId, Vec<&AssignmentDetail>> = BTreeMap::new();
    for assignment in assignments
        .iter()
        .filter(|assignment| assignment.workshop.event_id == event.id)
    {
        by_volunteer
            .entry(assignment.volunteer.id)
            .or_default()
            .push(assignment);
    }

    let subject = subject(event);
    by_volunteer
        .into_values()
        .map(|mut assignments| {
            assignments.sort_by(|a, b| {
                (&a.workshop.name, a.workshop.date, a.workshop.start_time).cmp(&(
                    &b.workshop.name,
                    b.workshop.date,
                    b.workshop.start_time,
                ))
            });
            let mut lines = String::new();
            for assignment in &assignments {
                let _ = writeln!(
                    lines,
                    "{}({}-{}): {}",
                    assignment.workshop.name,
                    assignment.workshop.start_time.format("%H:%M:%S"),
                    assignment.workshop.end_time.format("%H:%M:%S"),
                    assignment.status,
                );
            }
            let user = &assignments[0].volunteer.user;
            StatusEmail {
                subject: subject.clone(),
                body: body(&user.first_name, event, &lines),
                from: from.to_owned(),
                recipients: vec![user.email.clone()],
            }
        })
        .collect()
}

pub async fn generate_status_emails(
    store: &dyn Store,
    event_id: EventId,
    from: &str,
) -> Result<Vec<StatusEmail>> {
    let event = store
        .event(event_id)
        .await?
        .ok_or_else(|| Error::not_found(Entity::Event, event_id.0))?;
    let assignments = store.event_assignments(event_id).await?;
    Ok(format_status_emails(&event, &assignments, from))
}

/// Generates and sends the status emails for the event, returning how many
/// were handed to the mailer.
pub async fn send_status_emails(
    store: &dyn Store,
    mailer: &dyn Mailer,
    event_id: EventId,
    from: &str,
) -> Result<usize> {
    let emails = generate_status_emails(store, event_id, from).await?;
    if let Err(err) = mailer.send_mass(&emails).await {
        error!(%event_id, "failed to send status emails: {err}");
        return Err(err.into());
    }
    info!(%event_id, count = emails.len(), "sent status emails");
    Ok(emails.len())
}
