//! Diesel queries behind [`crate::PgStore`], one function per store operation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use compclub_volunteering::model::{
    Assignment, AssignmentDetail, AssignmentStatus, Event, EventId, EventSummary, NewEvent,
    NewRegistration, NewUser, NewWorkshop, Registration, UserId, Volunteer, VolunteerId, Workshop,
    WorkshopId,
};
use compclub_volunteering::reconciler::WorkshopRoster;
use compclub_volunteering::Entity;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::error::DatabaseError;
use crate::models::{
    AvailabilityRow, EventRow, NewAssignmentRow, NewEventRow, NewRegistrationRow, NewUserRow,
    NewWorkshopRow, RegistrationRow, UserRow, VolunteerRow, WorkshopRow,
};
use crate::schema::{
    events, registrations, users, volunteer_assignments, volunteers, workshop_availability,
    workshops,
};

/// Foreign key violations mean the referenced row is gone.
fn missing(entity: Entity, id: i32) -> impl FnOnce(diesel::result::Error) -> DatabaseError {
    move |error| match error {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DatabaseError::NotFound { entity, id }
        }
        error => error.into(),
    }
}

fn parse_status(status: &str) -> Result<AssignmentStatus, DatabaseError> {
    status
        .parse()
        .map_err(|_| DatabaseError::InvalidStatus(status.to_owned()))
}

pub async fn create_user(
    connection: &mut AsyncPgConnection,
    user: NewUser,
) -> Result<Volunteer, DatabaseError> {
    connection
        .transaction::<_, DatabaseError, _>(|connection| {
            async move {
                let row = diesel::insert_into(users::table)
                    .values(NewUserRow::from(&user))
                    .returning(UserRow::as_returning())
                    .get_result(connection)
                    .await
                    .map_err(|error| match error {
                        diesel::result::Error::DatabaseError(
                            DatabaseErrorKind::UniqueViolation,
                            _,
                        ) => DatabaseError::UsernameTaken(user.username.clone()),
                        error => error.into(),
                    })?;
                let volunteer = diesel::insert_into(volunteers::table)
                    .values(volunteers::user_id.eq(row.id))
                    .returning(VolunteerRow::as_returning())
                    .get_result(connection)
                    .await?;
                Ok(volunteer.into_volunteer(row))
            }
            .scope_boxed()
        })
        .await
}

pub async fn set_position(
    connection: &mut AsyncPgConnection,
    volunteer: VolunteerId,
    position: Option<String>,
) -> Result<Volunteer, DatabaseError> {
    let row = diesel::update(volunteers::table.find(volunteer.0))
        .set(volunteers::position.eq(position))
        .returning(VolunteerRow::as_returning())
        .get_result(connection)
        .await
        .optional()?
        .ok_or(DatabaseError::NotFound {
            entity: Entity::Volunteer,
            id: volunteer.0,
        })?;
    let user = users::table
        .find(row.user_id)
        .select(UserRow::as_select())
        .first(connection)
        .await?;
    Ok(row.into_volunteer(user))
}

pub async fn volunteer(
    connection: &mut AsyncPgConnection,
    id: VolunteerId,
) -> Result<Option<Volunteer>, DatabaseError> {
    Ok(volunteers::table
        .inner_join(users::table)
        .filter(volunteers::id.eq(id.0))
        .select((VolunteerRow::as_select(), UserRow::as_select()))
        .first::<(VolunteerRow, UserRow)>(connection)
        .await
        .optional()?
        .map(|(volunteer, user)| volunteer.into_volunteer(user)))
}

pub async fn volunteer_for_user(
    connection: &mut AsyncPgConnection,
    user: UserId,
) -> Result<Option<Volunteer>, DatabaseError> {
    Ok(volunteers::table
        .inner_join(users::table)
        .filter(volunteers::user_id.eq(user.0))
        .select((VolunteerRow::as_select(), UserRow::as_select()))
        .first::<(VolunteerRow, UserRow)>(connection)
        .await
        .optional()?
        .map(|(volunteer, user)| volunteer.into_volunteer(user)))
}

pub async fn volunteers(
    connection: &mut AsyncPgConnection,
    ids: &[VolunteerId],
) -> Result<Vec<Volunteer>, DatabaseError> {
    let ids = ids.iter().map(|id| id.0).collect::<Vec<_>>();
    Ok(volunteers::table
        .inner_join(users::table)
        .filter(volunteers::id.eq_any(ids))
        .order(volunteers::id)
        .select((VolunteerRow::as_select(), UserRow::as_select()))
        .load::<(VolunteerRow, UserRow)>(connection)
        .await?
        .into_iter()
        .map(|(volunteer, user)| volunteer.into_volunteer(user))
        .collect())
}

pub async fn create_event(
    connection: &mut AsyncPgConnection,
    event: NewEvent,
    slug: String,
) -> Result<Event, DatabaseError> {
    let owner = event.owner.map_or(0, |owner| owner.0);
    let row = diesel::insert_into(events::table)
        .values(NewEventRow::new(&event, &slug))
        .returning(EventRow::as_returning())
        .get_result(connection)
        .await
        .map_err(missing(Entity::Volunteer, owner))?;
    Ok(row.into())
}

pub async fn event(
    connection: &mut AsyncPgConnection,
    id: EventId,
) -> Result<Option<Event>, DatabaseError> {
    Ok(events::table
        .find(id.0)
        .select(EventRow::as_select())
        .first(connection)
        .await
        .optional()?
        .map(Event::from))
}

pub async fn events_finishing_after(
    connection: &mut AsyncPgConnection,
    date: NaiveDate,
) -> Result<Vec<EventSummary>, DatabaseError> {
    let rows = events::table
        .filter(events::finish_date.ge(date))
        .order((events::start_date, events::id))
        .select(EventRow::as_select())
        .load(connection)
        .await?;
    let ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
    let counts = workshops::table
        .filter(workshops::event_id.eq_any(ids))
        .group_by(workshops::event_id)
        .select((workshops::event_id, diesel::dsl::count(workshops::id)))
        .load::<(i32, i64)>(connection)
        .await?
        .into_iter()
        .collect::<BTreeMap<_, _>>();
    Ok(rows
        .into_iter()
        .map(|row| EventSummary {
            workshop_count: counts
                .get(&row.id)
                .map_or(0, |count| usize::try_from(*count).unwrap_or_default()),
            event: row.into(),
        })
        .collect())
}

pub async fn create_workshops(
    connection: &mut AsyncPgConnection,
    new_workshops: Vec<NewWorkshop>,
) -> Result<Vec<Workshop>, DatabaseError> {
    let Some(first) = new_workshops.as_slice().first() else {
        return Ok(Vec::new());
    };
    let event = first.event_id.0;
    let rows = new_workshops
        .iter()
        .map(NewWorkshopRow::from)
        .collect::<Vec<_>>();
    // a single multi-row insert is atomic on its own
    let created = diesel::insert_into(workshops::table)
        .values(rows)
        .returning(WorkshopRow::as_returning())
        .get_results(connection)
        .await
        .map_err(missing(Entity::Event, event))?;
    Ok(created.into_iter().map(Workshop::from).collect())
}

pub async fn workshop(
    connection: &mut AsyncPgConnection,
    id: WorkshopId,
) -> Result<Option<Workshop>, DatabaseError> {
    Ok(workshops::table
        .find(id.0)
        .select(WorkshopRow::as_select())
        .first(connection)
        .await
        .optional()?
        .map(Workshop::from))
}

pub async fn event_workshops(
    connection: &mut AsyncPgConnection,
    event: EventId,
) -> Result<Vec<Workshop>, DatabaseError> {
    Ok(workshops::table
        .filter(workshops::event_id.eq(event.0))
        .order((workshops::date, workshops::start_time, workshops::id))
        .select(WorkshopRow::as_select())
        .load(connection)
        .await?
        .into_iter()
        .map(Workshop::from)
        .collect())
}

pub async fn roster(
    connection: &mut AsyncPgConnection,
    id: WorkshopId,
) -> Result<Option<WorkshopRoster>, DatabaseError> {
    let Some(workshop) = workshop(connection, id).await? else {
        return Ok(None);
    };
    let mut roster = WorkshopRoster::new(workshop);
    roster.available = workshop_availability::table
        .filter(workshop_availability::workshop_id.eq(id.0))
        .select(workshop_availability::volunteer_id)
        .load::<i32>(connection)
        .await?
        .into_iter()
        .map(VolunteerId)
        .collect::<BTreeSet<_>>();
    roster.assignments = volunteer_assignments::table
        .filter(volunteer_assignments::workshop_id.eq(id.0))
        .select((
            volunteer_assignments::volunteer_id,
            volunteer_assignments::status,
        ))
        .load::<(i32, String)>(connection)
        .await?
        .into_iter()
        .map(|(volunteer, status)| Ok((VolunteerId(volunteer), parse_status(&status)?)))
        .collect::<Result<BTreeMap<_, _>, DatabaseError>>()?;
    Ok(Some(roster))
}

async fn require_volunteer(
    connection: &mut AsyncPgConnection,
    id: VolunteerId,
) -> Result<(), DatabaseError> {
    volunteers::table
        .find(id.0)
        .select(volunteers::id)
        .first::<i32>(connection)
        .await
        .optional()?
        .map(|_| ())
        .ok_or(DatabaseError::NotFound {
            entity: Entity::Volunteer,
            id: id.0,
        })
}

async fn require_workshop(
    connection: &mut AsyncPgConnection,
    id: WorkshopId,
) -> Result<(), DatabaseError> {
    workshops::table
        .find(id.0)
        .select(workshops::id)
        .first::<i32>(connection)
        .await
        .optional()?
        .map(|_| ())
        .ok_or(DatabaseError::NotFound {
            entity: Entity::Workshop,
            id: id.0,
        })
}

pub async fn toggle_availability(
    connection: &mut AsyncPgConnection,
    volunteer: VolunteerId,
    workshop: WorkshopId,
) -> Result<bool, DatabaseError> {
    connection
        .transaction::<_, DatabaseError, _>(|connection| {
            async move {
                require_volunteer(connection, volunteer).await?;
                require_workshop(connection, workshop).await?;
                let removed = diesel::delete(
                    workshop_availability::table.find((workshop.0, volunteer.0)),
                )
                .execute(connection)
                .await?;
                if removed > 0 {
                    return Ok(false);
                }
                diesel::insert_into(workshop_availability::table)
                    .values(AvailabilityRow {
                        workshop_id: workshop.0,
                        volunteer_id: volunteer.0,
                    })
                    .on_conflict_do_nothing()
                    .execute(connection)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
}

pub async fn available_workshops(
    connection: &mut AsyncPgConnection,
    volunteer: VolunteerId,
    event: EventId,
) -> Result<Vec<WorkshopId>, DatabaseError> {
    Ok(workshop_availability::table
        .inner_join(workshops::table)
        .filter(workshop_availability::volunteer_id.eq(volunteer.0))
        .filter(workshops::event_id.eq(event.0))
        .order((workshops::date, workshops::start_time, workshops::id))
        .select(workshops::id)
        .load::<i32>(connection)
        .await?
        .into_iter()
        .map(WorkshopId)
        .collect())
}

pub async fn upsert_assignments(
    connection: &mut AsyncPgConnection,
    workshop: WorkshopId,
    decisions: &BTreeMap<VolunteerId, AssignmentStatus>,
) -> Result<Vec<Assignment>, DatabaseError> {
    connection
        .transaction::<_, DatabaseError, _>(|connection| {
            async move {
                require_workshop(connection, workshop).await?;
                let ids = decisions.keys().map(|id| id.0).collect::<Vec<_>>();
                let known = volunteers::table
                    .filter(volunteers::id.eq_any(&ids))
                    .select(volunteers::id)
                    .load::<i32>(connection)
                    .await?
                    .into_iter()
                    .collect::<BTreeSet<_>>();
                if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
                    return Err(DatabaseError::NotFound {
                        entity: Entity::Volunteer,
                        id: *missing,
                    });
                }
                if decisions.is_empty() {
                    return Ok(Vec::new());
                }

                let rows = decisions
                    .iter()
                    .map(|(volunteer, status)| NewAssignmentRow {
                        workshop_id: workshop.0,
                        volunteer_id: volunteer.0,
                        status: status.code(),
                    })
                    .collect::<Vec<_>>();
                diesel::insert_into(volunteer_assignments::table)
                    .values(rows)
                    .on_conflict((
                        volunteer_assignments::workshop_id,
                        volunteer_assignments::volunteer_id,
                    ))
                    .do_update()
                    .set(volunteer_assignments::status.eq(excluded(volunteer_assignments::status)))
                    .execute(connection)
                    .await?;
                debug!(workshop = %workshop, count = decisions.len(), "upserted assignments");

                Ok(decisions
                    .iter()
                    .map(|(volunteer, status)| Assignment {
                        workshop_id: workshop,
                        volunteer_id: *volunteer,
                        status: *status,
                    })
                    .collect())
            }
            .scope_boxed()
        })
        .await
}

pub async fn event_assignments(
    connection: &mut AsyncPgConnection,
    event: EventId,
) -> Result<Vec<AssignmentDetail>, DatabaseError> {
    volunteer_assignments::table
        .inner_join(workshops::table)
        .inner_join(volunteers::table.inner_join(users::table))
        .filter(workshops::event_id.eq(event.0))
        .order((volunteers::id, workshops::date, workshops::start_time))
        .select((
            volunteer_assignments::status,
            WorkshopRow::as_select(),
            VolunteerRow::as_select(),
            UserRow::as_select(),
        ))
        .load::<(String, WorkshopRow, VolunteerRow, UserRow)>(connection)
        .await?
        .into_iter()
        .map(|(status, workshop, volunteer, user)| {
            Ok(AssignmentDetail {
                volunteer: volunteer.into_volunteer(user),
                workshop: workshop.into(),
                status: parse_status(&status)?,
            })
        })
        .collect()
}

pub async fn create_registration(
    connection: &mut AsyncPgConnection,
    registration: NewRegistration,
) -> Result<Registration, DatabaseError> {
    let row = diesel::insert_into(registrations::table)
        .values(NewRegistrationRow::from(&registration))
        .returning(RegistrationRow::as_returning())
        .get_result(connection)
        .await
        .map_err(missing(Entity::Event, registration.event_id.0))?;
    Ok(row.into())
}
