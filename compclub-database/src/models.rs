//! Row types mirroring [`crate::schema`] and their conversion into the
//! domain types of `compclub-volunteering`.

use chrono::{NaiveDate, NaiveTime};
use compclub_volunteering::model::{
    Event, EventId, NewEvent, NewRegistration, NewUser, NewWorkshop, Registration,
    RegistrationId, User, UserId, Volunteer, VolunteerId, Workshop, WorkshopId,
};
use diesel::prelude::*;

use crate::schema::{
    events, registrations, users, volunteer_assignments, volunteers, workshop_availability,
    workshops,
};

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            username: &user.username,
            first_name: &user.first_name,
            last_name: &user.last_name,
            email: &user.email,
            phone_number: &user.phone_number,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = volunteers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VolunteerRow {
    pub id: i32,
    pub user_id: i32,
    pub position: Option<String>,
}

impl VolunteerRow {
    pub fn into_volunteer(self, user: UserRow) -> Volunteer {
        Volunteer {
            id: VolunteerId(self.id),
            user: user.into(),
            position: self.position,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub owner_id: Option<i32>,
    pub description: Option<String>,
    pub prerequisite: String,
    pub period: String,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId(row.id),
            name: row.name,
            slug: row.slug,
            start_date: row.start_date,
            finish_date: row.finish_date,
            owner: row.owner_id.map(VolunteerId),
            description: row.description,
            prerequisite: row.prerequisite,
            period: row.period,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = events)]
pub struct NewEventRow<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub owner_id: Option<i32>,
    pub description: Option<&'a str>,
    pub prerequisite: &'a str,
    pub period: &'a str,
}

impl<'a> NewEventRow<'a> {
    pub fn new(event: &'a NewEvent, slug: &'a str) -> Self {
        Self {
            name: &event.name,
            slug,
            start_date: event.start_date,
            finish_date: event.finish_date,
            owner_id: event.owner.map(|owner| owner.0),
            description: event.description.as_deref(),
            prerequisite: &event.prerequisite,
            period: &event.period,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = workshops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkshopRow {
    pub id: i32,
    pub event_id: i32,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
    pub location: String,
}

impl From<WorkshopRow> for Workshop {
    fn from(row: WorkshopRow) -> Self {
        Self {
            id: WorkshopId(row.id),
            event_id: EventId(row.event_id),
            name: row.name,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            description: row.description,
            location: row.location,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = workshops)]
pub struct NewWorkshopRow<'a> {
    pub event_id: i32,
    pub name: &'a str,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<&'a str>,
    pub location: &'a str,
}

impl<'a> From<&'a NewWorkshop> for NewWorkshopRow<'a> {
    fn from(workshop: &'a NewWorkshop) -> Self {
        Self {
            event_id: workshop.event_id.0,
            name: &workshop.name,
            date: workshop.date,
            start_time: workshop.start_time,
            end_time: workshop.end_time,
            description: workshop.description.as_deref(),
            location: &workshop.location,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = workshop_availability)]
pub struct AvailabilityRow {
    pub workshop_id: i32,
    pub volunteer_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = volunteer_assignments)]
pub struct NewAssignmentRow {
    pub workshop_id: i32,
    pub volunteer_id: i32,
    pub status: &'static str,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RegistrationRow {
    pub id: i32,
    pub event_id: i32,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub parent_email: String,
    pub parent_phone_number: String,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            id: RegistrationId(row.id),
            event_id: EventId(row.event_id),
            name: row.name,
            email: row.email,
            phone_number: row.phone_number,
            date_of_birth: row.date_of_birth,
            parent_email: row.parent_email,
            parent_phone_number: row.parent_phone_number,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = registrations)]
pub struct NewRegistrationRow<'a> {
    pub event_id: i32,
    pub name: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub date_of_birth: NaiveDate,
    pub parent_email: &'a str,
    pub parent_phone_number: &'a str,
}

impl<'a> From<&'a NewRegistration> for NewRegistrationRow<'a> {
    fn from(registration: &'a NewRegistration) -> Self {
        Self {
            event_id: registration.event_id.0,
            name: &registration.name,
            email: &registration.email,
            phone_number: &registration.phone_number,
            date_of_birth: registration.date_of_birth,
            parent_email: &registration.parent_email,
            parent_phone_number: &registration.parent_phone_number,
        }
    }
}
