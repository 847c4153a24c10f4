use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use compclub_volunteering::model::{
    Assignment, AssignmentDetail, AssignmentStatus, Event, EventId, EventSummary, NewEvent,
    NewRegistration, NewUser, NewWorkshop, Registration, UserId, Volunteer, VolunteerId, Workshop,
    WorkshopId,
};
use compclub_volunteering::reconciler::WorkshopRoster;
use compclub_volunteering::{Result, Store};
use diesel_async::pooled_connection::deadpool::Object;
use diesel_async::AsyncPgConnection;

use crate::error::DatabaseError;
use crate::{queries, Pool};

type PooledConnection = Object<AsyncPgConnection>;

/// [`Store`] backed by PostgreSQL. Every call checks out its own connection.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<PooledConnection, DatabaseError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<Volunteer> {
        let mut connection = self.connection().await?;
        Ok(queries::create_user(&mut connection, user).await?)
    }

    async fn set_position(
        &self,
        volunteer: VolunteerId,
        position: Option<String>,
    ) -> Result<Volunteer> {
        let mut connection = self.connection().await?;
        Ok(queries::set_position(&mut connection, volunteer, position).await?)
    }

    async fn volunteer(&self, id: VolunteerId) -> Result<Option<Volunteer>> {
        let mut connection = self.connection().await?;
        Ok(queries::volunteer(&mut connection, id).await?)
    }

    async fn volunteer_for_user(&self, user: UserId) -> Result<Option<Volunteer>> {
        let mut connection = self.connection().await?;
        Ok(queries::volunteer_for_user(&mut connection, user).await?)
    }

    async fn volunteers(&self, ids: &[VolunteerId]) -> Result<Vec<Volunteer>> {
        let mut connection = self.connection().await?;
        Ok(queries::volunteers(&mut connection, ids).await?)
    }

    async fn create_event(&self, event: NewEvent, slug: String) -> Result<Event> {
        let mut connection = self.connection().await?;
        Ok(queries::create_event(&mut connection, event, slug).await?)
    }

    async fn event(&self, id: EventId) -> Result<Option<Event>> {
        let mut connection = self.connection().await?;
        Ok(queries::event(&mut connection, id).await?)
    }

    async fn events_finishing_after(&self, date: NaiveDate) -> Result<Vec<EventSummary>> {
        let mut connection = self.connection().await?;
        Ok(queries::events_finishing_after(&mut connection, date).await?)
    }

    async fn create_workshops(&self, workshops: Vec<NewWorkshop>) -> Result<Vec<Workshop>> {
        let mut connection = self.connection().await?;
        Ok(queries::create_workshops(&mut connection, workshops).await?)
    }

    async fn workshop(&self, id: WorkshopId) -> Result<Option<Workshop>> {
        let mut connection = self.connection().await?;
        Ok(queries::workshop(&mut connection, id).await?)
    }

    async fn event_workshops(&self, event: EventId) -> Result<Vec<Workshop>> {
        let mut connection = self.connection().await?;
        Ok(queries::event_workshops(&mut connection, event).await?)
    }

    async fn roster(&self, workshop: WorkshopId) -> Result<Option<WorkshopRoster>> {
        let mut connection = self.connection().await?;
        Ok(queries::roster(&mut connection, workshop).await?)
    }

    async fn toggle_availability(
        &self,
        volunteer: VolunteerId,
        workshop: WorkshopId,
    ) -> Result<bool> {
        let mut connection = self.connection().await?;
        Ok(queries::toggle_availability(&mut connection, volunteer, workshop).await?)
    }

    async fn available_workshops(
        &self,
        volunteer: VolunteerId,
        event: EventId,
    ) -> Result<Vec<WorkshopId>> {
        let mut connection = self.connection().await?;
        Ok(queries::available_workshops(&mut connection, volunteer, event).await?)
    }

    async fn upsert_assignments(
        &self,
        workshop: WorkshopId,
        decisions: &BTreeMap<VolunteerId, AssignmentStatus>,
    ) -> Result<Vec<Assignment>> {
        let mut connection = self.connection().await?;
        Ok(queries::upsert_assignments(&mut connection, workshop, decisions).await?)
    }

    async fn event_assignments(&self, event: EventId) -> Result<Vec<AssignmentDetail>> {
        let mut connection = self.connection().await?;
        Ok(queries::event_assignments(&mut connection, event).await?)
    }

    async fn create_registration(&self, registration: NewRegistration) -> Result<Registration> {
        let mut connection = self.connection().await?;
        Ok(queries::create_registration(&mut connection, registration).await?)
    }
}
