use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{
    Assignment, AssignmentDetail, AssignmentStatus, Event, EventId, EventSummary, NewEvent,
    NewRegistration, NewUser, NewWorkshop, Registration, UserId, Volunteer, VolunteerId, Workshop,
    WorkshopId,
};
use crate::reconciler::WorkshopRoster;

/// Persistence for everything the volunteering operations touch.
///
/// Implementations validate nothing beyond referential integrity, callers are
/// expected to go through the functions in this crate. Methods documented as
/// atomic must either apply completely or not at all.
#[async_trait]
pub trait Store: Send + Sync {
    /// Creates the user together with its volunteer record. Atomic.
    async fn create_user(&self, user: NewUser) -> Result<Volunteer>;

    async fn set_position(
        &self,
        volunteer: VolunteerId,
        position: Option<String>,
    ) -> Result<Volunteer>;

    async fn volunteer(&self, id: VolunteerId) -> Result<Option<Volunteer>>;

    async fn volunteer_for_user(&self, user: UserId) -> Result<Option<Volunteer>>;

    /// Unknown ids are skipped, the result is ordered by id.
    async fn volunteers(&self, ids: &[VolunteerId]) -> Result<Vec<Volunteer>>;

    async fn create_event(&self, event: NewEvent, slug: String) -> Result<Event>;

    async fn event(&self, id: EventId) -> Result<Option<Event>>;

    /// Events with `finish_date >= date`, ordered by start date.
    async fn events_finishing_after(&self, date: NaiveDate) -> Result<Vec<EventSummary>>;

    /// Atomic.
    async fn create_workshops(&self, workshops: Vec<NewWorkshop>) -> Result<Vec<Workshop>>;

    async fn workshop(&self, id: WorkshopId) -> Result<Option<Workshop>>;

    /// Ordered by date, then start time.
    async fn event_workshops(&self, event: EventId) -> Result<Vec<Workshop>>;

    async fn roster(&self, workshop: WorkshopId) -> Result<Option<WorkshopRoster>>;

    /// Flips the volunteer's availability for the workshop and returns whether
    /// they are available afterwards. Atomic.
    async fn toggle_availability(
        &self,
        volunteer: VolunteerId,
        workshop: WorkshopId,
    ) -> Result<bool>;

    async fn available_workshops(
        &self,
        volunteer: VolunteerId,
        event: EventId,
    ) -> Result<Vec<WorkshopId>>;

    /// Inserts or updates the unique row per (workshop, volunteer). Atomic.
    async fn upsert_assignments(
        &self,
        workshop: WorkshopId,
        decisions: &BTreeMap<VolunteerId, AssignmentStatus>,
    ) -> Result<Vec<Assignment>>;

    /// Every assignment on any workshop of the event.
    async fn event_assignments(&self, event: EventId) -> Result<Vec<AssignmentDetail>>;

    async fn create_registration(&self, registration: NewRegistration) -> Result<Registration>;
}
