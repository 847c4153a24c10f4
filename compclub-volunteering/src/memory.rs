//! In-process [`Store`] used by tests and local development.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::error::{Entity, Error, Result, ValidationError};
use crate::model::{
    Assignment, AssignmentDetail, AssignmentStatus, Event, EventId, EventSummary, NewEvent,
    NewRegistration, NewUser, NewWorkshop, Registration, RegistrationId, User, UserId, Volunteer,
    VolunteerId, Workshop, WorkshopId,
};
use crate::reconciler::WorkshopRoster;
use crate::store::Store;

#[derive(Default)]
struct Tables {
    next_id: i32,
    users: BTreeMap<UserId, User>,
    volunteers: BTreeMap<VolunteerId, (UserId, Option<String>)>,
    events: BTreeMap<EventId, Event>,
    workshops: BTreeMap<WorkshopId, Workshop>,
    availability: BTreeSet<(WorkshopId, VolunteerId)>,
    assignments: BTreeMap<(WorkshopId, VolunteerId), AssignmentStatus>,
    registrations: BTreeMap<RegistrationId, Registration>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn volunteer(&self, id: VolunteerId) -> Option<Volunteer> {
        let (user_id, position) = self.volunteers.get(&id)?;
        Some(Volunteer {
            id,
            user: self.users.get(user_id)?.clone(),
            position: position.clone(),
        })
    }

    fn sorted_workshops(&self, event: EventId) -> Vec<Workshop> {
        let mut workshops = self
            .workshops
            .values()
            .filter(|workshop| workshop.event_id == event)
            .cloned()
            .collect::<Vec<_>>();
        workshops.sort_by_key(|workshop| (workshop.date, workshop.start_time, workshop.id));
        workshops
    }
}

/// All tables live behind one lock, so every method is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<Volunteer> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(ValidationError::field(
                "username",
                format!("username {:?} is already taken", user.username),
            )
            .into());
        }
        let user_id = UserId(tables.next_id());
        let volunteer_id = VolunteerId(tables.next_id());
        tables.users.insert(
            user_id,
            User {
                id: user_id,
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                phone_number: user.phone_number,
            },
        );
        tables.volunteers.insert(volunteer_id, (user_id, None));
        tables
            .volunteer(volunteer_id)
            .ok_or_else(|| Error::not_found(Entity::Volunteer, volunteer_id.0))
    }

    async fn set_position(
        &self,
        volunteer: VolunteerId,
        position: Option<String>,
    ) -> Result<Volunteer> {
        let mut tables = self.tables.lock().await;
        let entry = tables
            .volunteers
            .get_mut(&volunteer)
            .ok_or_else(|| Error::not_found(Entity::Volunteer, volunteer.0))?;
        entry.1 = position;
        tables
            .volunteer(volunteer)
            .ok_or_else(|| Error::not_found(Entity::Volunteer, volunteer.0))
    }

    async fn volunteer(&self, id: VolunteerId) -> Result<Option<Volunteer>> {
        Ok(self.tables.lock().await.volunteer(id))
    }

    async fn volunteer_for_user(&self, user: UserId) -> Result<Option<Volunteer>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .volunteers
            .iter()
            .find(|(_, (user_id, _))| *user_id == user)
            .and_then(|(id, _)| tables.volunteer(*id)))
    }

    async fn volunteers(&self, ids: &[VolunteerId]) -> Result<Vec<Volunteer>> {
        let tables = self.tables.lock().await;
        Ok(ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| tables.volunteer(id))
            .collect())
    }

    async fn create_event(&self, event: NewEvent, slug: String) -> Result<Event> {
        let mut tables = self.tables.lock().await;
        if let Some(owner) = event.owner {
            if !tables.volunteers.contains_key(&owner) {
                return Err(Error::not_found(Entity::Volunteer, owner.0));
            }
        }
        let id = EventId(tables.next_id());
        let event = Event {
            id,
            name: event.name,
            slug,
            start_date: event.start_date,
            finish_date: event.finish_date,
            owner: event.owner,
            description: event.description,
            prerequisite: event.prerequisite,
            period: event.period,
        };
        tables.events.insert(id, event.clone());
        Ok(event)
    }

    async fn event(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.tables.lock().await.events.get(&id).cloned())
    }

    async fn events_finishing_after(&self, date: NaiveDate) -> Result<Vec<EventSummary>> {
        let tables = self.tables.lock().await;
        let mut events = tables
            .events
            .values()
            .filter(|event| event.finish_date >= date)
            .map(|event| EventSummary {
                event: event.clone(),
                workshop_count: tables
                    .workshops
                    .values()
                    .filter(|workshop| workshop.event_id == event.id)
                    .count(),
            })
            .collect::<Vec<_>>();
        events.sort_by_key(|summary| (summary.event.start_date, summary.event.id));
        Ok(events)
    }

    async fn create_workshops(&self, workshops: Vec<NewWorkshop>) -> Result<Vec<Workshop>> {
        let mut tables = self.tables.lock().await;
        if let Some(missing) = workshops
            .iter()
            .find(|workshop| !tables.events.contains_key(&workshop.event_id))
        {
            return Err(Error::not_found(Entity::Event, missing.event_id.0));
        }
        let mut created = Vec::with_capacity(workshops.len());
        for workshop in workshops {
            let id = WorkshopId(tables.next_id());
            let workshop = Workshop {
                id,
                event_id: workshop.event_id,
                name: workshop.name,
                date: workshop.date,
                start_time: workshop.start_time,
                end_time: workshop.end_time,
                description: workshop.description,
                location: workshop.location,
            };
            tables.workshops.insert(id, workshop.clone());
            created.push(workshop);
        }
        Ok(created)
    }

    async fn workshop(&self, id: WorkshopId) -> Result<Option<Workshop>> {
        Ok(self.tables.lock().await.workshops.get(&id).cloned())
    }

    async fn event_workshops(&self, event: EventId) -> Result<Vec<Workshop>> {
        Ok(self.tables.lock().await.sorted_workshops(event))
    }

    async fn roster(&self, workshop: WorkshopId) -> Result<Option<WorkshopRoster>> {
        let tables = self.tables.lock().await;
        let Some(found) = tables.workshops.get(&workshop) else {
            return Ok(None);
        };
        let mut roster = WorkshopRoster::new(found.clone());
        roster.available = tables
            .availability
            .range((workshop, VolunteerId(i32::MIN))..=(workshop, VolunteerId(i32::MAX)))
            .map(|(_, volunteer)| *volunteer)
            .collect();
        roster.assignments = tables
            .assignments
            .range((workshop, VolunteerId(i32::MIN))..=(workshop, VolunteerId(i32::MAX)))
            .map(|((_, volunteer), status)| (*volunteer, *status))
            .collect();
        Ok(Some(roster))
    }

    async fn toggle_availability(
        &self,
        volunteer: VolunteerId,
        workshop: WorkshopId,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if !tables.volunteers.contains_key(&volunteer) {
            return Err(Error::not_found(Entity::Volunteer, volunteer.0));
        }
        if !tables.workshops.contains_key(&workshop) {
            return Err(Error::not_found(Entity::Workshop, workshop.0));
        }
        if tables.availability.remove(&(workshop, volunteer)) {
            Ok(false)
        } else {
            tables.availability.insert((workshop, volunteer));
            Ok(true)
        }
    }

    async fn available_workshops(
        &self,
        volunteer: VolunteerId,
        event: EventId,
    ) -> Result<Vec<WorkshopId>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .sorted_workshops(event)
            .into_iter()
            .filter(|workshop| tables.availability.contains(&(workshop.id, volunteer)))
            .map(|workshop| workshop.id)
            .collect())
    }

    async fn upsert_assignments(
        &self,
        workshop: WorkshopId,
        decisions: &BTreeMap<VolunteerId, AssignmentStatus>,
    ) -> Result<Vec<Assignment>> {
        let mut tables = self.tables.lock().await;
        if !tables.workshops.contains_key(&workshop) {
            return Err(Error::not_found(Entity::Workshop, workshop.0));
        }
        if let Some(missing) = decisions
            .keys()
            .find(|volunteer| !tables.volunteers.contains_key(volunteer))
        {
            return Err(Error::not_found(Entity::Volunteer, missing.0));
        }
        Ok(decisions
            .iter()
            .map(|(volunteer, status)| {
                tables.assignments.insert((workshop, *volunteer), *status);
                Assignment {
                    workshop_id: workshop,
                    volunteer_id: *volunteer,
                    status: *status,
                }
            })
            .collect())
    }

    async fn event_assignments(&self, event: EventId) -> Result<Vec<AssignmentDetail>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .assignments
            .iter()
            .filter_map(|((workshop, volunteer), status)| {
                let workshop = tables.workshops.get(workshop)?;
                (workshop.event_id == event).then_some(())?;
                Some(AssignmentDetail {
                    volunteer: tables.volunteer(*volunteer)?,
                    workshop: workshop.clone(),
                    status: *status,
                })
            })
            .collect())
    }

    async fn create_registration(&self, registration: NewRegistration) -> Result<Registration> {
        let mut tables = self.tables.lock().await;
        if !tables.events.contains_key(&registration.event_id) {
            return Err(Error::not_found(Entity::Event, registration.event_id.0));
        }
        let id = RegistrationId(tables.next_id());
        let registration = Registration {
            id,
            event_id: registration.event_id,
            name: registration.name,
            email: registration.email,
            phone_number: registration.phone_number,
            date_of_birth: registration.date_of_birth,
            parent_email: registration.parent_email,
            parent_phone_number: registration.parent_phone_number,
        };
        tables.registrations.insert(id, registration.clone());
        Ok(registration)
    }
}
