//! Reconciles what volunteers said they can do with what staff decided.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Entity, Error, Result, ValidationError};
use crate::model::{AssignmentStatus, EventId, Volunteer, VolunteerId, Workshop, WorkshopId};
use crate::store::Store;

const DECISION_FIELD_PREFIX: &str = "vol_";

/// A workshop with its raw availability set and the staff decisions on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkshopRoster {
    pub workshop: Workshop,
    pub available: BTreeSet<VolunteerId>,
    pub assignments: BTreeMap<VolunteerId, AssignmentStatus>,
}

impl WorkshopRoster {
    pub fn new(workshop: Workshop) -> Self {
        Self {
            workshop,
            available: BTreeSet::new(),
            assignments: BTreeMap::new(),
        }
    }

    /// Available volunteers without any decision yet.
    pub fn unassigned(&self) -> BTreeSet<VolunteerId> {
        self.available
            .iter()
            .filter(|volunteer| !self.assignments.contains_key(volunteer))
            .copied()
            .collect()
    }

    /// Every volunteer with a recorded decision, declined ones included.
    pub const fn assigned(&self) -> &BTreeMap<VolunteerId, AssignmentStatus> {
        &self.assignments
    }

    /// Volunteers that are assigned or waitlisted but retracted their availability.
    /// Toggling availability back on takes them out of this set again with their
    /// previous status intact.
    pub fn withdrawn(&self) -> BTreeSet<VolunteerId> {
        self.assignments
            .iter()
            .filter(|(volunteer, status)| {
                **status != AssignmentStatus::Declined && !self.available.contains(volunteer)
            })
            .map(|(volunteer, _)| *volunteer)
            .collect()
    }

    fn volunteer_ids(&self) -> Vec<VolunteerId> {
        self.available
            .iter()
            .chain(self.assignments.keys())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Extracts `vol_<id> = <status>` pairs from a submitted form.
///
/// Two fields naming the same volunteer (`vol_3` and `vol_03`) are rejected.
pub fn parse_decisions<'a>(
    fields: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<BTreeMap<VolunteerId, String>, ValidationError> {
    let mut decisions = BTreeMap::new();
    for (name, value) in fields {
        let Some(id) = name.strip_prefix(DECISION_FIELD_PREFIX) else {
            continue;
        };
        let id = id.parse::<i32>().map_err(|_| {
            ValidationError::field("volunteer", format!("invalid volunteer field {name:?}"))
        })?;
        if decisions.insert(VolunteerId(id), value.to_owned()).is_some() {
            return Err(ValidationError::field(
                "volunteer",
                format!("duplicate decision for volunteer {id}"),
            ));
        }
    }
    Ok(decisions)
}

/// Records staff decisions for one workshop.
///
/// Everything is validated before the first write and the writes happen in one
/// store transaction, so a rejected batch leaves the assignments untouched.
/// Re-applying the same decisions yields the same rows.
pub async fn apply_assignments<S: AsRef<str>>(
    store: &dyn Store,
    workshop_id: WorkshopId,
    decisions: impl IntoIterator<Item = (VolunteerId, S)> + Send,
) -> Result<WorkshopRoster> {
    let decisions = decisions
        .into_iter()
        .map(|(volunteer, status)| Ok((volunteer, status.as_ref().parse()?)))
        .collect::<Result<BTreeMap<VolunteerId, AssignmentStatus>, ValidationError>>()?;

    if store.workshop(workshop_id).await?.is_none() {
        warn!(%workshop_id, "assignment for unknown workshop");
        return Err(ValidationError::field(
            "workshop_id",
            format!("workshop {workshop_id} does not exist"),
        )
        .into());
    }

    let ids = decisions.keys().copied().collect::<Vec<_>>();
    let known = store
        .volunteers(&ids)
        .await?
        .into_iter()
        .map(|volunteer| volunteer.id)
        .collect::<BTreeSet<_>>();
    if let Some(unknown) = ids.iter().find(|id| !known.contains(id)) {
        warn!(%workshop_id, volunteer_id = %unknown, "assignment for unknown volunteer");
        return Err(ValidationError::field(
            "volunteer",
            format!("volunteer {unknown} does not exist"),
        )
        .into());
    }

    let written = store.upsert_assignments(workshop_id, &decisions).await?;
    info!(%workshop_id, count = written.len(), "applied volunteer assignments");

    store
        .roster(workshop_id)
        .await?
        .ok_or_else(|| Error::not_found(Entity::Workshop, workshop_id.0))
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignedVolunteer {
    #[serde(flatten)]
    pub volunteer: Volunteer,
    pub status: AssignmentStatus,
}

/// The three derived views of a roster, with profiles for display.
#[derive(Debug, Clone, Serialize)]
pub struct RosterView {
    pub workshop: Workshop,
    pub unassigned: Vec<Volunteer>,
    pub assigned: Vec<AssignedVolunteer>,
    pub withdrawn: Vec<Volunteer>,
}

impl RosterView {
    async fn load(store: &dyn Store, roster: &WorkshopRoster) -> Result<Self> {
        let profiles = store
            .volunteers(&roster.volunteer_ids())
            .await?
            .into_iter()
            .map(|volunteer| (volunteer.id, volunteer))
            .collect::<BTreeMap<_, _>>();
        let lookup = |ids: BTreeSet<VolunteerId>| {
            ids.into_iter()
                .filter_map(|id| profiles.get(&id).cloned())
                .collect::<Vec<_>>()
        };
        Ok(Self {
            workshop: roster.workshop.clone(),
            unassigned: lookup(roster.unassigned()),
            assigned: roster
                .assigned()
                .iter()
                .filter_map(|(id, status)| {
                    profiles.get(id).map(|volunteer| AssignedVolunteer {
                        volunteer: volunteer.clone(),
                        status: *status,
                    })
                })
                .collect(),
            withdrawn: lookup(roster.withdrawn()),
        })
    }
}

pub async fn workshop_overview(store: &dyn Store, workshop_id: WorkshopId) -> Result<RosterView> {
    let roster = store
        .roster(workshop_id)
        .await?
        .ok_or_else(|| Error::not_found(Entity::Workshop, workshop_id.0))?;
    RosterView::load(store, &roster).await
}

/// One view per workshop of the event, by date and start time.
pub async fn event_overview(store: &dyn Store, event_id: EventId) -> Result<Vec<RosterView>> {
    if store.event(event_id).await?.is_none() {
        return Err(Error::not_found(Entity::Event, event_id.0));
    }
    let mut views = Vec::new();
    for workshop in store.event_workshops(event_id).await? {
        if let Some(roster) = store.roster(workshop.id).await? {
            views.push(RosterView::load(store, &roster).await?);
        }
    }
    Ok(views)
}
