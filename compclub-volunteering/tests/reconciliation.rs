use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use compclub_volunteering::availability::{available_workshops, toggle_availability, Availability};
use compclub_volunteering::model::{
    AssignmentStatus, EventId, NewEvent, NewUser, NewWorkshop, Recurrence, Volunteer, VolunteerId,
    Workshop, WorkshopId,
};
use compclub_volunteering::reconciler::{apply_assignments, event_overview, workshop_overview};
use compclub_volunteering::{accounts, catalogue, Entity, Error, MemoryStore, Store};

async fn volunteer(store: &MemoryStore, name: &str) -> Volunteer {
    accounts::create_user(
        store,
        NewUser {
            username: name.to_lowercase(),
            first_name: name.to_owned(),
            last_name: "Volunteer".to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone_number: String::new(),
        },
    )
    .await
    .unwrap()
}

async fn workshop(store: &MemoryStore, name: &str) -> Workshop {
    let event = catalogue::create_event(
        store,
        NewEvent {
            name: "Winter Workshops".to_owned(),
            start_date: NaiveDate::from_ymd_opt(2019, 7, 1).unwrap(),
            finish_date: NaiveDate::from_ymd_opt(2019, 7, 12).unwrap(),
            owner: None,
            description: None,
            prerequisite: String::new(),
            period: String::new(),
        },
    )
    .await
    .unwrap();
    let mut workshops = catalogue::create_workshops(
        store,
        NewWorkshop {
            event_id: event.id,
            name: name.to_owned(),
            date: NaiveDate::from_ymd_opt(2019, 7, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            description: None,
            location: "K17".to_owned(),
        },
        Recurrence::None,
    )
    .await
    .unwrap();
    workshops.remove(0)
}

fn ids(volunteers: &[&Volunteer]) -> BTreeSet<VolunteerId> {
    volunteers.iter().map(|volunteer| volunteer.id).collect()
}

#[tokio::test]
async fn alice_and_bob() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Python").await;
    let alice = volunteer(&store, "Alice").await;
    let bob = volunteer(&store, "Bob").await;

    toggle_availability(&store, alice.id, workshop.id).await.unwrap();
    toggle_availability(&store, bob.id, workshop.id).await.unwrap();

    let roster = store.roster(workshop.id).await.unwrap().unwrap();
    assert_eq!(roster.unassigned(), ids(&[&alice, &bob]));

    let roster = apply_assignments(
        &store,
        workshop.id,
        [(alice.id, "AS"), (bob.id, "WL")],
    )
    .await
    .unwrap();
    assert!(roster.unassigned().is_empty());
    assert_eq!(roster.assigned().len(), 2);
    assert_eq!(roster.assigned()[&alice.id], AssignmentStatus::Assigned);
    assert_eq!(roster.assigned()[&bob.id], AssignmentStatus::Waitlist);

    let availability = toggle_availability(&store, bob.id, workshop.id).await.unwrap();
    assert_eq!(availability, Availability::Unavailable);

    let roster = store.roster(workshop.id).await.unwrap().unwrap();
    assert_eq!(roster.withdrawn(), ids(&[&bob]));
    assert!(roster.unassigned().is_empty());

    let view = workshop_overview(&store, workshop.id).await.unwrap();
    assert_eq!(view.withdrawn.len(), 1);
    assert_eq!(view.withdrawn[0].user.first_name, "Bob");
    assert_eq!(view.assigned.len(), 2);
    assert!(view.unassigned.is_empty());
}

#[tokio::test]
async fn toggling_twice_restores_availability() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Scratch").await;
    let alice = volunteer(&store, "Alice").await;

    let before = store.roster(workshop.id).await.unwrap().unwrap().available;
    assert_eq!(
        toggle_availability(&store, alice.id, workshop.id).await.unwrap(),
        Availability::Available
    );
    assert_eq!(
        available_workshops(&store, alice.id, workshop.event_id)
            .await
            .unwrap(),
        vec![workshop.id]
    );
    assert_eq!(
        toggle_availability(&store, alice.id, workshop.id).await.unwrap(),
        Availability::Unavailable
    );
    let after = store.roster(workshop.id).await.unwrap().unwrap().available;
    assert_eq!(before, after);
}

#[tokio::test]
async fn toggling_unknown_entities_is_not_found() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Scratch").await;
    let alice = volunteer(&store, "Alice").await;

    assert!(matches!(
        toggle_availability(&store, VolunteerId(999), workshop.id).await,
        Err(Error::NotFound {
            entity: Entity::Volunteer,
            id: 999
        })
    ));
    assert!(matches!(
        toggle_availability(&store, alice.id, WorkshopId(999)).await,
        Err(Error::NotFound {
            entity: Entity::Workshop,
            id: 999
        })
    ));
}

#[tokio::test]
async fn applying_the_same_decisions_twice_is_idempotent() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Web").await;
    let alice = volunteer(&store, "Alice").await;
    let bob = volunteer(&store, "Bob").await;
    let decisions = [(alice.id, "AS"), (bob.id, "DE")];

    let first = apply_assignments(&store, workshop.id, decisions).await.unwrap();
    let second = apply_assignments(&store, workshop.id, decisions).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second.assigned().len(), 2);
}

#[tokio::test]
async fn declined_volunteer_stays_available() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Robots").await;
    let alice = volunteer(&store, "Alice").await;
    toggle_availability(&store, alice.id, workshop.id).await.unwrap();

    let roster = apply_assignments(&store, workshop.id, [(alice.id, "DE")])
        .await
        .unwrap();
    assert!(roster.available.contains(&alice.id));
    assert!(roster.unassigned().is_empty());
    assert!(roster.withdrawn().is_empty());
}

#[tokio::test]
async fn invalid_batches_write_nothing() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Games").await;
    let alice = volunteer(&store, "Alice").await;
    let bob = volunteer(&store, "Bob").await;

    let result = apply_assignments(&store, workshop.id, [(alice.id, "AS"), (bob.id, "XX")]).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    let result =
        apply_assignments(&store, workshop.id, [(alice.id, "AS"), (VolunteerId(999), "AS")]).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    let result = apply_assignments(&store, WorkshopId(999), [(alice.id, "AS")]).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    let roster = store.roster(workshop.id).await.unwrap().unwrap();
    assert!(roster.assigned().is_empty());
}

#[tokio::test]
async fn staff_can_record_decisions_for_withdrawn_volunteers() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Games").await;
    let alice = volunteer(&store, "Alice").await;

    apply_assignments(&store, workshop.id, [(alice.id, "AS")])
        .await
        .unwrap();
    let roster = store.roster(workshop.id).await.unwrap().unwrap();
    assert_eq!(roster.withdrawn(), ids(&[&alice]));

    let roster = apply_assignments(&store, workshop.id, [(alice.id, "DE")])
        .await
        .unwrap();
    assert!(roster.withdrawn().is_empty());
}

#[tokio::test]
async fn event_overview_lists_every_workshop() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Games").await;
    let views = event_overview(&store, workshop.event_id).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].workshop, workshop);

    assert!(matches!(
        event_overview(&store, EventId(999)).await,
        Err(Error::NotFound {
            entity: Entity::Event,
            ..
        })
    ));
}

#[tokio::test]
async fn returning_volunteer_keeps_previous_status() {
    let store = MemoryStore::new();
    let workshop = workshop(&store, "Robots").await;
    let bob = volunteer(&store, "Bob").await;

    toggle_availability(&store, bob.id, workshop.id).await.unwrap();
    apply_assignments(&store, workshop.id, [(bob.id, "WL")])
        .await
        .unwrap();
    toggle_availability(&store, bob.id, workshop.id).await.unwrap();
    assert_eq!(
        store.roster(workshop.id).await.unwrap().unwrap().withdrawn(),
        ids(&[&bob])
    );

    toggle_availability(&store, bob.id, workshop.id).await.unwrap();
    let roster = store.roster(workshop.id).await.unwrap().unwrap();
    assert!(roster.withdrawn().is_empty());
    assert!(roster.unassigned().is_empty());
    assert_eq!(roster.assigned()[&bob.id], AssignmentStatus::Waitlist);
}
