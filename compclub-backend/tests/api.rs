use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use compclub_backend::identity::{STAFF_HEADER, USER_HEADER};
use compclub_backend::{router, AppState};
use compclub_config::MailConfig;
use compclub_volunteering::notifier::{Mailer, StatusEmail};
use compclub_volunteering::{MemoryStore, TransportError};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceExt as _;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<StatusEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_mass(&self, emails: &[StatusEmail]) -> Result<(), TransportError> {
        self.sent.lock().await.extend_from_slice(emails);
        Ok(())
    }
}

struct BrokenMailer;

#[async_trait]
impl Mailer for BrokenMailer {
    async fn send_mass(&self, _emails: &[StatusEmail]) -> Result<(), TransportError> {
        Err(TransportError("connection refused".to_owned()))
    }
}

fn app(mailer: Arc<dyn Mailer>) -> Router {
    router(AppState {
        store: Arc::new(MemoryStore::new()),
        mailer,
        mail: MailConfig::default(),
    })
}

enum Caller {
    Anonymous,
    User(i64),
    Staff,
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    caller: &Caller,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    match caller {
        Caller::Anonymous => {}
        Caller::User(id) => request = request.header(USER_HEADER, id.to_string()),
        Caller::Staff => {
            request = request.header(USER_HEADER, "1").header(STAFF_HEADER, "true");
        }
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_user(app: &Router, username: &str) -> Value {
    let (status, volunteer) = call(
        app,
        Method::POST,
        "/users",
        &Caller::Staff,
        Some(json!({
            "username": username,
            "first_name": username,
            "last_name": "Volunteer",
            "email": format!("{username}@example.com"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{volunteer}");
    volunteer
}

async fn create_event(app: &Router) -> i64 {
    let (status, event) = call(
        app,
        Method::POST,
        "/events",
        &Caller::Staff,
        Some(json!({
            "name": "Winter Workshops 2019",
            "start_date": "2019-07-01",
            "finish_date": "2019-07-15",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{event}");
    assert_eq!(event["slug"], "winter-workshops-2019");
    event["id"].as_i64().unwrap()
}

async fn create_workshops(app: &Router, event: i64, recurrence: &str) -> Vec<i64> {
    let (status, workshops) = call(
        app,
        Method::POST,
        &format!("/events/{event}/workshops"),
        &Caller::Staff,
        Some(json!({
            "name": "Python",
            "date": "2019-07-01",
            "start_time": "10:00:00",
            "end_time": "12:00:00",
            "location": "K17",
            "recurrence": recurrence,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{workshops}");
    workshops
        .as_array()
        .unwrap()
        .iter()
        .map(|workshop| workshop["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_needs_no_identity() {
    let app = app(Arc::new(RecordingMailer::default()));
    let (status, body) = call(&app, Method::GET, "/health", &Caller::Anonymous, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn staff_routes_check_identity() {
    let app = app(Arc::new(RecordingMailer::default()));
    let event = json!({
        "name": "Holiday",
        "start_date": "2019-07-01",
        "finish_date": "2019-07-02",
    });

    let (status, body) = call(
        &app,
        Method::POST,
        "/events",
        &Caller::Anonymous,
        Some(event.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, Method::POST, "/events", &Caller::User(5), Some(event)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn volunteers_toggle_and_staff_assign() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = app(mailer.clone());
    let alice = create_user(&app, "alice").await;
    let alice_user = alice["user"]["id"].as_i64().unwrap();
    let alice_volunteer = alice["id"].as_i64().unwrap();
    let event = create_event(&app).await;
    let workshops = create_workshops(&app, event, "weekly").await;
    assert_eq!(workshops.len(), 3);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/workshops/{}/availability", workshops[0]),
        &Caller::User(alice_user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availability"], "available");

    let (status, page) = call(
        &app,
        Method::GET,
        &format!("/events/{event}"),
        &Caller::User(alice_user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["location"], "K17");
    assert_eq!(page["available_workshops"], json!([workshops[0]]));

    let (status, roster) = call(
        &app,
        Method::GET,
        &format!("/workshops/{}/assignments", workshops[0]),
        &Caller::Staff,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster["unassigned"][0]["id"], alice_volunteer);

    let (status, roster) = call(
        &app,
        Method::POST,
        &format!("/workshops/{}/assignments", workshops[0]),
        &Caller::Staff,
        Some(json!({ format!("vol_{alice_volunteer}"): "AS", "csrf": "ignored" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{roster}");
    assert_eq!(roster["unassigned"], json!([]));
    assert_eq!(roster["assigned"][0]["status"], "AS");

    let (status, emails) = call(
        &app,
        Method::GET,
        &format!("/events/{event}/status-emails"),
        &Caller::Staff,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(emails.as_array().unwrap().len(), 1);
    assert!(emails[0]["body"]
        .as_str()
        .unwrap()
        .contains("Python(10:00:00-12:00:00): Assigned"));

    let (status, report) = call(
        &app,
        Method::POST,
        &format!("/events/{event}/status-emails"),
        &Caller::Staff,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["sent"], 1);
    assert_eq!(mailer.sent.lock().await.len(), 1);
}

#[tokio::test]
async fn withdrawn_volunteers_show_up_in_the_event_overview() {
    let app = app(Arc::new(RecordingMailer::default()));
    let bob = create_user(&app, "bob").await;
    let bob_user = bob["user"]["id"].as_i64().unwrap();
    let bob_volunteer = bob["id"].as_i64().unwrap();
    let event = create_event(&app).await;
    let workshop = create_workshops(&app, event, "none").await[0];
    let toggle = format!("/workshops/{workshop}/availability");

    call(&app, Method::POST, &toggle, &Caller::User(bob_user), None).await;
    call(
        &app,
        Method::POST,
        &format!("/workshops/{workshop}/assignments"),
        &Caller::Staff,
        Some(json!({ format!("vol_{bob_volunteer}"): "WL" })),
    )
    .await;
    let (_, body) = call(&app, Method::POST, &toggle, &Caller::User(bob_user), None).await;
    assert_eq!(body["availability"], "unavailable");

    let (status, views) = call(
        &app,
        Method::GET,
        &format!("/events/{event}/assignments"),
        &Caller::Staff,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(views[0]["withdrawn"][0]["id"], bob_volunteer);
    assert_eq!(views[0]["unassigned"], json!([]));
}

#[tokio::test]
async fn assignment_forms_may_carry_other_json_fields() {
    let app = app(Arc::new(RecordingMailer::default()));
    let alice = create_user(&app, "alice").await;
    let alice_user = alice["user"]["id"].as_i64().unwrap();
    let alice_volunteer = alice["id"].as_i64().unwrap();
    let event = create_event(&app).await;
    let workshop = create_workshops(&app, event, "none").await[0];
    let uri = format!("/workshops/{workshop}/assignments");
    call(
        &app,
        Method::POST,
        &format!("/workshops/{workshop}/availability"),
        &Caller::User(alice_user),
        None,
    )
    .await;

    let (status, roster) = call(
        &app,
        Method::POST,
        &uri,
        &Caller::Staff,
        Some(json!({
            format!("vol_{alice_volunteer}"): "AS",
            "workshop_id": workshop,
            "notify": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{roster}");
    assert_eq!(roster["assigned"][0]["status"], "AS");

    let (status, _) = call(
        &app,
        Method::POST,
        &uri,
        &Caller::Staff,
        Some(json!({ format!("vol_{alice_volunteer}"): 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_input_is_unprocessable() {
    let app = app(Arc::new(RecordingMailer::default()));
    let alice = create_user(&app, "alice").await;
    let event = create_event(&app).await;
    let workshop = create_workshops(&app, event, "none").await[0];

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/workshops/{workshop}/assignments"),
        &Caller::Staff,
        Some(json!({ format!("vol_{}", alice["id"]): "XX" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("XX"));

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/events/{event}/workshops"),
        &Caller::Staff,
        Some(json!({
            "name": "Late",
            "date": "2019-08-01",
            "start_time": "10:00:00",
            "end_time": "12:00:00",
            "location": "K17",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/events/{event}/registrations"),
        &Caller::Anonymous,
        Some(json!({
            "name": "Carol",
            "email": "carol@example.com",
            "phone_number": "123",
            "date_of_birth": "2008-02-03",
            "parent_email": "parent@example.com",
            "parent_phone_number": "0412 345 678",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_entities_are_not_found() {
    let app = app(Arc::new(RecordingMailer::default()));
    let (status, _) = call(&app, Method::GET, "/events/99", &Caller::Anonymous, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::GET,
        "/workshops/99/assignments",
        &Caller::Staff,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggling_without_a_volunteer_record_is_unauthorized() {
    let app = app(Arc::new(RecordingMailer::default()));
    let event = create_event(&app).await;
    let workshop = create_workshops(&app, event, "none").await[0];
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/workshops/{workshop}/availability"),
        &Caller::User(404),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upcoming_events_list_workshop_counts() {
    let app = app(Arc::new(RecordingMailer::default()));
    let event = create_event(&app).await;
    create_workshops(&app, event, "daily").await;

    let (status, events) = call(
        &app,
        Method::GET,
        "/events?today=2019-07-10",
        &Caller::Anonymous,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events[0]["id"], event);
    assert_eq!(events[0]["workshop_count"], 15);

    let (_, events) = call(
        &app,
        Method::GET,
        "/events?today=2019-07-16",
        &Caller::Anonymous,
        None,
    )
    .await;
    assert_eq!(events, json!([]));
}

#[tokio::test]
async fn mail_failures_are_bad_gateway() {
    let app = app(Arc::new(BrokenMailer));
    let alice = create_user(&app, "alice").await;
    let event = create_event(&app).await;
    let workshop = create_workshops(&app, event, "none").await[0];
    call(
        &app,
        Method::POST,
        &format!("/workshops/{workshop}/assignments"),
        &Caller::Staff,
        Some(json!({ format!("vol_{}", alice["id"]): "AS" })),
    )
    .await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/events/{event}/status-emails"),
        &Caller::Staff,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}
