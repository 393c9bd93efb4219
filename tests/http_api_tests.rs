#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::{NaiveDate, Weekday};
use client_agenda::{
    ClientScheduleRecord, CustomTask, EventRecord, MemoryRecordStore, http_api,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_router(store: MemoryRecordStore) -> axum::Router {
    let state = http_api::AppState::new(store).with_today(d(2026, 10, 16));
    http_api::router(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = new_router(MemoryRecordStore::new());
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn task_lifecycle_via_http_api() {
    let app = new_router(MemoryRecordStore::new());

    let (status, body) = send(
        &app,
        "POST",
        "/tasks",
        Some(json!({ "title": "Stretch", "schedule": ["Monday", "Friday"], "frequency": "every_week" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "You have successfully added Stretch to your Tasks");
    assert_eq!(body["task"]["schedule"], json!(["Monday", "Friday"]));

    let (status, body) = send(&app, "GET", "/agenda/week?start=Monday", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Monday"], json!(["Stretch"]));
    assert_eq!(body["Tuesday"], json!(["You have no tasks scheduled"]));

    let (status, body) = send(&app, "GET", "/agenda/today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weekday"], "Friday");
    assert_eq!(body["tasks"], json!(["Stretch"]));

    let (status, body) = send(
        &app,
        "POST",
        "/tasks/delete",
        Some(json!({ "removals": [
            { "day": "Monday", "title": "Stretch" },
            { "day": "Friday", "title": "Stretch" }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You have successfully deleted Stretch from your Tasks");

    let (_, body) = send(&app, "GET", "/agenda/week", None).await;
    assert_eq!(body["Friday"], json!(["You have no tasks scheduled"]));
}

#[tokio::test]
async fn invalid_task_returns_validation_message() {
    let app = new_router(MemoryRecordStore::new());
    let (status, body) = send(
        &app,
        "POST",
        "/tasks",
        Some(json!({ "title": "Stretch", "schedule": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(
        body["message"],
        "Please set your task's schedule and select a frequency"
    );
}

#[tokio::test]
async fn unknown_window_is_a_bad_request() {
    let app = new_router(MemoryRecordStore::new());
    let (status, body) = send(&app, "GET", "/birthdays?window=year", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn events_are_listed_described_and_deleted() {
    let store = MemoryRecordStore::new().with_events(vec![
        EventRecord::new("Conference", "2026-10-01", "once"),
        EventRecord::new("Broken", "someday", "once"),
    ]);
    let app = new_router(store);

    let (status, _) = send(
        &app,
        "POST",
        "/events",
        Some(json!({ "title": "Rent", "date": "2025-01-18", "frequency": "monthly" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/events?window=month", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"]["2026-10-18"], json!(["Rent"]));
    assert_eq!(body["entries"]["2026-11-18"], Value::Null);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/events/descriptions", None).await;
    let titles = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["title"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    // the lapsed conference was swept by the listing above
    assert_eq!(titles, vec!["Broken", "Rent"]);
    assert_eq!(body[1]["description"], "Repeats Every Month on the 18th");
    assert!(body[0].get("error").is_some());

    let (status, body) = send(
        &app,
        "POST",
        "/events/delete",
        Some(json!({ "titles": ["Broken"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);
    assert_eq!(body["message"], "You have successfully deleted Broken from your Events");
}

#[tokio::test]
async fn clients_feed_upcoming_birthdays() {
    let app = new_router(MemoryRecordStore::new());

    let (status, body) = send(
        &app,
        "POST",
        "/clients",
        Some(json!({
            "first_name": "Ann",
            "last_name": "Lee",
            "date_of_birth": "1990-10-20",
            "email": "ann@example.com",
            "training_schedule": { "Friday": "17:30" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        "You have successfully added Ann Lee to your Current Clients"
    );

    let (_, body) = send(&app, "GET", "/upcoming?window=week", None).await;
    assert_eq!(body["2026-10-20"], json!(["Ann Lee's birthday"]));

    let (_, body) = send(&app, "GET", "/agenda/today", None).await;
    assert_eq!(body["sessions"], json!([{ "time": "5:30 PM", "client": "Ann Lee" }]));
}

#[tokio::test]
async fn bad_client_is_rejected() {
    let app = new_router(MemoryRecordStore::new());
    let (status, body) = send(
        &app,
        "POST",
        "/clients",
        Some(json!({ "first_name": "Ann", "last_name": "Lee", "date_of_birth": "1990-10-20", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Please enter a valid email address");
}

#[tokio::test]
async fn sweep_reports_counts() {
    let store = MemoryRecordStore::new()
        .with_tasks(vec![
            CustomTask::new("Old", [Weekday::Mon], "this_week").with_expiry(d(2026, 10, 10)),
        ])
        .with_events(vec![EventRecord::new("Past", "2026-09-01", "once")])
        .with_clients(vec![ClientScheduleRecord::new("Bo Park", d(1985, 5, 1))]);
    let app = new_router(store);

    let (status, body) = send(&app, "POST", "/sweep", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "tasks_removed": 1, "events_removed": 1 }));

    let (_, body) = send(&app, "POST", "/sweep", None).await;
    assert_eq!(body, json!({ "tasks_removed": 0, "events_removed": 0 }));
}

#[tokio::test]
async fn client_edit_archive_restore_and_delete() {
    let store = MemoryRecordStore::new().with_clients(vec![
        ClientScheduleRecord::new("Ann Lee", d(1990, 10, 20)),
        ClientScheduleRecord::new("Bo Park", d(1985, 5, 1)).archived(),
    ]);
    let app = new_router(store);

    let (status, body) = send(&app, "GET", "/clients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"], json!([{ "name": "Ann Lee", "key": "ann_lee" }]));
    assert_eq!(body["archived"], json!([{ "name": "Bo Park", "key": "bo_park" }]));

    let (status, body) = send(
        &app,
        "POST",
        "/clients/ann_lee/edit",
        Some(json!({
            "first_name": "Ann",
            "last_name": "Park",
            "date_of_birth": "1990-10-20",
            "email": "ann@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You have successfully edited Ann Park's data");

    let (status, body) = send(&app, "POST", "/clients/ann_park/archive", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "You have successfully moved Ann Park to Archived Clients"
    );

    let (status, body) = send(&app, "POST", "/clients/bo_park/restore", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "You have successfully moved Bo Park to Current Clients"
    );

    let (status, body) = send(&app, "POST", "/clients/ann_park/delete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "You have successfully deleted Ann Park from your Archived Clients"
    );

    let (_, body) = send(&app, "GET", "/clients", None).await;
    assert_eq!(body["current"], json!([{ "name": "Bo Park", "key": "bo_park" }]));
    assert_eq!(body["archived"], json!([]));
}

#[tokio::test]
async fn unknown_client_is_not_found() {
    let app = new_router(MemoryRecordStore::new());
    let (status, body) = send(&app, "POST", "/clients/nobody/archive", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "no current client named 'nobody'");

    let (status, _) = send(&app, "POST", "/clients/nobody/delete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
