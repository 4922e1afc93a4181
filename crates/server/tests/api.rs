use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use server::{ServerState, XLSX_CONTENT_TYPE, rates::FixedRate, router};

const ALICE: i64 = 1001;
const BOB: i64 = 2002;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    router(ServerState {
        engine: Arc::new(engine),
        rates: Arc::new(FixedRate(40.0)),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, user_id: i64, title: &str, date: &str, amount: f64) -> Value {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/expenses/",
        Some(json!({
            "user_id": user_id,
            "title": title,
            "date": date,
            "amount_uah": amount,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn health_answers_ok() {
    let app = app().await;

    let (status, body) = send_json(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_snapshots_usd_with_current_rate() {
    let app = app().await;

    let body = create(&app, ALICE, "Coffee", "2024-01-05", 100.0).await;

    assert_eq!(body["title"], "Coffee");
    assert_eq!(body["date"], "2024-01-05");
    assert_eq!(body["user_id"], ALICE);
    assert_eq!(body["amount_uah"], 100.0);
    assert_eq!(body["amount_usd"], 2.5);
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn create_rejects_blank_title_and_negative_amount() {
    let app = app().await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/expenses/",
        Some(json!({ "user_id": ALICE, "title": "  ", "date": "2024-01-05", "amount_uah": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/expenses/",
        Some(json!({ "user_id": ALICE, "title": "Taxi", "date": "2024-01-05", "amount_uah": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/expenses/",
        Some(json!({ "user_id": ALICE, "title": "Taxi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_is_scoped_and_filtered() {
    let app = app().await;
    create(&app, ALICE, "a", "2024-01-01", 10.0).await;
    create(&app, ALICE, "b", "2024-01-15", 20.0).await;
    create(&app, ALICE, "c", "2024-02-01", 30.0).await;
    create(&app, BOB, "bob", "2024-01-15", 40.0).await;

    let (status, body) = send_json(&app, Method::GET, &format!("/expenses/?user_id={ALICE}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["a", "b", "c"]);

    let (_, body) = send_json(
        &app,
        Method::GET,
        &format!("/expenses/?user_id={ALICE}&start_date=2024-01-10&end_date=2024-01-31"),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "b");

    let (_, body) = send_json(&app, Method::GET, "/expenses/?user_id=42", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_with_malformed_date_is_bad_request() {
    let app = app().await;

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/expenses/?user_id={ALICE}&start_date=05.01.2024"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("start_date"));
}

#[tokio::test]
async fn update_recomputes_usd_only_when_amount_changes() {
    let app = app().await;
    let created = create(&app, ALICE, "Coffee", "2024-01-05", 100.0).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/expenses/{id}?user_id={ALICE}"),
        Some(json!({ "title": "Latte" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Latte");
    assert_eq!(body["amount_uah"], 100.0);
    assert_eq!(body["amount_usd"], 2.5);

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/expenses/{id}?user_id={ALICE}"),
        Some(json!({ "amount_uah": 200.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Latte");
    assert_eq!(body["amount_usd"], 5.0);
}

#[tokio::test]
async fn update_of_missing_or_foreign_expense_is_not_found() {
    let app = app().await;
    let created = create(&app, ALICE, "Coffee", "2024-01-05", 100.0).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/expenses/{id}?user_id={BOB}"),
        Some(json!({ "title": "Mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/expenses/{}?user_id={ALICE}", id + 1000),
        Some(json!({ "title": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_only_own_expense() {
    let app = app().await;
    let created = create(&app, ALICE, "Coffee", "2024-01-05", 100.0).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send_json(&app, Method::DELETE, &format!("/expenses/{id}?user_id={BOB}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) =
        send_json(&app, Method::DELETE, &format!("/expenses/{id}?user_id={ALICE}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "deleted" }));

    let (status, _) =
        send_json(&app, Method::DELETE, &format!("/expenses/{id}?user_id={ALICE}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_returns_an_xlsx_attachment() {
    let app = app().await;
    create(&app, ALICE, "Coffee", "2024-01-05", 100.0).await;

    let request = Request::builder()
        .uri(format!(
            "/expenses/report/?user_id={ALICE}&start_date=2024-01-01&end_date=2024-01-31"
        ))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        XLSX_CONTENT_TYPE
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=expenses_report.xlsx"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // xlsx files are zip archives.
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn report_for_empty_range_still_builds_a_workbook() {
    let app = app().await;

    let (status, bytes) = send(
        &app,
        Method::GET,
        &format!("/expenses/report/?user_id={ALICE}&start_date=2030-01-01&end_date=2030-01-31"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn report_requires_both_dates() {
    let app = app().await;

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/expenses/report/?user_id={ALICE}&start_date=2024-01-01"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send_json(
        &app,
        Method::GET,
        &format!("/expenses/report/?user_id={ALICE}&start_date=2024-01-01&end_date=tomorrow"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
