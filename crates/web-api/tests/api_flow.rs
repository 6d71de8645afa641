mod support;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use support::build_app;

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register_and_login(router: &Router, email: &str) -> (String, String) {
    let (status, employer) = send(
        router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"name": "Ada", "email": email, "password": "s3cret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{employer}");

    let (status, login) = send(
        router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "s3cret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{login}");

    (
        employer["id"].as_str().unwrap().to_string(),
        login["token"].as_str().unwrap().to_string(),
    )
}

fn job_body(title: &str, min: i64, max: i64) -> Value {
    json!({
        "title": title,
        "description": "Design and build backend services",
        "location": "Berlin",
        "salaryRange": {"min": min, "max": max}
    })
}

async fn create_job(router: &Router, token: &str, title: &str, min: i64, max: i64) -> String {
    let (status, job) = send(
        router,
        Method::POST,
        "/api/jobs",
        Some(token),
        Some(job_body(title, min, max)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{job}");
    job["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check() {
    let app = build_app();
    let (status, _) = send(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_hides_password_and_rejects_duplicates() {
    let app = build_app();

    let (status, employer) = send(
        &app.router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"name": "Ada", "email": "Ada@Example.com", "password": "s3cret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(employer["email"], "ada@example.com");
    assert!(employer.get("password").is_none());
    assert!(employer.get("passwordHash").is_none());

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"name": "Other", "email": "ada@example.com", "password": "another-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn register_reports_field_errors() {
    let app = build_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "nope"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password"]);
}

#[tokio::test]
async fn wrong_password_looks_like_unknown_email() {
    let app = build_app();
    register_and_login(&app.router, "ada@example.com").await;

    let (wrong_status, wrong_body) = send(
        &app.router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "ada@example.com", "password": "guess"})),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app.router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "ghost@example.com", "password": "s3cret-pass"})),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn malformed_json_uses_error_body() {
    let app = build_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn create_job_checks_input_before_token() {
    let app = build_app();
    let (employer_id, token) = register_and_login(&app.router, "ada@example.com").await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/jobs",
        None,
        Some(json!({"title": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/jobs",
        None,
        Some(job_body("Rust Engineer", 1, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/jobs",
        Some("not-a-token"),
        Some(job_body("Rust Engineer", 1, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INVALID_TOKEN");

    let (status, job) = send(
        &app.router,
        Method::POST,
        "/api/jobs",
        Some(&token),
        Some(job_body("Rust Engineer", 50_000, 70_000)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["employerId"], employer_id);
    assert_eq!(job["salaryRange"], json!({"min": 50_000, "max": 70_000}));

    let job_id = job["id"].as_str().unwrap();
    let (status, fetched) = send(
        &app.router,
        Method::GET,
        &format!("/api/jobs/{job_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Rust Engineer");
}

#[tokio::test]
async fn get_job_with_bad_or_unknown_id() {
    let app = build_app();

    let (status, _) = send(&app.router, Method::GET, "/api/jobs/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        Method::GET,
        &format!("/api/jobs/{}", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn only_owner_may_update_or_delete() {
    let app = build_app();
    let (_, owner) = register_and_login(&app.router, "owner@example.com").await;
    let (_, intruder) = register_and_login(&app.router, "intruder@example.com").await;
    let job_id = create_job(&app.router, &owner, "Rust Engineer", 50_000, 70_000).await;
    let uri = format!("/api/jobs/{job_id}");

    let (status, body) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(&intruder),
        Some(json!({"title": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(&owner),
        Some(json!({"title": "Senior Rust Engineer"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Senior Rust Engineer");
    assert_eq!(body["location"], "Berlin");

    let (status, stored) = send(&app.router, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["title"], "Senior Rust Engineer");
    assert_eq!(stored["description"], "Design and build backend services");

    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app.router, Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app.router, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_delete_validate_id_before_token() {
    let app = build_app();

    let (status, _) = send(
        &app.router,
        Method::PUT,
        "/api/jobs/not-an-id",
        None,
        Some(json!({"title": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, Method::DELETE, "/api/jobs/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        Method::DELETE,
        &format!("/api/jobs/{}", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_filters_by_text_and_salary_subset() {
    let app = build_app();
    let (_, token) = register_and_login(&app.router, "ada@example.com").await;
    create_job(&app.router, &token, "Junior Developer", 50_000, 70_000).await;
    create_job(&app.router, &token, "Senior Developer", 80_000, 100_000).await;

    let (status, jobs) = send(
        &app.router,
        Method::GET,
        "/api/jobs?minSalary=60000",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = jobs
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Senior Developer"]);

    let (_, jobs) = send(&app.router, Method::GET, "/api/jobs?title=junior", None, None).await;
    assert_eq!(jobs.as_array().unwrap().len(), 1);

    let (_, jobs) = send(&app.router, Method::GET, "/api/jobs?location=berlin", None, None).await;
    assert_eq!(jobs.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/jobs?minSalary=lots",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "minSalary");
}

#[tokio::test]
async fn apply_flow_and_owner_listing() {
    let app = build_app();
    let (_, owner) = register_and_login(&app.router, "owner@example.com").await;
    let (_, other) = register_and_login(&app.router, "other@example.com").await;
    let job_id = create_job(&app.router, &owner, "Rust Engineer", 50_000, 70_000).await;
    let apply_uri = format!("/api/applications/{job_id}/apply");

    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/api/applications/{}/apply", uuid::Uuid::new_v4()),
        None,
        Some(json!({"candidateName": "Grace", "candidateEmail": "grace@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    let (status, body) = send(
        &app.router,
        Method::POST,
        &apply_uri,
        None,
        Some(json!({"candidateName": "Grace", "candidateEmail": "grace"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "candidateEmail");

    let (status, mixed_case) = send(
        &app.router,
        Method::POST,
        &apply_uri,
        None,
        Some(json!({"candidateName": "A".repeat(101), "candidateEmail": "Grace.Hopper@Example.COM"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{mixed_case}");
    assert_eq!(mixed_case["candidateEmail"], "Grace.Hopper@Example.COM");
    assert_eq!(mixed_case["candidateName"], "A".repeat(101));

    for _ in 0..2 {
        let (status, application) = send(
            &app.router,
            Method::POST,
            &apply_uri,
            None,
            Some(json!({"candidateName": "Grace", "candidateEmail": "grace@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(application["jobId"], job_id);
        assert_eq!(application["candidateEmail"], "grace@example.com");
        assert!(application["applicationDate"].is_string());
    }
    assert_eq!(app.applications.all().await.len(), 3);

    let list_uri = format!("/api/jobs/{job_id}/applications");
    let (status, listed) = send(&app.router, Method::GET, &list_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 3);

    let (status, _) = send(&app.router, Method::GET, &list_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
