mod common;

use std::sync::Arc;

use academic_progress::progress::EMPTY_LEVEL_MESSAGE;
use axum::http::StatusCode;
use common::*;

#[tokio::test]
async fn student_without_records_sees_sentinel_everywhere() {
    let app = TestApp::new();

    let (status, body) = app.read(Some(STUDENT_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant_id"], "t1");
    assert_eq!(body["user_id"], "u1");

    let levels = body["academic_progress"].as_object().unwrap();
    assert_eq!(levels.len(), 10);
    for level in 1..=10 {
        assert_eq!(levels[&level.to_string()], EMPTY_LEVEL_MESSAGE);
    }
}

#[tokio::test]
async fn single_level_five_record() {
    let app = TestApp::new();
    let (status, _) = app.submit(Some(STUDENT_TOKEN), &course_payload(5, "P501")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.read(Some(STUDENT_TOKEN)).await;
    let levels = &body["academic_progress"];
    let five = levels["5"].as_array().unwrap();
    assert_eq!(five.len(), 1);
    assert_eq!(five[0]["course_id"], "P501");

    for level in (1..=10).filter(|l| *l != 5) {
        assert_eq!(levels[level.to_string()], EMPTY_LEVEL_MESSAGE);
    }
}

#[tokio::test]
async fn written_record_is_read_back_at_its_level() {
    let app = TestApp::new();
    let (status, _) = app.submit(Some(STUDENT_TOKEN), &algebra_payload()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.read(Some(STUDENT_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);

    let levels = &body["academic_progress"];
    let three = levels["3"].as_array().unwrap();
    assert_eq!(three.len(), 1);
    assert_eq!(three[0]["course_id"], "C101");
    assert_eq!(three[0]["course_name"], "Algebra");
    assert_eq!(three[0]["grade"], 85);
    assert_eq!(three[0]["status"], "completed");
    assert_eq!(three[0]["period"], "2024-1");
    assert!(three[0].get("tenant_id").is_none());

    for level in [1, 2, 4, 5, 6, 7, 8, 9, 10] {
        assert_eq!(levels[level.to_string()], EMPTY_LEVEL_MESSAGE);
    }
}

#[tokio::test]
async fn read_is_scoped_to_the_authenticated_student() {
    let app = TestApp::new();
    app.submit(Some(STUDENT_TOKEN), &algebra_payload()).await;

    let (status, body) = app.read(Some(OTHER_STUDENT_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u2");
    assert_eq!(body["academic_progress"]["3"], EMPTY_LEVEL_MESSAGE);

    let (_, body) = app.read(Some(OTHER_TENANT_TOKEN)).await;
    assert_eq!(body["tenant_id"], "t2");
    assert_eq!(body["academic_progress"]["3"], EMPTY_LEVEL_MESSAGE);
}

#[tokio::test]
async fn store_failure_is_storage_unavailable() {
    let app = TestApp::with_store(Arc::new(FailingStore));

    let (status, body) = app.read(Some(STUDENT_TOKEN)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORAGE_UNAVAILABLE");
}

#[tokio::test]
async fn health_reports_degraded_store() {
    let app = TestApp::with_store(Arc::new(FailingStore));

    let (status, body) = app.send(axum::http::Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}
