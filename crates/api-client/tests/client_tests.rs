//! End-to-end behaviour of the gateway client against a scripted transport.

mod common;

use chrono::NaiveDate;
use common::{meal_json, ok, status, token_expiring_in, Harness, MockTransport, BASE_URL};
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};
use vitaltrack_api_client::endpoints::goals::NutritionalGoals;
use vitaltrack_api_client::transport::TransportError;
use vitaltrack_api_client::{ErrorKind, RequestOptions, Source};

fn jan_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_unauthenticated_401_schedules_single_redirect() {
    let harness = Harness::new(MockTransport::fixed(401, json!({"message": "jwt missing"})));

    let err = assert_err!(harness.client.meals().list(None).await);
    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.message, "Authentication required");

    let request = harness.transport.last_request();
    assert!(request.header("authorization").is_none());
    assert!(harness.stored_token().is_none());

    // A second failure while the redirect is pending does not schedule another
    assert_err!(harness.client.recipes().list(None).await);
    assert_eq!(harness.transport.calls(), 2);
    assert!(harness.navigator.redirects().is_empty());

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(harness.navigator.redirects(), vec!["/signin".to_string()]);
    assert!(harness.stored_token().is_none());
}

#[tokio::test]
async fn test_reads_are_cached_by_url_and_query() {
    let token = token_expiring_in(3600);
    let harness = Harness::with_token(
        MockTransport::new(|_, _| ok(json!([meal_json("m1")]))),
        Some(&token),
    );

    let first = assert_ok!(harness.client.meals().list(Some(jan_first())).await);
    let second = assert_ok!(harness.client.meals().list(Some(jan_first())).await);

    assert_eq!(first, second);
    assert_eq!(first[0].id, "m1");
    assert_eq!(harness.transport.calls(), 1);

    let request = harness.transport.last_request();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url.as_str(), format!("{BASE_URL}/meals?date=2024-01-01"));
    assert_eq!(request.header("authorization"), Some(format!("Bearer {token}").as_str()));

    let key = format!("{BASE_URL}/meals?date=2024-01-01");
    assert!(harness.client.cache().get(&key).is_some());
}

#[tokio::test]
async fn test_cache_hits_are_reported_as_such() {
    let harness = Harness::new(MockTransport::new(|_, _| ok(json!({"id": "r1", "name": "Soup"}))));
    let options = RequestOptions::default();

    let first = assert_ok!(harness.client.fetch::<Value>("/recipes/r1", &[], options).await);
    let second = assert_ok!(harness.client.fetch::<Value>("/recipes/r1", &[], options).await);

    assert_eq!(first.source, Source::Network);
    assert_eq!(second.source, Source::Cache);
    assert_eq!(first.value, second.value);

    let third = assert_ok!(
        harness
            .client
            .fetch::<Value>("/recipes/r1", &[], options.without_cache())
            .await
    );
    assert_eq!(third.source, Source::Network);
    assert_eq!(harness.transport.calls(), 2);
}

#[tokio::test]
async fn test_mutation_clears_cache() {
    let harness = Harness::new(MockTransport::new(|call, request| {
        if request.method == Method::PUT {
            ok(json!({"calories": 1800}))
        } else {
            let calories = if call == 0 { 2200 } else { 1800 };
            ok(json!({ "calories": calories }))
        }
    }));

    let before = assert_ok!(harness.client.goals().get().await);
    assert!((before.calories - 2200.0).abs() < f64::EPSILON);

    let update = NutritionalGoals {
        calories: 1800.0,
        ..NutritionalGoals::default()
    };
    assert_ok!(harness.client.goals().update(&update).await);
    assert!(harness.client.cache().is_empty());

    let after = assert_ok!(harness.client.goals().get().await);
    assert!((after.calories - 1800.0).abs() < f64::EPSILON);
    assert!(!after.from_defaults);
    assert_eq!(harness.transport.calls(), 3);
}

#[tokio::test]
async fn test_failed_mutation_keeps_cache() {
    let harness = Harness::new(MockTransport::new(|_, request| {
        if request.method == Method::GET {
            ok(json!([meal_json("m1")]))
        } else {
            status(400)
        }
    }));

    assert_ok!(harness.client.meals().list(None).await);
    let err = assert_err!(harness.client.meals().delete("m1").await);

    assert_eq!(err.status, Some(400));
    assert_eq!(harness.client.cache().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_is_attempted_max_retries_plus_one() {
    let harness = Harness::new(MockTransport::new(|_, _| status(503)));
    let start = Instant::now();

    let err = assert_err!(harness.client.meals().list(None).await);

    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "Server unavailable");
    assert_eq!(harness.transport.calls(), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(6));
    assert!(elapsed < Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn test_per_request_retry_budget() {
    let harness = Harness::new(MockTransport::new(|_, _| status(502)));
    let options = RequestOptions::default().with_max_retries(0);

    assert_err!(harness.client.fetch::<Value>("/meals", &[], options).await);
    assert_eq!(harness.transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_network_failures_are_retried() {
    let harness = Harness::new(MockTransport::new(|call, _| {
        if call < 2 {
            Err(TransportError::Network("connection reset".into()))
        } else {
            ok(json!([]))
        }
    }));

    let meals = assert_ok!(harness.client.meals().list(None).await);
    assert!(meals.is_empty());
    assert_eq!(harness.transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_surfaces_after_retries() {
    let harness = Harness::new(MockTransport::new(|_, _| Err(TransportError::Timeout)));

    let err = assert_err!(harness.client.appointments().list().await);
    assert!(err.is_timeout);
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert_eq!(harness.transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_goals_server_error_falls_back_without_retry() {
    for code in [500, 502, 503] {
        let harness = Harness::new(MockTransport::new(move |_, _| status(code)));

        let goals = assert_ok!(harness.client.goals().get().await);

        assert!(goals.from_defaults);
        assert!((goals.calories - 2000.0).abs() < f64::EPSILON);
        assert_eq!(harness.transport.calls(), 1, "status {code}");
    }
}

#[tokio::test]
async fn test_goals_not_found_falls_back() {
    let harness = Harness::new(MockTransport::new(|_, _| status(404)));
    let goals = assert_ok!(harness.client.goals().get().await);
    assert!(goals.from_defaults);
}

#[tokio::test(start_paused = true)]
async fn test_goals_update_retries_unavailable() {
    let harness = Harness::new(MockTransport::new(|_, _| status(503)));

    let err = assert_err!(harness.client.goals().update(&NutritionalGoals::default()).await);

    assert_eq!(err.status, Some(503));
    assert_eq!(harness.transport.calls(), 3);
    assert!(harness
        .transport
        .requests()
        .iter()
        .all(|request| request.method == Method::PUT));
}

#[tokio::test(start_paused = true)]
async fn test_goals_update_succeeds_after_transient_failure() {
    let harness = Harness::new(MockTransport::new(|call, _| {
        if call == 0 {
            status(502)
        } else {
            ok(json!({"calories": 1800, "protein": 90}))
        }
    }));

    let goals = assert_ok!(harness.client.goals().update(&NutritionalGoals::default()).await);

    assert!((goals.calories - 1800.0).abs() < f64::EPSILON);
    assert_eq!(harness.transport.calls(), 2);
}

#[tokio::test]
async fn test_goals_auth_error_propagates() {
    let token = token_expiring_in(3600);
    let harness = Harness::with_token(MockTransport::new(|_, _| status(403)), Some(&token));

    let err = assert_err!(harness.client.goals().get().await);

    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.message, "Access denied");
    assert!(harness.stored_token().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_auth_rejection_clears_cache_and_token() {
    for code in [401, 403] {
        let token = token_expiring_in(3600);
        let harness = Harness::with_token(
            MockTransport::new(move |call, _| {
                if call == 0 {
                    ok(json!([meal_json("m1")]))
                } else {
                    status(code)
                }
            }),
            Some(&token),
        );

        assert_ok!(harness.client.meals().list(None).await);
        assert_eq!(harness.client.cache().len(), 1, "status {code}");

        let err = assert_err!(harness.client.recipes().list(None).await);
        assert_eq!(err.kind, ErrorKind::Auth);

        assert!(harness.client.cache().is_empty(), "status {code}");
        assert!(harness.stored_token().is_none());

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(harness.navigator.redirects(), vec!["/signin".to_string()]);
    }
}

#[tokio::test]
async fn test_expired_token_is_purged_and_not_sent() {
    let harness = Harness::with_token(
        MockTransport::new(|_, _| ok(json!([]))),
        Some(&token_expiring_in(-60)),
    );

    assert!(!harness.client.validate_token());
    assert!(harness.stored_token().is_none());

    assert_ok!(harness.client.groups().list().await);
    assert!(harness.transport.last_request().header("authorization").is_none());
}

#[tokio::test]
async fn test_malformed_token_is_purged_before_request() {
    let harness = Harness::with_token(MockTransport::new(|_, _| ok(json!([]))), Some("header.payload"));

    assert_ok!(harness.client.family().list().await);

    assert!(harness.transport.last_request().header("authorization").is_none());
    assert!(harness.stored_token().is_none());
}

#[tokio::test]
async fn test_request_ids_are_unique() {
    let harness = Harness::new(MockTransport::new(|_, _| ok(json!({}))));

    assert_ok!(harness.client.post::<Value, _>("/meals", &json!({"mealType": "lunch"})).await);
    assert_ok!(harness.client.post::<Value, _>("/meals", &json!({"mealType": "lunch"})).await);

    let ids: Vec<String> = harness
        .transport
        .requests()
        .iter()
        .map(|r| r.header("x-request-id").unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_failure_envelope_is_an_error_and_not_cached() {
    let harness = Harness::new(MockTransport::fixed(
        200,
        json!({"success": false, "message": "Meal not found"}),
    ));

    let err = assert_err!(harness.client.meals().get("m9").await);

    assert_eq!(err.message, "Meal not found");
    assert_eq!(err.kind, ErrorKind::Client);
    assert!(harness.client.cache().is_empty());
}

#[tokio::test]
async fn test_validation_errors_pass_through() {
    let harness = Harness::new(MockTransport::fixed(
        422,
        json!({"errors": [{"field": "email", "message": "Email is already registered"}]}),
    ));

    let request = vitaltrack_api_client::endpoints::auth::SignUpRequest {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        password: "correct horse".into(),
        date_of_birth: None,
    };
    let err = assert_err!(harness.client.auth().sign_up(&request).await);

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.field_errors()[0].field, "email");
}

#[tokio::test]
async fn test_sign_in_stores_token() {
    let token = token_expiring_in(3600);
    let response_token = token.clone();
    let harness = Harness::new(MockTransport::new(move |_, _| {
        ok(json!({"token": response_token, "user": {"_id": "u1", "name": "Ada"}}))
    }));

    let session = assert_ok!(harness.client.auth().sign_in("ada@example.com", "pw").await);

    assert_eq!(session.user.unwrap().id, "u1");
    assert_eq!(harness.stored_token(), Some(token));
    assert!(harness.client.validate_token());

    let request = harness.transport.last_request();
    assert_eq!(request.url.as_str(), format!("{BASE_URL}/auth/login"));
    assert_eq!(request.body.unwrap()["email"], "ada@example.com");
}

#[tokio::test(start_paused = true)]
async fn test_wrong_password_does_not_redirect() {
    let harness = Harness::new(MockTransport::fixed(401, json!({"message": "Invalid credentials"})));

    let err = assert_err!(harness.client.auth().sign_in("ada@example.com", "nope").await);
    assert!(err.is_auth_error());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(harness.navigator.redirects().is_empty());
}

#[tokio::test]
async fn test_logout_clears_token_and_cache() {
    let token = token_expiring_in(3600);
    let harness = Harness::with_token(MockTransport::new(|_, _| ok(json!([]))), Some(&token));

    assert_ok!(harness.client.appointments().list().await);
    assert_eq!(harness.client.cache().len(), 1);

    harness.client.auth().logout();

    assert!(harness.stored_token().is_none());
    assert!(harness.client.cache().is_empty());
}

#[tokio::test]
async fn test_appointment_cancel_patches_status() {
    let harness = Harness::new(MockTransport::new(|_, _| {
        ok(json!({
            "_id": "a1",
            "title": "Dentist",
            "dateTime": "2030-01-01T10:00:00Z",
            "status": "cancelled"
        }))
    }));

    let appointment = assert_ok!(harness.client.appointments().cancel("a1").await);

    let request = harness.transport.last_request();
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.url.path(), "/api/appointments/a1");
    assert_eq!(request.body.unwrap(), json!({"status": "cancelled"}));
    assert_eq!(
        appointment.status,
        vitaltrack_api_client::endpoints::appointments::AppointmentStatus::Cancelled
    );
}

#[tokio::test]
async fn test_report_rejects_inverted_range_locally() {
    let harness = Harness::new(MockTransport::new(|_, _| ok(json!({}))));
    let end = jan_first();
    let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

    let err = assert_err!(harness.client.reports().comprehensive(start, end).await);
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(harness.transport.calls(), 0);

    assert_ok!(harness.client.reports().comprehensive(end, start).await);
    let request = harness.transport.last_request();
    assert_eq!(request.query_param("startDate").as_deref(), Some("2024-01-01"));
    assert_eq!(request.query_param("endDate").as_deref(), Some("2024-02-01"));
}
