//! Wire-level contract tests for the calendar API client

use mediline_gateway::{CalendarApi, CalendarClient, CalendarConfig, Error};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: &str) -> CalendarConfig {
    CalendarConfig {
        base_url: base_url.to_string(),
        app_id: "app-id".to_string(),
        app_key: "app-key".to_string(),
        ..CalendarConfig::default()
    }
}

async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/GenerateToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "0",
            "message": "",
            "token": token,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn token_request_carries_app_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/GenerateToken"))
        .and(body_partial_json(json!({
            "appID": "app-id",
            "appKey": "app-key",
            "userID": 8,
            "userType": "D",
            "appType": "A",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "0",
            "token": "tok-1",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/GetAvailabilityAsPerTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "0",
            "Slot": [],
        })))
        .mount(&server)
        .await;

    let client = CalendarClient::new(config(&server.uri()));
    client.day_slots("2024-09-25").await.unwrap();
}

#[tokio::test]
async fn availability_request_is_bearer_authed_and_enveloped() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-abc").await;
    Mock::given(method("POST"))
        .and(path("/GetAvailabilityAsPerTime"))
        .and(header("authorization", "Bearer tok-abc"))
        .and(body_partial_json(json!({
            "data": {
                "doctorID": 8,
                "date": "2024-09-25",
                "time": "00:00:00",
                "callType": 0,
            },
            "action": "getdata",
            "intent": "get_availability",
            "module": "calendar",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "0",
            "Slot": [
                {"time": "9:00 AM", "isBooked": "N"},
                {"time": "10:00 AM", "isBooked": "Y"},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CalendarClient::new(config(&server.uri()));
    let slots = client.day_slots("2024-09-25").await.unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].time, "9:00 AM");
    assert!(!slots[0].is_booked());
    assert!(slots[1].is_booked());
}

#[tokio::test]
async fn token_is_cached_across_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/GenerateToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "0",
            "token": "tok-cached",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/GetAvailabilityAsPerTime"))
        .and(header("authorization", "Bearer tok-cached"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "0",
            "Slot": [],
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = CalendarClient::new(config(&server.uri()));
    client.day_slots("2024-09-25").await.unwrap();
    client.day_slots("2024-09-26").await.unwrap();
}

#[tokio::test]
async fn upstream_error_code_surfaces_code_and_message() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-err").await;
    Mock::given(method("POST"))
        .and(path("/GetAvailabilityAsPerTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "2",
            "message": "Slot not available.",
        })))
        .mount(&server)
        .await;

    let client = CalendarClient::new(config(&server.uri()));
    let err = client.day_slots("2024-09-25").await.unwrap_err();

    match err {
        Error::Upstream { code, message } => {
            assert_eq!(code, "2");
            assert_eq!(message, "Slot not available.");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_token_issue_aborts_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/GenerateToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "5",
            "message": "Invalid appKey",
        })))
        .mount(&server)
        .await;

    let client = CalendarClient::new(config(&server.uri()));
    let err = client.day_slots("2024-09-25").await.unwrap_err();

    assert!(matches!(err, Error::Upstream { ref code, .. } if code == "5"));
}

#[tokio::test]
async fn booking_body_uses_the_upstream_field_spelling() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-book").await;
    Mock::given(method("POST"))
        .and(path("/AddAppointment"))
        .and(header("authorization", "Bearer tok-book"))
        .and(body_partial_json(json!({
            "data": {
                "doctorConsultationTypeID": 15,
                "docotrID": 8,
                "visitDateTime": "2024-09-25 9:00:00 AM",
                "callType": 0,
                "userID": 623,
            },
            "action": "add",
            "intent": "add_appointment",
            "module": "calendar",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "0",
            "message": "Appointment added.",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CalendarClient::new(config(&server.uri()));
    client.add_appointment("2024-09-25 9:00:00 AM").await.unwrap();
}

#[tokio::test]
async fn rejected_booking_is_an_upstream_error() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-rej").await;
    Mock::given(method("POST"))
        .and(path("/AddAppointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "3",
            "message": "Slot already booked.",
        })))
        .mount(&server)
        .await;

    let client = CalendarClient::new(config(&server.uri()));
    let err = client.add_appointment("2024-09-25 9:00:00 AM").await.unwrap_err();

    assert!(matches!(err, Error::Upstream { ref message, .. } if message == "Slot already booked."));
}
