//! Integration tests for `NtfyNotifier` against a local `wiremock` server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use salewatch_core::{NtfyConfig, SaleEvent};
use salewatch_notify::{dispatch, Channel, ChannelOutcome, Notifier, NotifyError, NtfyNotifier};

fn notifier(server: &MockServer) -> NtfyNotifier {
    let config = NtfyConfig {
        base_url: format!("{}/", server.uri()),
        topic: "salewatch-test".to_string(),
    };
    NtfyNotifier::new(&config, 5).expect("failed to build test NtfyNotifier")
}

fn grandpa() -> SaleEvent {
    SaleEvent {
        store_name: "Grandpa".to_string(),
        description: "Up to 40% off".to_string(),
        url: "https://www.grandpa.se/sale".to_string(),
    }
}

#[tokio::test]
async fn single_sale_posts_json_alert() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "topic": "salewatch-test",
            "title": "REA: Grandpa",
            "message": "Up to 40% off",
            "priority": 4,
            "tags": ["shopping_bags"],
            "click": "https://www.grandpa.se/sale"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server)
        .send(&[grandpa()])
        .await
        .expect("send should succeed");
}

#[tokio::test]
async fn empty_batch_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    notifier(&server).send(&[]).await.expect("no-op send");
}

#[tokio::test]
async fn test_notification_has_default_priority() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({
            "topic": "salewatch-test",
            "title": "Test",
            "message": "Salewatch fungerar!",
            "priority": 3,
            "tags": ["white_check_mark"]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server).send_test().await.expect("test send");
}

#[tokio::test]
async fn server_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = notifier(&server).send(&[grandpa()]).await;
    assert!(
        matches!(result, Err(NotifyError::NtfyStatus { status: 500 })),
        "expected NtfyStatus(500), got: {result:?}"
    );
}

#[tokio::test]
async fn dispatch_reports_ntfy_failure_and_skipped_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let channels = vec![
        Channel::unconfigured("email"),
        Channel::configured(Box::new(notifier(&server))),
    ];
    let reports = dispatch(&channels, &[grandpa()]).await;

    assert_eq!(reports[0].outcome, ChannelOutcome::Skipped);
    assert_eq!(reports[1].channel, "ntfy");
    assert!(matches!(reports[1].outcome, ChannelOutcome::Failed(_)));
}
