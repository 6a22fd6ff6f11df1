use std::time::Duration;

use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use noetic_api::services::notifier::{
    sign_payload, verification_email, WebhookNotifier, EVENT_HEADER, SIGNATURE_HEADER,
};
use noetic_core::{Error, Notifier};

const TTL: Duration = Duration::from_secs(600);

#[tokio::test]
async fn test_webhook_posts_signed_message() {
    let server = MockServer::start().await;
    let message = verification_email("alice@example.com", "http://localhost:5173", "tok", TTL);
    let body = serde_json::to_vec(&message).unwrap();
    let expected = format!("sha256={}", sign_payload("hook-secret", &body).unwrap());

    Mock::given(method("POST"))
        .and(path("/mail"))
        .and(header(EVENT_HEADER, "email"))
        .and(header(SIGNATURE_HEADER, expected.as_str()))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(
        format!("{}/mail", server.uri()),
        Some("hook-secret".to_string()),
    )
    .unwrap();
    notifier.send(message).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let sent: noetic_core::EmailMessage = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent.to, "alice@example.com");
}

#[tokio::test]
async fn test_webhook_without_secret_is_unsigned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(server.uri(), None).unwrap();
    notifier
        .send(verification_email("a@example.com", "http://x", "t", TTL))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert!(!received[0].headers.contains_key(SIGNATURE_HEADER));
}

#[tokio::test]
async fn test_webhook_error_status_is_notification_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists(EVENT_HEADER))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(server.uri(), None).unwrap();
    let err = notifier
        .send(verification_email("a@example.com", "http://x", "t", TTL))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Notification(_)));
    assert_eq!(err.public_message(), "Operation failed");
}
