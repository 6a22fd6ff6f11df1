//! Outbound notification dispatch (verification and password-reset emails).
//!
//! Delivery is fire-and-forget: [`dispatch`] spawns the send and logs
//! failures. A [`WebhookNotifier`] hands the message to an external mailer
//! as signed JSON; [`LogNotifier`] logs the whole message, link included,
//! so a deployment without a mailer can still complete the flows.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{info, warn};

use noetic_core::{EmailMessage, Error, Notifier, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "X-Noetic-Signature";

/// Header carrying the notification kind.
pub const EVENT_HEADER: &str = "X-Noetic-Event";

// =============================================================================
// MESSAGE BUILDERS
// =============================================================================

/// Human-readable lifetime of a one-time link, rounded up to whole minutes.
fn expiry_phrase(ttl: Duration) -> String {
    let minutes = ttl.as_secs().div_ceil(60).max(1);
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{} minutes", minutes)
    }
}

/// Email asking the user to confirm their address.
pub fn verification_email(
    to: &str,
    frontend_url: &str,
    token: &str,
    ttl: Duration,
) -> EmailMessage {
    let link = format!(
        "{}/verify-email?token={}",
        frontend_url.trim_end_matches('/'),
        token
    );
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your email address".to_string(),
        text: format!(
            "Welcome! Confirm your email address by opening the link below.\n\n{}\n\nThe link expires in {}.",
            link,
            expiry_phrase(ttl)
        ),
    }
}

/// Email carrying a password-reset link.
pub fn password_reset_email(
    to: &str,
    frontend_url: &str,
    token: &str,
    ttl: Duration,
) -> EmailMessage {
    let link = format!(
        "{}/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        token
    );
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        text: format!(
            "A password reset was requested for this account. Open the link below to choose a new password.\n\n{}\n\nThe link expires in {}. If you did not request this, ignore this email.",
            link,
            expiry_phrase(ttl)
        ),
    }
}

/// Send `message` on a spawned task. Failures are logged, never returned.
pub fn dispatch(notifier: Arc<dyn Notifier>, message: EmailMessage) {
    tokio::spawn(async move {
        let subject = message.subject.clone();
        if let Err(e) = notifier.send(message).await {
            warn!(
                subsystem = "notify",
                op = "dispatch",
                subject = %subject,
                error = %e,
                "Notification delivery failed"
            );
        }
    });
}

// =============================================================================
// NOTIFIERS
// =============================================================================

/// Notifier that logs the full message. Used when no delivery endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        info!(
            subsystem = "notify",
            component = "log",
            op = "send",
            to = %message.to,
            subject = %message.subject,
            body = %message.text,
            "Notification (log only)"
        );
        Ok(())
    }
}

/// Notifier that POSTs the message as JSON to a webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, secret: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Notification(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            secret,
        })
    }
}

/// Hex HMAC-SHA256 of `body` under `secret`.
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Notification(format!("Invalid signing key: {}", e)))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let body = serde_json::to_vec(&message)?;

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header(EVENT_HEADER, "email");

        if let Some(secret) = &self.secret {
            let signature = sign_payload(secret, &body)?;
            request = request.header(SIGNATURE_HEADER, format!("sha256={}", signature));
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("Webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Notification(format!(
                "Webhook returned {}",
                status
            )));
        }

        info!(
            subsystem = "notify",
            component = "webhook",
            op = "send",
            status = status.as_u16(),
            "Notification delivered"
        );
        Ok(())
    }
}
