//! Multi-channel alert dispatch
//!
//! Fans one enriched alert out to the configured notification channels:
//! email over SMTP, a Slack incoming webhook, and SMS through the Twilio
//! REST API. Channels are attempted once each, in configuration order, and
//! a failing channel never prevents the others from being tried or leaks
//! an error to the caller.

use crate::config::{Config, EmailConfig, SlackConfig, SmsConfig};
use crate::models::EnrichedAlert;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Errors that can occur on a single channel send
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Message build error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
}

/// Dispatches enriched alerts to the enabled notification channels
pub struct AlertDispatcher {
    email: EmailConfig,
    slack: SlackConfig,
    sms: SmsConfig,
    client: Client,
}

impl AlertDispatcher {
    /// Create a dispatcher from the channel sections of the configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(AlertDispatcher {
            email: config.email.clone(),
            slack: config.slack.clone(),
            sms: config.sms.clone(),
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
        })
    }

    /// Names of the channels that will be attempted per alert
    pub fn enabled_channels(&self) -> Vec<&'static str> {
        let mut channels = Vec::new();
        if self.email.enabled {
            channels.push("email");
        }
        if self.slack.enabled {
            channels.push("slack");
        }
        if self.sms.enabled {
            channels.push("sms");
        }
        channels
    }

    /// Send an alert through every enabled channel
    ///
    /// Each channel is attempted exactly once; failures are logged and
    /// counted, never propagated. Returns the number of channels that
    /// failed.
    pub async fn dispatch(&self, alert: &EnrichedAlert) -> usize {
        let subject = alert.subject();
        let body = alert.body();
        let mut failures = 0;

        if self.email.enabled {
            match self.send_email(&subject, &body).await {
                Ok(()) => log::info!("Email alert sent to {}", self.email.recipient_email),
                Err(e) => {
                    log::error!("Email alert failed: {}", e);
                    failures += 1;
                }
            }
        }

        if self.slack.enabled {
            match self.send_slack(&body).await {
                Ok(()) => log::info!("Slack alert sent"),
                Err(e) => {
                    log::error!("Slack alert failed: {}", e);
                    failures += 1;
                }
            }
        }

        if self.sms.enabled {
            match self.send_sms(&body).await {
                Ok(()) => log::info!("SMS alert sent to {}", self.sms.to_number),
                Err(e) => {
                    log::error!("SMS alert failed: {}", e);
                    failures += 1;
                }
            }
        }

        failures
    }

    async fn send_email(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        let creds = Credentials::new(
            self.email.sender_email.clone(),
            self.email.sender_password.clone(),
        );

        let transport: AsyncSmtpTransport<Tokio1Executor> = if self.email.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.email.smtp_server)?
                .port(self.email.smtp_port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.email.smtp_server)
                .port(self.email.smtp_port)
                .credentials(creds)
                .build()
        };

        let message = Message::builder()
            .from(self.email.sender_email.parse::<Mailbox>()?)
            .to(self.email.recipient_email.parse::<Mailbox>()?)
            .subject(subject)
            .body(body.to_string())?;

        transport.send(message).await?;
        Ok(())
    }

    async fn send_slack(&self, body: &str) -> Result<(), AlertError> {
        let payload = serde_json::json!({ "text": body });

        self.client
            .post(&self.slack.webhook_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn send_sms(&self, body: &str) -> Result<(), AlertError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.sms.account_sid
        );

        self.client
            .post(&url)
            .basic_auth(&self.sms.account_sid, Some(&self.sms.auth_token))
            .form(&[
                ("To", self.sms.to_number.as_str()),
                ("From", self.sms.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailedLoginEvent, GeoInfo, ThreatInfo};
    use chrono::Utc;
    use std::net::IpAddr;
    use std::str::FromStr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_alert() -> EnrichedAlert {
        EnrichedAlert {
            event: FailedLoginEvent {
                source_addr: IpAddr::from_str("203.0.113.7").unwrap(),
                username: "admin".to_string(),
                observed_at: Utc::now(),
            },
            geo: GeoInfo::default(),
            threat: ThreatInfo::default(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_with_no_channels_enabled() {
        let config = Config::default();
        let dispatcher = AlertDispatcher::new(&config).unwrap();

        assert!(dispatcher.enabled_channels().is_empty());
        assert_eq!(dispatcher.dispatch(&test_alert()).await, 0);
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_succeeding_one() {
        // A one-shot local HTTP server stands in for the Slack webhook
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                .await
                .unwrap();
            let _ = socket.shutdown().await;
        });

        let mut config = Config::default();
        // Email points at a closed port and fails fast
        config.email.enabled = true;
        config.email.smtp_server = "127.0.0.1".to_string();
        config.email.smtp_port = 1;
        config.email.use_tls = false;
        config.email.sender_email = "monitor@example.com".to_string();
        config.email.recipient_email = "ops@example.com".to_string();
        // Slack points at the local server and succeeds
        config.slack.enabled = true;
        config.slack.webhook_url = format!("http://{}/webhook", addr);

        let dispatcher = AlertDispatcher::new(&config).unwrap();
        assert_eq!(dispatcher.enabled_channels(), vec!["email", "slack"]);

        let failures = dispatcher.dispatch(&test_alert()).await;
        assert_eq!(failures, 1);

        // The webhook was actually delivered
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_slack_non_success_status_is_a_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n")
                .await
                .unwrap();
            let _ = socket.shutdown().await;
        });

        let mut config = Config::default();
        config.slack.enabled = true;
        config.slack.webhook_url = format!("http://{}/webhook", addr);

        let dispatcher = AlertDispatcher::new(&config).unwrap();
        assert_eq!(dispatcher.dispatch(&test_alert()).await, 1);
    }
}
