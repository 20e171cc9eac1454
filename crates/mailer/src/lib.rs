//! Transactional email via the Resend HTTP API.
//!
//! The only capability this crate exposes is `send(to, subject, html)`; no
//! retry or backoff is layered on top — a failed send is reported to the
//! caller, which decides what to roll back.

use engine::{CodeSender, DeliveryError, MoneyCents, SentCode};
use reqwest::{Client, StatusCode};
use serde::Serialize;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone, Debug)]
pub struct EmailClient {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl EmailClient {
    pub fn new(client: Client, api_key: String, from: String) -> Self {
        Self {
            client,
            endpoint: RESEND_ENDPOINT.to_string(),
            api_key,
            from,
        }
    }

    /// Points the client at a different endpoint (tests, mock servers).
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sends one email. Success means the API accepted the message, nothing
    /// more.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let body = SendEmailRequest {
            from: &self.from,
            to,
            subject,
            html,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            _ => "server error".to_string(),
        };
        Err(MailError::Server { status, message })
    }
}

/// The one-time-code email body.
fn code_email_html(code: &SentCode) -> String {
    let amount = MoneyCents::new(code.amount_minor);
    format!(
        concat!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">"#,
            r#"<h2 style="color: #2563eb;">Transaction Verification</h2>"#,
            "<p>Hello {user_name},</p>",
            "<p>You are initiating a transfer of <strong>{amount}</strong> to <strong>{recipient}</strong>.</p>",
            r#"<div style="background: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;">"#,
            r#"<p style="margin: 0; font-size: 14px; color: #6b7280;">Your OTP Code:</p>"#,
            r#"<h1 style="margin: 10px 0; font-size: 36px; letter-spacing: 8px; color: #2563eb;">{code}</h1>"#,
            r#"<p style="margin: 0; font-size: 12px; color: #6b7280;">Valid for {minutes} minutes</p>"#,
            "</div>",
            r#"<p style="color: #ef4444; font-size: 14px;">Never share this code with anyone</p>"#,
            "</div>",
        ),
        user_name = code.user_name,
        amount = amount,
        recipient = code.recipient_name,
        code = code.plaintext,
        minutes = code.valid_minutes,
    )
}

#[async_trait::async_trait]
impl CodeSender for EmailClient {
    async fn send_code(&self, code: &SentCode) -> Result<(), DeliveryError> {
        let html = code_email_html(code);
        self.send(&code.to_email, "Credovae - Your Transaction OTP", &html)
            .await
            .map_err(|err| DeliveryError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_email_contains_code_amount_and_recipient() {
        let html = code_email_html(&SentCode {
            to_email: "user@example.com".to_string(),
            user_name: "Alice".to_string(),
            recipient_name: "Bob".to_string(),
            amount_minor: 4000,
            plaintext: "123456".to_string(),
            valid_minutes: 5,
        });

        assert!(html.contains("Hello Alice"));
        assert!(html.contains("$40.00"));
        assert!(html.contains("Bob"));
        assert!(html.contains("123456"));
        assert!(html.contains("Valid for 5 minutes"));
    }
}
