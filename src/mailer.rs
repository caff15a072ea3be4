// src/mailer.rs

use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailerError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("email sign-in is not configured")]
    Disabled,
}

/// Delivers sign-in links. `link` is absolute.
pub trait Mailer: Send + Sync {
    fn send_sign_in_link(&self, recipient_email: &str, link: &str) -> Result<(), MailerError>;
}

pub struct BrevoMailer {
    api_key: String,
    sender_email: String,
    sender_name: String,
    client: Client,
}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: &'a str,
    html_content: String,
}

impl BrevoMailer {
    pub fn new(
        api_key: String,
        sender_email: String,
        sender_name: String,
        timeout: Duration,
    ) -> Result<Self, MailerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        Ok(Self {
            api_key,
            sender_email,
            sender_name,
            client,
        })
    }
}

fn sign_in_email(link: &str) -> String {
    let link = maud::html! { a href=(link) { "Click here to sign in" } }.into_string();
    format!(
        r#"
        <h1>Sign in to Dutch Markets</h1>
        <p>Click the link below to sign in. This link expires in 15 minutes and works once.</p>
        <p>{link}</p>
        <p>If you did not request this link, you can safely ignore this email.</p>
    "#
    )
}

impl Mailer for BrevoMailer {
    fn send_sign_in_link(&self, recipient_email: &str, link: &str) -> Result<(), MailerError> {
        let payload = BrevoPayload {
            sender: BrevoSender {
                name: &self.sender_name,
                email: &self.sender_email,
            },
            to: vec![BrevoRecipient {
                email: recipient_email,
            }],
            subject: "Your Dutch Markets sign-in link",
            html_content: sign_in_email(link),
        };

        let resp = self
            .client
            .post(BREVO_ENDPOINT)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MailerError::ApiError(format!("{status}: {body}")));
        }

        tracing::info!("sign-in link sent");
        Ok(())
    }
}

/// Writes the link to the log instead of sending it. Local development only.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_sign_in_link(&self, recipient_email: &str, link: &str) -> Result<(), MailerError> {
        tracing::info!(to = recipient_email, %link, "sign-in link (not emailed)");
        Ok(())
    }
}

/// Used when no delivery is configured: sign-in requests are refused.
pub struct DisabledMailer;

impl Mailer for DisabledMailer {
    fn send_sign_in_link(&self, _recipient_email: &str, _link: &str) -> Result<(), MailerError> {
        Err(MailerError::Disabled)
    }
}
