//! SendGrid v3 mail send.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::{failure_parts, EmailSender};
use crate::models::email::{Delivery, OutboundEmail};
use crate::services::error::EmailError;

#[derive(Clone)]
pub struct SendGridEmailSender {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    sender: String,
}

#[derive(Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl SendGridEmailSender {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: SecretString,
        sender: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            sender,
        }
    }
}

#[async_trait]
impl EmailSender for SendGridEmailSender {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<Delivery, EmailError> {
        let payload = MailSend {
            personalizations: [Personalization {
                to: [Address { email: &email.to }],
            }],
            from: Address {
                email: &self.sender,
            },
            subject: &email.subject,
            content: [Content {
                kind: "text/plain",
                value: &email.body,
            }],
        };
        let res = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            let (status, body) = failure_parts(res).await;
            return Err(EmailError::Api { status, body });
        }

        Ok(Delivery {
            status: res.status().as_u16(),
            message_id: res
                .headers()
                .get("x-message-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        })
    }
}
