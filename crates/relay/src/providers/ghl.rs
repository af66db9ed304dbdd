//! CRM email API (`/emails/send`) authenticated with a static API key.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::{failure_parts, EmailSender};
use crate::models::email::{Delivery, OutboundEmail};
use crate::services::error::EmailError;

#[derive(Clone)]
pub struct GhlEmailSender {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    sender: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendPayload<'a> {
    to_address: &'a str,
    subject: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_address: Option<&'a str>,
}

impl GhlEmailSender {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: SecretString,
        sender: Option<String>,
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
impl EmailSender for GhlEmailSender {
    fn name(&self) -> &'static str {
        "ghl"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<Delivery, EmailError> {
        let payload = SendPayload {
            to_address: &email.to,
            subject: &email.subject,
            body: &email.body,
            from_address: self.sender.as_deref(),
        };
        let res = self
            .client
            .post(format!("{}/emails/send", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            let (status, body) = failure_parts(res).await;
            return Err(EmailError::Api { status, body });
        }

        let status = res.status().as_u16();
        // The acknowledgment body is informational; an unreadable one is not a failure.
        let ack: serde_json::Value = res.json().await.unwrap_or_default();
        let message_id = ["messageId", "emailMessageId", "id"]
            .iter()
            .find_map(|key| ack.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string);

        Ok(Delivery { status, message_id })
    }
}
