use std::sync::Arc;
use tracing::info;

use crate::models::email::EmailRequest;
use crate::providers::EmailSender;
use crate::services::error::RelayError;

/// Fans an [`EmailRequest`] out to its recipients, one send each.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn EmailSender>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self { sender }
    }

    /// Sends sequentially and stops at the first failure. Recipients already
    /// sent to are not reported separately; the whole request fails.
    pub async fn dispatch(&self, request: &EmailRequest) -> Result<Vec<String>, RelayError> {
        let mut sent_to = Vec::with_capacity(request.recipients.len());
        for email in request.outbound() {
            let delivery = self
                .sender
                .send(&email)
                .await
                .map_err(|source| RelayError::Email {
                    recipient: email.to.clone(),
                    source,
                })?;
            info!(
                provider = self.sender.name(),
                recipient = %email.to,
                status = delivery.status,
                message_id = ?delivery.message_id,
                "email accepted"
            );
            sent_to.push(email.to);
        }
        Ok(sent_to)
    }
}
