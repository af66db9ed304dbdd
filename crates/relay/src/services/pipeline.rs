use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::{RelayConfig, ReplyMode};
use crate::models::inbound::InboundEvent;
use crate::providers::{CompletionProvider, EmailSender};
use crate::services::composer::{Composer, CompositionSettings};
use crate::services::dispatcher::Dispatcher;
use crate::services::error::RelayError;
use crate::services::formatting::build_email_request;
use crate::services::recipients::resolve_recipients;

/// Result of relaying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub status: &'static str,
    pub sent_to: Vec<String>,
}

/// Validate → compose → format → dispatch, for a single inbound event.
#[derive(Clone)]
pub struct Relay {
    mode: ReplyMode,
    composer: Composer,
    dispatcher: Dispatcher,
}

impl Relay {
    pub fn new(
        config: &RelayConfig,
        completion: Arc<dyn CompletionProvider>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            mode: config.mode.clone(),
            composer: Composer::new(
                completion,
                CompositionSettings::from_config(&config.completion, &config.prompt),
            ),
            dispatcher: Dispatcher::new(email),
        }
    }

    #[instrument(skip_all)]
    pub async fn handle(&self, event: &InboundEvent) -> Result<RelayOutcome, RelayError> {
        let event = event.validate()?;
        info!(contact = %event.contact_email, "relaying inbound message");

        let name = event.first_name.as_deref().or(event.display_name.as_deref());
        let reply = self.composer.compose(&event.body, name).await?;

        let recipients = resolve_recipients(&self.mode, &event.contact_email);
        let request = build_email_request(&self.mode, &event, &reply, recipients);
        let sent_to = self.dispatcher.dispatch(&request).await?;

        Ok(RelayOutcome {
            status: match self.mode {
                ReplyMode::Review { .. } => "sent to fixed address",
                ReplyMode::Direct => "sent to contact",
            },
            sent_to,
        })
    }
}
