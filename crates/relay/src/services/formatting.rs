use crate::config::ReplyMode;
use crate::models::email::{ComposedReply, EmailRequest};
use crate::models::inbound::ValidatedEvent;
use crate::services::names::DISPLAY_NAME_PLACEHOLDER;

/// Builds the email that carries a reply, shaped for the configured mode.
///
/// Reviewers get the original message alongside the draft; a contact in
/// direct mode gets the draft alone.
pub fn build_email_request(
    mode: &ReplyMode,
    event: &ValidatedEvent,
    reply: &ComposedReply,
    recipients: Vec<String>,
) -> EmailRequest {
    let (subject, body) = match mode {
        ReplyMode::Review { .. } => {
            let name = event
                .display_name
                .as_deref()
                .unwrap_or(DISPLAY_NAME_PLACEHOLDER);
            let subject = format!("AI Reply for: {name} ({})", event.contact_email);
            let body = format!(
                "Original Sender: {name} <{email}>\n\n\
                 --- Original Message ---\n\
                 {message}\n\n\
                 --- AI Suggested Reply ---\n\
                 {reply}",
                email = event.contact_email,
                message = event.body,
                reply = reply.body,
            );
            (subject, body)
        }
        ReplyMode::Direct => {
            let subject = match event.subject.as_deref() {
                Some(original) => format!("Re: {original}"),
                None => "Re: Your message".to_string(),
            };
            (subject, reply.body.clone())
        }
    };

    EmailRequest {
        recipients,
        subject,
        body,
    }
}
