use serde::Deserialize;

use crate::services::error::RelayError;

/// Webhook payload as delivered by the CRM.
///
/// Different workflow builders nest things differently, so every field is
/// optional here and the accessors below pick the first non-empty location.
#[derive(Debug, Default, Deserialize)]
pub struct InboundEvent {
    pub body: Option<String>,
    pub subject: Option<String>,
    pub message: Option<MessageField>,
    pub contact: Option<ContactField>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageField {
    Text(String),
    Detailed {
        body: Option<String>,
        subject: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactField {
    pub email: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// An event that passed validation: body and contact address are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEvent {
    pub body: String,
    pub contact_email: String,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub subject: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl InboundEvent {
    pub fn message_body(&self) -> Option<&str> {
        non_empty(self.body.as_ref()).or_else(|| match &self.message {
            Some(MessageField::Text(text)) => non_empty(Some(text)),
            Some(MessageField::Detailed { body, .. }) => non_empty(body.as_ref()),
            None => None,
        })
    }

    pub fn subject(&self) -> Option<&str> {
        non_empty(self.subject.as_ref()).or_else(|| match &self.message {
            Some(MessageField::Detailed { subject, .. }) => non_empty(subject.as_ref()),
            _ => None,
        })
    }

    pub fn contact_email(&self) -> Option<&str> {
        non_empty(self.contact.as_ref().and_then(|c| c.email.as_ref()))
            .or_else(|| non_empty(self.email.as_ref()))
    }

    pub fn first_name(&self) -> Option<&str> {
        non_empty(self.contact.as_ref().and_then(|c| c.first_name.as_ref()))
            .or_else(|| non_empty(self.first_name.as_ref()))
    }

    /// Full display name, falling back to joined first/last parts.
    pub fn display_name(&self) -> Option<String> {
        let contact = self.contact.as_ref();
        let whole = non_empty(contact.and_then(|c| c.name.as_ref()))
            .or_else(|| non_empty(contact.and_then(|c| c.full_name.as_ref())))
            .or_else(|| non_empty(self.full_name.as_ref()))
            .or_else(|| non_empty(self.name.as_ref()));
        if let Some(name) = whole {
            return Some(name.to_string());
        }

        let from_contact = join_parts(
            non_empty(contact.and_then(|c| c.first_name.as_ref())),
            non_empty(contact.and_then(|c| c.last_name.as_ref())),
        );
        from_contact.or_else(|| {
            join_parts(
                non_empty(self.first_name.as_ref()),
                non_empty(self.last_name.as_ref()),
            )
        })
    }

    /// Checks the fields the pipeline cannot do without. The body is checked
    /// before the contact address.
    pub fn validate(&self) -> Result<ValidatedEvent, RelayError> {
        let body = self
            .message_body()
            .ok_or_else(|| RelayError::Validation("Missing email body".to_string()))?;
        let contact_email = self
            .contact_email()
            .ok_or_else(|| RelayError::Validation("Missing contact email".to_string()))?;

        Ok(ValidatedEvent {
            body: body.to_string(),
            contact_email: contact_email.to_string(),
            display_name: self.display_name(),
            first_name: self.first_name().map(str::to_string),
            subject: self.subject().map(str::to_string),
        })
    }
}

fn join_parts(first: Option<&str>, last: Option<&str>) -> Option<String> {
    match (first, last) {
        (Some(f), Some(l)) => Some(format!("{f} {l}")),
        (Some(f), None) => Some(f.to_string()),
        (None, Some(l)) => Some(l.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> InboundEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn reads_top_level_body_and_nested_contact() {
        let event = parse(json!({
            "body": "When will my refund arrive?",
            "contact": { "name": "Jane Doe", "email": "jane@x.com" }
        }));
        let valid = event.validate().unwrap();

        assert_eq!(valid.body, "When will my refund arrive?");
        assert_eq!(valid.contact_email, "jane@x.com");
        assert_eq!(valid.display_name.as_deref(), Some("Jane Doe"));
        assert_eq!(valid.first_name, None);
        assert_eq!(valid.subject, None);
    }

    #[test]
    fn reads_nested_message_and_flat_contact_fields() {
        let event = parse(json!({
            "message": { "body": "Is the store open Sunday?", "subject": "Opening hours" },
            "email": "sam@example.org",
            "first_name": "Sam",
            "last_name": "Lee"
        }));
        let valid = event.validate().unwrap();

        assert_eq!(valid.body, "Is the store open Sunday?");
        assert_eq!(valid.subject.as_deref(), Some("Opening hours"));
        assert_eq!(valid.contact_email, "sam@example.org");
        assert_eq!(valid.display_name.as_deref(), Some("Sam Lee"));
        assert_eq!(valid.first_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn message_may_be_a_plain_string() {
        let event = parse(json!({ "message": "  hello  ", "contact": { "email": "a@b.c" } }));
        assert_eq!(event.message_body(), Some("hello"));
    }

    #[test]
    fn contact_fields_win_over_top_level_ones() {
        let event = parse(json!({
            "body": "hi",
            "email": "top@x.com",
            "full_name": "Top Level",
            "contact": { "email": "nested@x.com", "first_name": "Nia", "last_name": "Okafor" }
        }));
        assert_eq!(event.contact_email(), Some("nested@x.com"));
        // An explicit full name anywhere beats joined parts.
        assert_eq!(event.display_name().as_deref(), Some("Top Level"));
        assert_eq!(event.first_name(), Some("Nia"));
    }

    #[test]
    fn missing_or_blank_body_is_rejected_first() {
        for payload in [
            json!({ "contact": { "email": "jane@x.com" } }),
            json!({ "body": "", "contact": { "email": "jane@x.com" } }),
            json!({ "body": "   ", "message": { "body": "" } }),
        ] {
            let err = parse(payload).validate().unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.to_string(), "Missing email body");
        }
    }

    #[test]
    fn missing_contact_email_is_rejected() {
        let err = parse(json!({ "body": "hello", "contact": { "name": "Jane" } }))
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing contact email");
    }

    #[test]
    fn no_name_information_yields_none() {
        let event = parse(json!({ "body": "x", "email": "a@b.c", "contact": {} }));
        assert_eq!(event.display_name(), None);
        assert_eq!(event.first_name(), None);
    }
}
