/// Reply text produced for one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReply {
    /// First name used in the greeting (or the placeholder).
    pub first_name: String,
    /// Raw model output, trimmed.
    pub generated: String,
    /// Final text with greeting and signature applied.
    pub body: String,
}

/// One logical email, possibly fanned out to several recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRequest {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl EmailRequest {
    /// Splits the request into one message per recipient, in order.
    pub fn outbound(&self) -> impl Iterator<Item = OutboundEmail> + '_ {
        self.recipients.iter().map(move |to| OutboundEmail {
            to: to.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
        })
    }
}

/// A single plaintext message handed to an email backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// What the backend told us after accepting a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
    pub message_id: Option<String>,
}
