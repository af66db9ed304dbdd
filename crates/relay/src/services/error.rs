use thiserror::Error;

/// Failures talking to the completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("completion returned no text")]
    EmptyResponse,
}

/// Failures talking to an email backend, including the OAuth token exchange.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("email API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("token exchange failed: {0}")]
    TokenExchange(String),
}

/// Everything that can stop a webhook from being relayed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound payload is missing something we need. Nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Email delivery to {recipient} failed: {source}")]
    Email {
        recipient: String,
        #[source]
        source: EmailError,
    },
}

impl RelayError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RelayError::Validation(_))
    }
}
