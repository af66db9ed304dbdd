//! Outbound service contracts and their HTTP implementations.
//!
//! The pipeline only ever sees [`CompletionProvider`] and [`EmailSender`];
//! which concrete client backs them is decided once at startup from
//! [`RelayConfig`](crate::config::RelayConfig).

pub mod ghl;
pub mod graph;
pub mod openai;
pub mod sendgrid;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{CompletionConfig, EmailProviderConfig};
use crate::models::email::{Delivery, OutboundEmail};
use crate::services::error::{CompletionError, EmailError};

pub use ghl::GhlEmailSender;
pub use graph::GraphEmailSender;
pub use openai::OpenAiClient;
pub use sendgrid::SendGridEmailSender;

/// A system + user chat turn with sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the generated text for one chat turn.
    async fn complete(&self, request: &ChatRequest) -> Result<String, CompletionError>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submits a single message. One call, one recipient.
    async fn send(&self, email: &OutboundEmail) -> Result<Delivery, EmailError>;
}

pub fn build_completion_provider(
    config: &CompletionConfig,
    client: reqwest::Client,
) -> Arc<dyn CompletionProvider> {
    Arc::new(OpenAiClient::new(
        client,
        config.base_url.clone(),
        config.api_key.clone(),
    ))
}

pub fn build_email_sender(
    config: &EmailProviderConfig,
    client: reqwest::Client,
) -> Arc<dyn EmailSender> {
    match config {
        EmailProviderConfig::Ghl {
            api_key,
            base_url,
            sender,
        } => Arc::new(GhlEmailSender::new(
            client,
            base_url.clone(),
            api_key.clone(),
            sender.clone(),
        )),
        EmailProviderConfig::SendGrid {
            api_key,
            base_url,
            sender,
        } => Arc::new(SendGridEmailSender::new(
            client,
            base_url.clone(),
            api_key.clone(),
            sender.clone(),
        )),
        EmailProviderConfig::Graph {
            client_id,
            client_secret,
            token_url,
            base_url,
            sender,
        } => Arc::new(GraphEmailSender::new(
            client,
            graph::ClientCredentials {
                token_url: token_url.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            },
            base_url.clone(),
            sender.clone(),
        )),
    }
}

/// Reads a failed response into an `(status, body)` pair for error reporting.
async fn failure_parts(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, body)
}

/// A throwaway HTTP server that records every request and answers with a
/// caller-supplied response, used to exercise the real clients.
#[cfg(test)]
pub(crate) mod stub {
    use axum::{
        body::Bytes,
        http::{HeaderMap, Method, Uri},
        response::Response,
        Router,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: String,
        pub path: String,
        pub authorization: Option<String>,
        pub content_type: Option<String>,
        pub body: String,
    }

    impl Recorded {
        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).expect("recorded body is JSON")
        }
    }

    pub type Log = Arc<Mutex<Vec<Recorded>>>;

    pub async fn spawn<F>(respond: F) -> (String, Log)
    where
        F: Fn(&str) -> Response + Clone + Send + Sync + 'static,
    {
        let log: Log = Arc::default();
        let recorder = Arc::clone(&log);

        let app = Router::new().fallback(
            move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                let recorder = Arc::clone(&recorder);
                let respond = respond.clone();
                async move {
                    let header = |name: &str| {
                        headers
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    recorder.lock().unwrap().push(Recorded {
                        method: method.to_string(),
                        path: uri.path().to_string(),
                        authorization: header("authorization"),
                        content_type: header("content-type"),
                        body: String::from_utf8_lossy(&body).into_owned(),
                    });
                    respond(uri.path())
                }
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (format!("http://{addr}"), log)
    }
}
