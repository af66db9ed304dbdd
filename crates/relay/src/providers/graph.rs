//! Microsoft Graph `sendMail`, authenticated through the OAuth
//! client-credentials flow.
//!
//! A fresh token is exchanged for every send; nothing is cached between calls.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{failure_parts, EmailSender};
use crate::models::email::{Delivery, OutboundEmail};
use crate::services::error::EmailError;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

#[derive(Clone)]
pub struct GraphEmailSender {
    client: reqwest::Client,
    credentials: ClientCredentials,
    base_url: String,
    sender: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMail<'a> {
    message: Message<'a>,
    save_to_sent_items: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Message<'a> {
    subject: &'a str,
    body: ItemBody<'a>,
    to_recipients: [Recipient<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemBody<'a> {
    content_type: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Recipient<'a> {
    email_address: EmailAddress<'a>,
}

#[derive(Serialize)]
struct EmailAddress<'a> {
    address: &'a str,
}

impl GraphEmailSender {
    pub fn new(
        client: reqwest::Client,
        credentials: ClientCredentials,
        base_url: String,
        sender: String,
    ) -> Self {
        Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
            sender,
        }
    }

    /// Exchanges the client credentials for a bearer token.
    async fn access_token(&self) -> Result<String, EmailError> {
        let res = self
            .client
            .post(&self.credentials.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                (
                    "client_secret",
                    self.credentials.client_secret.expose_secret(),
                ),
                ("scope", GRAPH_SCOPE),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            let (status, body) = failure_parts(res).await;
            return Err(EmailError::TokenExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = res.json().await.map_err(|e| {
            EmailError::TokenExchange(format!("failed to decode token response: {e}"))
        })?;
        if token.access_token.is_empty() {
            return Err(EmailError::TokenExchange(
                "token endpoint returned empty access token".to_string(),
            ));
        }
        Ok(token.access_token)
    }
}

#[async_trait]
impl EmailSender for GraphEmailSender {
    fn name(&self) -> &'static str {
        "graph"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<Delivery, EmailError> {
        let token = self.access_token().await?;
        debug!(sender = %self.sender, "graph access token acquired");

        let payload = SendMail {
            message: Message {
                subject: &email.subject,
                body: ItemBody {
                    content_type: "Text",
                    content: &email.body,
                },
                to_recipients: [Recipient {
                    email_address: EmailAddress { address: &email.to },
                }],
            },
            save_to_sent_items: true,
        };
        let res = self
            .client
            .post(format!("{}/users/{}/sendMail", self.base_url, self.sender))
            .bearer_auth(token)
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
                .get("request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub;
    use axum::{http::StatusCode, response::IntoResponse, Json};
    use serde_json::json;

    fn sender(base_url: &str) -> GraphEmailSender {
        GraphEmailSender::new(
            reqwest::Client::new(),
            ClientCredentials {
                token_url: format!("{base_url}/tenant/oauth2/v2.0/token"),
                client_id: "client-id".to_string(),
                client_secret: SecretString::from("client-secret".to_string()),
            },
            format!("{base_url}/v1.0"),
            "support@contoso.com".to_string(),
        )
    }

    fn email() -> OutboundEmail {
        OutboundEmail {
            to: "jane@x.com".to_string(),
            subject: "Re: Refund".to_string(),
            body: "Hi Jane,".to_string(),
        }
    }

    #[tokio::test]
    async fn exchanges_credentials_then_sends_with_token() {
        let (base_url, log) = stub::spawn(|path| {
            if path.ends_with("/token") {
                Json(json!({
                    "token_type": "Bearer",
                    "expires_in": 3599,
                    "access_token": "graph-token"
                }))
                .into_response()
            } else {
                (StatusCode::ACCEPTED, [("request-id", "req-7")], "").into_response()
            }
        })
        .await;

        let delivery = sender(&base_url).send(&email()).await.unwrap();
        assert_eq!(delivery.status, 202);
        assert_eq!(delivery.message_id.as_deref(), Some("req-7"));

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);

        let token_call = &calls[0];
        assert_eq!(token_call.path, "/tenant/oauth2/v2.0/token");
        assert_eq!(
            token_call.content_type.as_deref(),
            Some("application/x-www-form-urlencoded")
        );
        assert!(token_call.body.contains("grant_type=client_credentials"));
        assert!(token_call.body.contains("client_id=client-id"));
        assert!(token_call.body.contains("client_secret=client-secret"));

        let send_call = &calls[1];
        assert_eq!(send_call.path, "/v1.0/users/support@contoso.com/sendMail");
        assert_eq!(send_call.authorization.as_deref(), Some("Bearer graph-token"));
        let body = send_call.json();
        assert_eq!(body["message"]["subject"], "Re: Refund");
        assert_eq!(body["message"]["body"]["contentType"], "Text");
        assert_eq!(
            body["message"]["toRecipients"][0]["emailAddress"]["address"],
            "jane@x.com"
        );
        assert_eq!(body["saveToSentItems"], true);
    }

    #[tokio::test]
    async fn failed_token_exchange_stops_before_sending() {
        let (base_url, log) = stub::spawn(|path| {
            if path.ends_with("/token") {
                (StatusCode::BAD_REQUEST, "invalid_client").into_response()
            } else {
                StatusCode::ACCEPTED.into_response()
            }
        })
        .await;

        let err = sender(&base_url).send(&email()).await.unwrap_err();
        match err {
            EmailError::TokenExchange(reason) => assert!(reason.contains("invalid_client")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
