//! Process configuration, read once at startup.
//!
//! Every value comes from a key lookup (the process environment in
//! production, a map in tests) and ends up in an immutable [`RelayConfig`]
//! that is handed to the pipeline explicitly.

use secrecy::SecretString;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_SIGNATURE: &str = "Best regards,\nCustomer Support Team";
const DEFAULT_GHL_BASE_URL: &str = "https://rest.gohighlevel.com/v1";
const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";
const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Who receives the generated reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMode {
    /// Quality-review mode: drafts go to a fixed internal distribution list.
    Review { recipients: Vec<String> },
    /// Drafts go straight back to the contact who wrote in.
    Direct,
}

/// Which instruction template the composer sends to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Tone, greeting and a mandatory signature are spelled out.
    Strict,
    /// One-line "reply professionally" instruction.
    Plain,
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(PromptStyle::Strict),
            "plain" => Ok(PromptStyle::Plain),
            other => Err(format!("expected `strict` or `plain`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub style: PromptStyle,
    pub signature: String,
}

/// Email backend selection plus its credentials.
#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    /// CRM email API authenticated with a static API key.
    Ghl {
        api_key: SecretString,
        base_url: String,
        sender: Option<String>,
    },
    SendGrid {
        api_key: SecretString,
        base_url: String,
        sender: String,
    },
    /// Microsoft Graph, authenticated through the OAuth client-credentials flow.
    Graph {
        client_id: String,
        client_secret: SecretString,
        token_url: String,
        base_url: String,
        sender: String,
    },
}

impl EmailProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            EmailProviderConfig::Ghl { .. } => "ghl",
            EmailProviderConfig::SendGrid { .. } => "sendgrid",
            EmailProviderConfig::Graph { .. } => "graph",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub completion: CompletionConfig,
    pub prompt: PromptConfig,
    pub mode: ReplyMode,
    pub email: EmailProviderConfig,
    /// Echo the full error source chain in 500 responses.
    pub expose_error_trace: bool,
}

impl RelayConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let completion = CompletionConfig {
            api_key: SecretString::from(env.required("OPENAI_API_KEY")?),
            base_url: trim_url(env.or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)),
            model: env.or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            temperature: env.parse_or("OPENAI_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_tokens: env.parse_or("OPENAI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
        };
        if !(0.0..=2.0).contains(&completion.temperature) {
            return Err(ConfigError::InvalidValue {
                key: "OPENAI_TEMPERATURE".to_string(),
                message: "must be between 0.0 and 2.0".to_string(),
            });
        }

        let prompt = PromptConfig {
            style: env.parse_or("PROMPT_STYLE", PromptStyle::Strict)?,
            signature: env.or("REPLY_SIGNATURE", DEFAULT_SIGNATURE).replace("\\n", "\n"),
        };

        let mode = match env.or("REPLY_MODE", "review").to_ascii_lowercase().as_str() {
            "review" => {
                let recipients = split_list(&env.required("REVIEW_RECIPIENTS")?);
                if recipients.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: "REVIEW_RECIPIENTS".to_string(),
                        message: "at least one address is required".to_string(),
                    });
                }
                ReplyMode::Review { recipients }
            }
            "direct" => ReplyMode::Direct,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "REPLY_MODE".to_string(),
                    message: format!("expected `review` or `direct`, got `{other}`"),
                })
            }
        };

        let email = match env.or("EMAIL_PROVIDER", "ghl").to_ascii_lowercase().as_str() {
            "ghl" => EmailProviderConfig::Ghl {
                api_key: SecretString::from(env.required("GHL_API_KEY")?),
                base_url: trim_url(env.or("GHL_BASE_URL", DEFAULT_GHL_BASE_URL)),
                sender: env.optional("SENDER_EMAIL"),
            },
            "sendgrid" => EmailProviderConfig::SendGrid {
                api_key: SecretString::from(env.required("SENDGRID_API_KEY")?),
                base_url: trim_url(env.or("SENDGRID_BASE_URL", DEFAULT_SENDGRID_BASE_URL)),
                sender: env.required("SENDER_EMAIL")?,
            },
            "graph" => {
                let token_url = match env.optional("GRAPH_TOKEN_URL") {
                    Some(url) => url,
                    None => format!(
                        "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
                        env.required("GRAPH_TENANT_ID")?
                    ),
                };
                EmailProviderConfig::Graph {
                    client_id: env.required("GRAPH_CLIENT_ID")?,
                    client_secret: SecretString::from(env.required("GRAPH_CLIENT_SECRET")?),
                    token_url,
                    base_url: trim_url(env.or("GRAPH_BASE_URL", DEFAULT_GRAPH_BASE_URL)),
                    sender: env.required("SENDER_EMAIL")?,
                }
            }
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "EMAIL_PROVIDER".to_string(),
                    message: format!("expected `ghl`, `sendgrid` or `graph`, got `{other}`"),
                })
            }
        };

        Ok(RelayConfig {
            port: env.parse_or("PORT", DEFAULT_PORT)?,
            completion,
            prompt,
            mode,
            email,
            expose_error_trace: env.parse_or("EXPOSE_ERROR_TRACE", false)?,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Comma-separated addresses, de-duplicated case-insensitively. The first
/// spelling of each address wins and order is kept.
fn split_list(raw: &str) -> Vec<String> {
    let mut list: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !list.iter().any(|seen| seen.eq_ignore_ascii_case(item)) {
            list.push(item.to_string());
        }
    }
    list
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
