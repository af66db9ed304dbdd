use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{CompletionConfig, PromptConfig, PromptStyle};
use crate::models::email::ComposedReply;
use crate::providers::{ChatRequest, CompletionProvider};
use crate::services::error::CompletionError;
use crate::services::names::{derive_first_name, FIRST_NAME_PLACEHOLDER};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

/// Sampling and template settings, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct CompositionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub style: PromptStyle,
    pub signature: String,
}

impl CompositionSettings {
    pub fn from_config(completion: &CompletionConfig, prompt: &PromptConfig) -> Self {
        Self {
            model: completion.model.clone(),
            temperature: completion.temperature,
            max_tokens: completion.max_tokens,
            style: prompt.style,
            signature: prompt.signature.clone(),
        }
    }
}

/// Drafts replies through a [`CompletionProvider`].
#[derive(Clone)]
pub struct Composer {
    provider: Arc<dyn CompletionProvider>,
    settings: CompositionSettings,
}

pub fn greeting(first_name: &str) -> String {
    format!("Hi {first_name},")
}

impl Composer {
    pub fn new(provider: Arc<dyn CompletionProvider>, settings: CompositionSettings) -> Self {
        Self { provider, settings }
    }

    /// The user turn sent to the model.
    pub fn build_prompt(&self, message: &str, first_name: &str) -> String {
        let customer = if first_name == FIRST_NAME_PLACEHOLDER {
            "a customer".to_string()
        } else {
            format!("a customer named {first_name}")
        };
        match self.settings.style {
            PromptStyle::Plain => format!("Reply professionally to this email: {message}"),
            PromptStyle::Strict => format!(
                "You are writing a reply on behalf of our support team to {customer}.\n\
                 Write a warm, professional and concise reply to the message below.\n\
                 - Start with the greeting \"{greeting}\" on its own line.\n\
                 - Answer the customer's question directly. Do not invent order details, prices or dates.\n\
                 - Keep the tone friendly, calm and helpful.\n\
                 - End the reply with exactly this signature and nothing after it:\n\
                 {signature}\n\n\
                 Customer message:\n\
                 {message}",
                greeting = greeting(first_name),
                signature = self.settings.signature,
            ),
        }
    }

    /// Asks the model for a reply and applies the greeting and signature
    /// policy to whatever comes back.
    pub async fn compose(
        &self,
        message: &str,
        name: Option<&str>,
    ) -> Result<ComposedReply, CompletionError> {
        let first_name = derive_first_name(name);
        let request = ChatRequest {
            model: self.settings.model.clone(),
            system: SYSTEM_INSTRUCTION.to_string(),
            user: self.build_prompt(message, &first_name),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        debug!(prompt = %request.user, "composing reply");
        let generated = self.provider.complete(&request).await?.trim().to_string();
        if generated.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        info!(
            model = %self.settings.model,
            chars = generated.len(),
            "completion received"
        );

        let body = self.finalize(&generated, &first_name);
        Ok(ComposedReply {
            first_name,
            generated,
            body,
        })
    }

    /// Prepends the greeting unless the model already opened with it, and in
    /// strict mode appends the signature unless the model already wrote it.
    pub fn finalize(&self, generated: &str, first_name: &str) -> String {
        let greeting = greeting(first_name);
        let mut body = if starts_with_ignore_case(generated, &greeting) {
            generated.to_string()
        } else {
            format!("{greeting}\n\n{generated}")
        };

        if self.settings.style == PromptStyle::Strict
            && !body.contains(self.settings.signature.trim())
        {
            body.push_str("\n\n");
            body.push_str(self.settings.signature.trim());
        }
        body
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let count = prefix.chars().count();
    let head: String = text.chars().take(count).collect();
    head.to_lowercase() == prefix.to_lowercase()
}
