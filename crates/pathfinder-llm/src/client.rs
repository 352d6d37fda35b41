//! OpenAI-compatible chat completions client

use crate::error::LlmError;
use crate::parse::parse_idea_list;
use crate::prompts::{self, Prompt};
use async_trait::async_trait;
use pathfinder_core::{
    GenerationError, GenerativeService, IdeasRequest, IdeasResponse, LlmConfig, PlanRequest,
    PlanResponse, ReportRequest, ReportResponse, SynthesisRequest, SynthesisResponse,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Response bodies are cut to this many characters in errors
const BODY_EXCERPT: usize = 200;

/// [`GenerativeService`] over any chat-completions endpoint
pub struct ChatCompletionsGenerator {
    client: Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl std::fmt::Debug for ChatCompletionsGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsGenerator")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsGenerator {
    /// Build a client; the API key is read from `config.api_key_env` if set
    ///
    /// # Errors
    /// [`LlmError::Setup`] if the HTTP client cannot be built
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; sending unauthenticated requests",
                config.api_key_env
            );
        }
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit key
    ///
    /// # Errors
    /// [`LlmError::Setup`] if the HTTP client cannot be built
    pub fn with_api_key(config: LlmConfig, api_key: Option<String>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn api_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let base = base.strip_suffix("/v1").unwrap_or(base);
        format!("{base}/v1/chat/completions")
    }

    /// Send one prompt and return the trimmed completion text
    ///
    /// # Errors
    /// Transport, status and body-shape failures as [`LlmError`]
    pub async fn complete(&self, prompt: Prompt) -> Result<String, LlmError> {
        let result = self.send(prompt).await;
        if let Err(err) = &result {
            log_failure(&self.config.model, err);
        }
        result
    }

    async fn send(&self, prompt: Prompt) -> Result<String, LlmError> {
        let url = self.api_url();
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user,
                },
            ],
            temperature: self.config.temperature,
        };

        tracing::debug!("Sending completion request to {} ({})", url, self.config.model);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::debug!("Completion response status: {}", status);
        check_status(status, &text)?;
        completion_text(&text)
    }
}

fn log_failure(model: &str, err: &LlmError) {
    if err.is_transient() {
        tracing::warn!("Completion from {} failed, worth retrying: {}", model, err);
    } else {
        tracing::error!("Completion from {} failed: {}", model, err);
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(BODY_EXCERPT).collect()
}

fn check_status(status: StatusCode, body: &str) -> Result<(), LlmError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED => Err(LlmError::AuthFailed),
        StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimited),
        s => Err(LlmError::Status {
            status: s.as_u16(),
            body: excerpt(body),
        }),
    }
}

fn completion_text(body: &str) -> Result<String, LlmError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        LlmError::InvalidResponse(format!("JSON parse error: {e}. Raw: {}", excerpt(body)))
    })?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    let content = content.trim();
    if content.is_empty() {
        return Err(LlmError::EmptyCompletion);
    }
    Ok(content.to_string())
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerativeService for ChatCompletionsGenerator {
    async fn report(&self, request: ReportRequest) -> Result<ReportResponse, GenerationError> {
        let report = self.complete(prompts::report(&request)).await?;
        Ok(ReportResponse { report })
    }

    async fn ideas(&self, request: IdeasRequest) -> Result<IdeasResponse, GenerationError> {
        let content = self.complete(prompts::ideas(&request)).await?;
        let ideas = parse_idea_list(&content).ok_or_else(|| {
            LlmError::InvalidResponse(format!("no idea list in completion: {}", excerpt(&content)))
        })?;
        Ok(IdeasResponse { ideas })
    }

    async fn synthesis(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, GenerationError> {
        let text = self.complete(prompts::synthesis(&request)).await?;
        Ok(SynthesisResponse { text })
    }

    async fn plan(&self, request: PlanRequest) -> Result<PlanResponse, GenerationError> {
        let plan = self.complete(prompts::plan(&request)).await?;
        Ok(PlanResponse { plan })
    }
}
