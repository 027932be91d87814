//! Question generation backends.
//!
//! Providers return free text in the shared bank format (see
//! [`crate::bank`]); the caller parses it with the same grammar used for
//! uploads.

mod ollama;
mod openai;

use std::time::Duration;

use async_trait::async_trait;

use crate::bank::QUESTION_DELIMITER;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid configuration: {0}")]
    ConfigError(String),

    #[error("response parsing failed: {0}")]
    ParseError(String),
}

/// How many questions the generation prompt asks for.
pub const GENERATED_QUESTION_COUNT: usize = 10;

/// Fixed prompt template. The format section mirrors the bank grammar so
/// the response can be parsed verbatim.
pub fn generation_prompt(subject: &str) -> String {
    format!(
        "Create {GENERATED_QUESTION_COUNT} short quiz questions about \"{subject}\".\n\
         Use exactly this format:\n\
         {QUESTION_DELIMITER} [text]\n\
         1) [option 1]\n\
         2) [option 2]\n\
         3) [option 3]\n\
         4) [option 4]\n\
         Answer: [number of the correct option]"
    )
}

/// Request to generate a question bank
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Quiz subject, interpolated into the prompt template
    pub subject: String,
    /// Maximum response length in tokens (provider-dependent)
    pub max_tokens: Option<u32>,
    /// Timeout for the request
    pub timeout: Duration,
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// The generated text, expected to follow the bank grammar
    pub text: String,
    /// Provider-specific metadata (model used, latency)
    pub metadata: ResponseMetadata,
}

/// Metadata about the LLM response
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// Name of the provider (e.g., "openai", "ollama")
    pub provider: String,
    /// Model name used
    pub model: String,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all generation providers must implement
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate question-bank text for the given request
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Ordered provider chain; generation tries each in turn until one succeeds.
pub struct LlmManager {
    providers: Vec<Box<dyn LlmProvider>>,
    default_timeout: Duration,
    default_max_tokens: u32,
}

impl LlmManager {
    pub fn new(
        providers: Vec<Box<dyn LlmProvider>>,
        default_timeout: Duration,
        default_max_tokens: u32,
    ) -> Self {
        Self {
            providers,
            default_timeout,
            default_max_tokens,
        }
    }

    /// Generate question-bank text for a subject. Providers are tried in
    /// configuration order; the first success wins and later providers are
    /// not contacted. Returns the last error if every provider fails.
    pub async fn generate_questions(&self, subject: &str) -> LlmResult<GenerateResponse> {
        let mut last_error = LlmError::ConfigError("no providers configured".to_string());

        for provider in &self.providers {
            let request = GenerateRequest {
                subject: subject.to_string(),
                max_tokens: Some(self.default_max_tokens),
                timeout: self.default_timeout,
            };

            match provider.generate(request).await {
                Ok(response) => {
                    tracing::info!(
                        provider = provider.name(),
                        model = %response.metadata.model,
                        latency_ms = response.metadata.latency_ms,
                        "generation succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "provider failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

/// Configuration for the generation providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// OpenAI model to use
    pub openai_model: String,
    /// Ollama base URL
    pub ollama_base_url: Option<String>,
    /// Ollama model to use
    pub ollama_model: String,
    /// Default timeout for generation requests
    pub default_timeout: Duration,
    /// Default max tokens for responses
    pub default_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            ollama_base_url: None,
            ollama_model: "llama3.2".to_string(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 2000,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok().and_then(|key| {
            let trimmed = key.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let openai_model = std::env::var("OPENAI_MODEL")
            .ok()
            .and_then(|model| {
                let trimmed = model.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        let ollama_base_url = std::env::var("OLLAMA_BASE_URL").ok().and_then(|url| {
            let trimmed = url.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let ollama_model = std::env::var("OLLAMA_MODEL")
            .ok()
            .and_then(|model| {
                let trimmed = model.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "llama3.2".to_string());

        Self {
            openai_api_key,
            openai_model,
            ollama_base_url,
            ollama_model,
            default_timeout: std::env::var("LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(30)),
            default_max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2000),
        }
    }

    /// Build an LlmManager with all configured providers. OpenAI is tried
    /// before Ollama when both are configured.
    pub fn build_manager(&self) -> LlmResult<LlmManager> {
        let mut providers: Vec<Box<dyn LlmProvider>> = Vec::new();

        if let Some(api_key) = &self.openai_api_key {
            providers.push(Box::new(OpenAiProvider::new(
                api_key.clone(),
                self.openai_model.clone(),
            )));
        }

        if let Some(base_url) = &self.ollama_base_url {
            providers.push(Box::new(OllamaProvider::new(
                base_url.clone(),
                self.ollama_model.clone(),
            )));
        }

        if providers.is_empty() {
            return Err(LlmError::ConfigError(
                "no generation backend configured; set OPENAI_API_KEY or OLLAMA_BASE_URL"
                    .to_string(),
            ));
        }

        Ok(LlmManager::new(
            providers,
            self.default_timeout,
            self.default_max_tokens,
        ))
    }
}
