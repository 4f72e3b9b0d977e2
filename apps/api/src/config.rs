use anyhow::{Context, Result};

/// Default prompt template for the diagnosis flow, used when no
/// DIAGNOSIS_PROMPT override is configured.
pub const DEFAULT_DIAGNOSIS_PROMPT: &str =
    "You are assisting an occupational health service. Review the employee's \
     reported symptoms together with their profile and produce a preliminary \
     diagnosis with treatment guidance.";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing — the OpenAI credentials
/// are resolved here once and injected into the LLM client, never fetched
/// ad hoc at call time.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub diagnosis_prompt: String,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| crate::llm_client::OPENAI_API_URL.to_string()),
            diagnosis_prompt: std::env::var("DIAGNOSIS_PROMPT")
                .unwrap_or_else(|_| DEFAULT_DIAGNOSIS_PROMPT.to_string()),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Config {
    /// Default tracing directive when RUST_LOG is unset. Tracing targets use
    /// the crate's module path, so the hyphenated package name must be
    /// underscored or the directive never matches and nothing is logged.
    pub fn log_directive(&self) -> String {
        format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            self.rust_log
        )
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
