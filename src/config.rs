//! Configuration management for MathsGPT.
//!
//! Configuration can be set via environment variables:
//! - `GROQ_API_KEY` - Optional. Server-side default credential. Sessions may supply their own.
//! - `GROQ_BASE_URL` - Optional. OpenAI-compatible endpoint.
//!   Defaults to `https://api.groq.com/openai/v1`.
//! - `DEFAULT_MODEL` - Optional. The LLM model to use. Defaults to `llama-3.1-8b-instant`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `15`.
//! - `MAX_PARSE_RETRIES` - Optional. Malformed outputs tolerated per question. Defaults to `3`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. Timeout for every outbound HTTP call. Defaults to `60`.
//! - `SESSION_IDLE_SECS` - Optional. Idle sessions older than this are dropped. Defaults to `3600`.
//! - `WIKIPEDIA_LANG` - Optional. Wikipedia language edition. Defaults to `en`.
//! - `WIKIPEDIA_API_URL` - Optional. MediaWiki action API endpoint. Overrides `WIKIPEDIA_LANG`.
//! - `WIKIPEDIA_TOP_K` - Optional. Pages summarized per lookup. Defaults to `3`.
//! - `WIKIPEDIA_MAX_CHARS` - Optional. Maximum lookup result length. Defaults to `4000`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Shown to the user whenever no credential is available for a session.
pub const MISSING_KEY_PROMPT: &str = "Please provide your Groq API key to continue.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please provide your Groq API key to continue.")]
    MissingCredential,

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Wikipedia lookup configuration.
#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// Language edition, e.g. `en` for en.wikipedia.org
    pub lang: String,

    /// Number of search hits to summarize
    pub top_k: usize,

    /// Maximum characters returned from one lookup
    pub max_chars: usize,

    /// Explicit MediaWiki endpoint; when set, `lang` is ignored
    pub endpoint: Option<String>,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            top_k: 3,
            max_chars: 4000,
            endpoint: None,
        }
    }
}

impl WikipediaConfig {
    /// MediaWiki action API endpoint: the explicit override, or the
    /// configured language edition.
    pub fn api_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.wikipedia.org/w/api.php", self.lang),
        }
    }
}

/// Agent loop limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentLimits {
    /// Hard ceiling on loop iterations (tool calls plus parse retries)
    pub max_iterations: usize,

    /// Malformed outputs tolerated before giving up
    pub max_parse_retries: usize,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            max_parse_retries: 3,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server-side Groq API key, used when a session brings none
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible chat completions API
    pub base_url: String,

    /// Default LLM model identifier
    pub default_model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Agent loop limits
    pub agent: AgentLimits,

    /// Timeout applied to every collaborator request
    pub request_timeout: Duration,

    /// Sessions untouched for this long are evicted
    pub session_idle_timeout: Duration,

    /// Wikipedia lookup configuration
    pub wikipedia: WikipediaConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric or URL variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let base_url = std::env::var("GROQ_BASE_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidValue("GROQ_BASE_URL".to_string(), e.to_string()))?;

        let default_model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_parse("PORT", 3000)?;

        let defaults = AgentLimits::default();
        let agent = AgentLimits {
            max_iterations: env_parse("MAX_ITERATIONS", defaults.max_iterations)?,
            max_parse_retries: env_parse("MAX_PARSE_RETRIES", defaults.max_parse_retries)?,
        };
        if agent.max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let request_timeout = Duration::from_secs(env_parse("REQUEST_TIMEOUT_SECS", 60)?);
        let session_idle_timeout = Duration::from_secs(env_parse("SESSION_IDLE_SECS", 3600)?);

        let endpoint = std::env::var("WIKIPEDIA_API_URL")
            .ok()
            .filter(|u| !u.trim().is_empty());
        if let Some(endpoint) = &endpoint {
            url::Url::parse(endpoint).map_err(|e| {
                ConfigError::InvalidValue("WIKIPEDIA_API_URL".to_string(), e.to_string())
            })?;
        }

        let wiki_defaults = WikipediaConfig::default();
        let wikipedia = WikipediaConfig {
            lang: std::env::var("WIKIPEDIA_LANG").unwrap_or(wiki_defaults.lang),
            top_k: env_parse("WIKIPEDIA_TOP_K", wiki_defaults.top_k)?,
            max_chars: env_parse("WIKIPEDIA_MAX_CHARS", wiki_defaults.max_chars)?,
            endpoint,
        };

        Ok(Self {
            api_key,
            base_url,
            default_model,
            host,
            port,
            agent,
            request_timeout,
            session_idle_timeout,
            wikipedia,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: Option<String>, default_model: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            default_model,
            host: "127.0.0.1".to_string(),
            port: 3000,
            agent: AgentLimits::default(),
            request_timeout: Duration::from_secs(60),
            session_idle_timeout: Duration::from_secs(3600),
            wikipedia: WikipediaConfig::default(),
        }
    }

    /// Pick the credential for a new session: the caller's key if present,
    /// otherwise the server default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredential` when neither is available.
    pub fn resolve_api_key(&self, supplied: Option<&str>) -> Result<String, ConfigError> {
        supplied
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.api_key.clone())
            .ok_or(ConfigError::MissingCredential)
    }
}

fn env_parse<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
