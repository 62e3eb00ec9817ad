// src/config/mod.rs
// Process configuration, read once at startup and injected into the router state

use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::llm::DEFAULT_MODEL;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OFFICIAL_EMAIL: &str = "your_chitkara_email@chitkara.edu.in";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;

/// Parse an env var, falling back to `default` when unset or unparseable
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            // Tolerate trailing comments and whitespace from .env files
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!(key, value = clean_val, "Unparseable value, using default");
                    default
                }
            }
        }
        Err(_) => default,
    }
}

/// Read a single secret from environment, filtering empty values
fn read_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|k| !k.trim().is_empty())
}

/// Per-client request quota for /bfhl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl RateLimitConfig {
    /// Time to regain one request; None when the quota cannot be expressed
    /// (zero max, or a window too short to split across max requests)
    pub fn replenish_period(&self) -> Option<Duration> {
        if self.max_requests == 0 {
            return None;
        }
        Some(self.window / self.max_requests).filter(|period| !period.is_zero())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            max_requests: DEFAULT_RATE_LIMIT_MAX,
        }
    }
}

/// Settings for the AI operation
#[derive(Clone, Default)]
pub struct AiConfig {
    /// Gemini API key (GEMINI_API_KEY or GOOGLE_API_KEY); None disables the AI operation
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

// The key never reaches logs through Debug
impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Immutable service configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Operator identity returned in every success envelope
    pub official_email: String,
    pub ai: AiConfig,
    pub body_limit_bytes: usize,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            official_email: DEFAULT_OFFICIAL_EMAIL.to_string(),
            ai: AiConfig {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            },
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (single source of truth)
    pub fn from_env() -> Self {
        let ai = AiConfig {
            api_key: read_key("GEMINI_API_KEY").or_else(|| read_key("GOOGLE_API_KEY")),
            model: read_key("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(
                env_var_or("BFHL_AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS).max(1),
            ),
        };

        let mut rate_limit = RateLimitConfig {
            window: Duration::from_secs(env_var_or(
                "BFHL_RATE_LIMIT_WINDOW_SECS",
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )),
            max_requests: env_var_or("BFHL_RATE_LIMIT_MAX", DEFAULT_RATE_LIMIT_MAX),
        };
        if rate_limit.replenish_period().is_none() {
            warn!(
                window_secs = rate_limit.window.as_secs(),
                max_requests = rate_limit.max_requests,
                "Rate limit window must be positive and longer than 1ns per request, using defaults"
            );
            rate_limit = RateLimitConfig::default();
        }

        let config = Self {
            host: read_key("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: env_var_or("PORT", DEFAULT_PORT),
            official_email: read_key("OFFICIAL_EMAIL")
                .unwrap_or_else(|| DEFAULT_OFFICIAL_EMAIL.to_string()),
            ai,
            body_limit_bytes: env_var_or("BFHL_BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT_BYTES),
            rate_limit,
        };
        debug!(config = ?config, "Configuration loaded");
        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log which optional features are available (without exposing values)
    pub fn log_status(&self) {
        if self.ai.api_key.is_some() {
            info!(model = %self.ai.model, timeout_secs = self.ai.timeout.as_secs(), "AI operation enabled");
        } else {
            warn!("No GEMINI_API_KEY configured - AI requests will fail with 'AI service not configured'");
        }
        info!(
            max_requests = self.rate_limit.max_requests,
            window_secs = self.rate_limit.window.as_secs(),
            "Rate limit on /bfhl"
        );
    }
}
