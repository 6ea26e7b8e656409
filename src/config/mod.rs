//! Configuration module for the Callflow Gateway
//!
//! Configuration is read once at startup from the process environment (with
//! `.env` values loaded in `main` via `dotenvy` before this module runs) and
//! carried through the application as an immutable struct. Handlers never
//! read ambient environment state.
//!
//! Priority: actual ENV vars > .env values > defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port, TLS)
/// - Completion API settings (key, endpoint, model)
/// - Call routing (operator forward number, prompts)
/// - Admin surface (shared secret, artifact/backup/audit paths, deploy hook)
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Completion API settings
    /// Bearer token for the chat-completion API
    pub openai_api_key: Option<String>,
    /// Completion endpoint URL. Overridable so tests can point the gateway
    /// at a local mock server.
    pub completion_api_url: String,
    /// Model selector sent with every completion request
    pub completion_model: String,

    // Call routing
    /// Number the gateway dials when handing a caller to a human operator
    pub forward_number: String,
    /// Greeting spoken inside the entry-point speech gather
    pub greeting: String,
    /// System persona instruction sent ahead of the caller's text
    pub system_prompt: String,
    /// Optional TTS voice applied to spoken responses (provider voice id)
    pub say_voice: Option<String>,

    // Admin surface
    /// Shared secret for the `/dev/*` endpoints.
    /// Ships with an insecure default that must be overridden in production.
    pub dev_api_key: String,
    /// The versioned text artifact that update/rollback operate on
    pub artifact_path: PathBuf,
    /// Directory receiving timestamped artifact backups
    pub backup_dir: PathBuf,
    /// Append-only JSONL audit log of update/rollback actions
    pub audit_log_path: PathBuf,
    /// Substrings a generated patch must contain to be accepted
    pub update_required_markers: Vec<String>,
    /// Deploy hook fired after a successful update or rollback
    pub deploy_hook_url: Option<String>,

    // Outbound HTTP
    /// Timeout applied to completion and deploy-hook requests
    pub request_timeout_seconds: u64,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: u32,
}

/// Default shared secret, kept for parity with the original deployment.
/// Startup logs a warning when it is still in effect.
pub const INSECURE_DEFAULT_DEV_API_KEY: &str = "changeme";

/// Zeroize secret fields when the config is dropped so API keys do not
/// linger in freed memory.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
        self.dev_api_key.zeroize();
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("Invalid value for {name}: '{raw}'")),
        None => Ok(default),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// All settings have defaults except the completion API key, which stays
    /// `None` when unset (the conversational route then falls back to the
    /// operator transfer on every turn that would need the model).
    pub fn from_env() -> Result<Self, String> {
        let tls = match (env_opt("TLS_CERT_PATH"), env_opt("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                return Err("TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string());
            }
        };

        let update_required_markers = env_opt("UPDATE_REQUIRED_MARKERS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["express".to_string(), "app.listen".to_string()]);

        let config = Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000)?,
            tls,
            openai_api_key: env_opt("OPENAI_API_KEY"),
            completion_api_url: env_or(
                "COMPLETION_API_URL",
                "https://api.openai.com/v1/chat/completions",
            ),
            completion_model: env_or("COMPLETION_MODEL", "gpt-4"),
            forward_number: env_or("FORWARD_NUMBER", ""),
            greeting: env_or(
                "GREETING",
                "Thanks for calling Southern Garage Doors. How can I help you today?",
            ),
            system_prompt: env_or(
                "SYSTEM_PROMPT",
                "You are a helpful garage door assistant. Be professional, concise, and helpful.",
            ),
            say_voice: env_opt("SAY_VOICE"),
            dev_api_key: env_or("DEV_API_KEY", INSECURE_DEFAULT_DEV_API_KEY),
            artifact_path: PathBuf::from(env_or("ARTIFACT_PATH", "artifact/index.js")),
            backup_dir: PathBuf::from(env_or("BACKUP_DIR", "backups")),
            audit_log_path: PathBuf::from(env_or("AUDIT_LOG_PATH", "logs/update-log.jsonl")),
            update_required_markers,
            deploy_hook_url: env_opt("DEPLOY_HOOK_URL"),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS", 30)?,
            cors_allowed_origins: env_opt("CORS_ALLOWED_ORIGINS"),
            rate_limit_requests_per_second: env_parse("RATE_LIMIT_REQUESTS_PER_SECOND", 60)?,
            rate_limit_burst_size: env_parse("RATE_LIMIT_BURST_SIZE", 10)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }
        if self.request_timeout_seconds == 0 {
            return Err("REQUEST_TIMEOUT_SECONDS must be non-zero".to_string());
        }
        if self.completion_api_url.trim().is_empty() {
            return Err("COMPLETION_API_URL must not be empty".to_string());
        }
        if self.dev_api_key.trim().is_empty() {
            return Err("DEV_API_KEY must not be empty".to_string());
        }
        Ok(())
    }

    /// Get the server address as a string in "host:port" format
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Check whether the admin secret is still the shipped default
    pub fn has_insecure_dev_api_key(&self) -> bool {
        self.dev_api_key == INSECURE_DEFAULT_DEV_API_KEY
    }

    /// Timeout for outbound HTTP calls as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            tls: None,
            openai_api_key: Some("test-key".to_string()),
            completion_api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            completion_model: "gpt-4".to_string(),
            forward_number: "+15555550100".to_string(),
            greeting: "Thanks for calling. How can I help?".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            say_voice: None,
            dev_api_key: "secret".to_string(),
            artifact_path: PathBuf::from("artifact/index.js"),
            backup_dir: PathBuf::from("backups"),
            audit_log_path: PathBuf::from("logs/update-log.jsonl"),
            update_required_markers: vec!["express".to_string(), "app.listen".to_string()],
            deploy_hook_url: None,
            request_timeout_seconds: 5,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 100000,
            rate_limit_burst_size: 100,
        }
    }

    #[test]
    fn test_address_format() {
        let config = test_config();
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_tls_disabled_by_default() {
        assert!(!test_config().is_tls_enabled());
    }

    #[test]
    fn test_insecure_default_detection() {
        let mut config = test_config();
        assert!(!config.has_insecure_dev_api_key());
        config.dev_api_key = INSECURE_DEFAULT_DEV_API_KEY.to_string();
        assert!(config.has_insecure_dev_api_key());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = test_config();
        config.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_dev_key() {
        let mut config = test_config();
        config.dev_api_key = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
