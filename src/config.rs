use std::env;

/// Application-level constants
pub const APP_NAME: &str = "reparse";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info,axum=warn")
}

/// Runtime configuration, read once at startup and passed by value into the
/// components that need it. The core treats the model parameters as opaque:
/// they are forwarded to the completion call, never interpreted.
#[derive(Debug, Clone)]
pub struct ReparseConfig {
    /// Credential for the model path. Absent means every request goes
    /// straight to the pattern fallback.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub port: u16,
}

impl Default for ReparseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 2000,
            timeout_secs: 60,
            port: 3000,
        }
    }
}

impl ReparseConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(url) = env::var("REPARSE_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = env::var("REPARSE_MODEL") {
            config.model = model;
        }
        if let Some(temperature) = parse_var("REPARSE_TEMPERATURE") {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = parse_var("REPARSE_MAX_TOKENS") {
            config.max_tokens = max_tokens;
        }
        if let Some(timeout) = parse_var("REPARSE_TIMEOUT_SECS") {
            config.timeout_secs = timeout;
        }
        if let Some(port) = parse_var("PORT") {
            config.port = port;
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployment() {
        let config = ReparseConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn default_filter_names_the_crate() {
        assert!(default_log_filter().starts_with("reparse="));
    }
}
