//! Configuration (layered: code > env > `.env` file > defaults).

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::Duration;

use tracing::warn;

use crate::models::GoogleModel;

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<GenbindConfig> = OnceLock::new();

/// Default bound on conversation rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 20;

#[derive(Debug, Clone, Default)]
struct Settings {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<GoogleModel>,
    max_rounds: Option<usize>,
    request_timeout: Option<Duration>,
}

/// Layered configuration for genbind.
///
/// Environment variables:
/// - `GEMINI_API_KEY` (falls back to `GOOGLE_API_KEY`)
/// - `GEMINI_BASE_URL`
/// - `GENBIND_MODEL`
/// - `GENBIND_MAX_ROUNDS`
/// - `GENBIND_REQUEST_TIMEOUT_SECS`
///
/// Values that fail to parse are ignored. Setters override whatever was
/// loaded.
#[derive(Clone, Default)]
pub struct GenbindConfig {
    settings: Arc<RwLock<Settings>>,
}

impl fmt::Debug for GenbindConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.read();
        f.debug_struct("GenbindConfig")
            .field("api_key", &settings.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &settings.base_url)
            .field("model", &settings.model)
            .field("max_rounds", &settings.max_rounds)
            .field("request_timeout", &settings.request_timeout)
            .finish()
    }
}

impl GenbindConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let settings = Settings {
            api_key: lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")),
            base_url: lookup("GEMINI_BASE_URL"),
            model: parse_var(&lookup, "GENBIND_MODEL"),
            max_rounds: parse_var(&lookup, "GENBIND_MAX_ROUNDS"),
            request_timeout: parse_var::<u64>(&lookup, "GENBIND_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs),
        };
        Self {
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static GenbindConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Settings> {
        self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Settings> {
        self.settings.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_api_key(&self, key: impl Into<String>) {
        self.write().api_key = Some(key.into());
    }

    pub fn api_key(&self) -> Option<String> {
        self.read().api_key.clone()
    }

    pub fn has_credentials(&self) -> bool {
        self.read().api_key.is_some()
    }

    pub fn set_base_url(&self, url: impl Into<String>) {
        self.write().base_url = Some(url.into());
    }

    pub fn base_url(&self) -> Option<String> {
        self.read().base_url.clone()
    }

    pub fn set_model(&self, model: GoogleModel) {
        self.write().model = Some(model);
    }

    /// Configured model, or the default Gemini model.
    pub fn model(&self) -> GoogleModel {
        self.read().model.clone().unwrap_or_default()
    }

    pub fn set_max_rounds(&self, max_rounds: usize) {
        self.write().max_rounds = Some(max_rounds);
    }

    /// Configured round limit, or [`DEFAULT_MAX_ROUNDS`].
    pub fn max_rounds(&self) -> usize {
        self.read().max_rounds.unwrap_or(DEFAULT_MAX_ROUNDS)
    }

    pub fn set_request_timeout(&self, timeout: Duration) {
        self.write().request_timeout = Some(timeout);
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.read().request_timeout
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_all_variables() {
        let config = GenbindConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_BASE_URL", "http://localhost:9999"),
            ("GENBIND_MODEL", "gemini-3-pro-preview"),
            ("GENBIND_MAX_ROUNDS", "5"),
            ("GENBIND_REQUEST_TIMEOUT_SECS", "30"),
        ]));

        assert_eq!(config.api_key().as_deref(), Some("key"));
        assert_eq!(config.base_url().as_deref(), Some("http://localhost:9999"));
        assert_eq!(config.model(), GoogleModel::Gemini3ProPreview);
        assert_eq!(config.max_rounds(), 5);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn google_api_key_is_a_fallback() {
        let config = GenbindConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "g")]));
        assert_eq!(config.api_key().as_deref(), Some("g"));

        let config = GenbindConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "g"),
            ("GEMINI_API_KEY", "gem"),
        ]));
        assert_eq!(config.api_key().as_deref(), Some("gem"));
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = GenbindConfig::from_lookup(lookup(&[
            ("GENBIND_MAX_ROUNDS", "lots"),
            ("GENBIND_REQUEST_TIMEOUT_SECS", "-1"),
        ]));

        assert_eq!(config.max_rounds(), DEFAULT_MAX_ROUNDS);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn setters_override_loaded_values() {
        let config = GenbindConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "env")]));
        config.set_api_key("explicit");
        config.set_max_rounds(3);

        assert_eq!(config.api_key().as_deref(), Some("explicit"));
        assert_eq!(config.max_rounds(), 3);
        assert!(config.has_credentials());
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = GenbindConfig::new();
        config.set_api_key("secret-value");

        assert!(!format!("{config:?}").contains("secret-value"));
    }
}
