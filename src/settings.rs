use crate::llm::GenerationConfig;
use std::fmt;
use std::str::FromStr;

/// Models offered to the user, per provider.
pub const GEMINI_MODELS: &[&str] = &["models/gemini-2.5-flash", "models/gemini-flash-latest"];
pub const OPENAI_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o", "gpt-4.1"];

pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;

pub const MIN_OUTPUT_TOKENS: u32 = 50;
pub const MAX_OUTPUT_TOKENS: u32 = 2000;

/// Which hosted service answers questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn models(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Gemini => GEMINI_MODELS,
            ProviderKind::OpenAi => OPENAI_MODELS,
        }
    }

    pub fn default_model(&self) -> &'static str {
        self.models()[0]
    }

    /// Environment variables searched for the credential, in order.
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            ProviderKind::OpenAi => &["OPENAI_API_KEY"],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(SettingsError::UnknownProvider(other.to_string())),
        }
    }
}

/// First non-blank value among `vars`.
fn first_key(vars: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<ApiKey> {
    vars.iter()
        .find_map(|var| lookup(var).filter(|k| !k.trim().is_empty()))
        .map(|k| ApiKey::new(k.trim()))
}

/// A secret credential. Formatting never reveals the full value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        ApiKey(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mask API keys for display
    pub fn masked(&self) -> String {
        let value = &self.0;
        if value.chars().count() > 8 {
            let head: String = value.chars().take(4).collect();
            let tail: String = value
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("{head}...{tail}")
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("unknown model for {provider}: {model} (expected one of {list})", list = .provider.models().join(", "))]
    UnknownModel { provider: ProviderKind, model: String },
    #[error("unknown provider: {0} (expected gemini or openai)")]
    UnknownProvider(String),
    #[error("temperature must be between 0.0 and 1.0, got {0}")]
    Temperature(f32),
    #[error("max tokens must be between {min} and {max}, got {0}", min = MIN_OUTPUT_TOKENS, max = MAX_OUTPUT_TOKENS)]
    MaxTokens(u32),
}

/// Session-scoped configuration. Nothing here is written to disk.
#[derive(Debug, Clone)]
pub struct Settings {
    provider: ProviderKind,
    api_key: Option<ApiKey>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            base_url: None,
        }
    }
}

impl Settings {
    /// Defaults, with the API key taken from the environment when present.
    pub fn from_env() -> Self {
        Self::from_env_for(ProviderKind::Gemini)
    }

    /// Defaults for `provider`, keyed from that provider's environment variables.
    pub fn from_env_for(provider: ProviderKind) -> Self {
        let mut settings = Self::default();
        settings.set_provider(provider);
        settings.api_key = first_key(provider.api_key_env_vars(), |var| std::env::var(var).ok());
        settings
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Switching provider resets the model to that provider's default.
    pub fn set_provider(&mut self, provider: ProviderKind) {
        if provider != self.provider {
            self.provider = provider;
            self.model = provider.default_model().to_string();
        }
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// Blank keys count as no key.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(ApiKey::new(key.trim()))
        };
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: &str) -> Result<(), SettingsError> {
        if !self.provider.models().contains(&model) {
            return Err(SettingsError::UnknownModel {
                provider: self.provider,
                model: model.to_string(),
            });
        }
        self.model = model.to_string();
        Ok(())
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(SettingsError::Temperature(temperature));
        }
        self.temperature = temperature;
        Ok(())
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn set_max_output_tokens(&mut self, tokens: u32) -> Result<(), SettingsError> {
        if !(MIN_OUTPUT_TOKENS..=MAX_OUTPUT_TOKENS).contains(&tokens) {
            return Err(SettingsError::MaxTokens(tokens));
        }
        self.max_output_tokens = tokens;
        Ok(())
    }

    /// Override the generation endpoint (proxies, local mocks).
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn set_base_url(&mut self, url: Option<String>) {
        self.base_url = url;
    }

    /// Snapshot of the per-request sampling parameters.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model(), "models/gemini-2.5-flash");
        assert_eq!(settings.temperature(), 0.7);
        assert_eq!(settings.max_output_tokens(), 500);
        assert!(settings.api_key().is_none());
    }

    #[test]
    fn test_model_allow_list() {
        let mut settings = Settings::default();
        settings.set_model("models/gemini-flash-latest").unwrap();
        assert_eq!(settings.model(), "models/gemini-flash-latest");
        let err = settings.set_model("gpt-4o").unwrap_err();
        assert_eq!(
            err,
            SettingsError::UnknownModel {
                provider: ProviderKind::Gemini,
                model: "gpt-4o".into()
            }
        );
        assert_eq!(settings.model(), "models/gemini-flash-latest");
    }

    #[test]
    fn test_switching_provider_resets_model() {
        let mut settings = Settings::default();
        settings.set_provider(ProviderKind::OpenAi);
        assert_eq!(settings.provider(), ProviderKind::OpenAi);
        assert_eq!(settings.model(), "gpt-4o-mini");
        settings.set_model("gpt-4o").unwrap();
        assert!(settings.set_model("models/gemini-2.5-flash").is_err());

        settings.set_provider(ProviderKind::OpenAi);
        assert_eq!(settings.model(), "gpt-4o");
        settings.set_provider(ProviderKind::Gemini);
        assert_eq!(settings.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<ProviderKind>(), Ok(ProviderKind::Gemini));
        assert_eq!(" openai ".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!(
            "claude".parse::<ProviderKind>(),
            Err(SettingsError::UnknownProvider("claude".into()))
        );
    }

    #[test]
    fn test_blank_env_key_falls_through() {
        let env = |var: &str| match var {
            "GEMINI_API_KEY" => Some("  ".to_string()),
            "GOOGLE_API_KEY" => Some("google-key".to_string()),
            _ => None,
        };
        let key = first_key(ProviderKind::Gemini.api_key_env_vars(), env);
        assert_eq!(key.as_ref().map(ApiKey::expose), Some("google-key"));

        let key = first_key(ProviderKind::OpenAi.api_key_env_vars(), env);
        assert!(key.is_none());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut settings = Settings::default();
        assert!(settings.set_temperature(0.0).is_ok());
        assert!(settings.set_temperature(1.0).is_ok());
        assert!(settings.set_temperature(1.1).is_err());
        assert!(settings.set_temperature(-0.1).is_err());
        assert!(settings.set_temperature(f32::NAN).is_err());
        assert_eq!(settings.temperature(), 1.0);
    }

    #[test]
    fn test_max_tokens_bounds() {
        let mut settings = Settings::default();
        assert!(settings.set_max_output_tokens(50).is_ok());
        assert!(settings.set_max_output_tokens(2000).is_ok());
        assert_eq!(
            settings.set_max_output_tokens(49),
            Err(SettingsError::MaxTokens(49))
        );
        assert!(settings.set_max_output_tokens(2001).is_err());
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let mut settings = Settings::default();
        settings.set_api_key("   ");
        assert!(settings.api_key().is_none());
        settings.set_api_key(" abc ");
        assert_eq!(settings.api_key().map(ApiKey::expose), Some("abc"));
    }

    #[test]
    fn test_api_key_never_printed() {
        let key = ApiKey::new("AIzaSyD-very-secret-value");
        assert_eq!(key.masked(), "AIza...alue");
        assert_eq!(key.to_string(), "AIza...alue");
        assert!(!format!("{key:?}").contains("very-secret"));

        let mut settings = Settings::default();
        settings.set_api_key("AIzaSyD-very-secret-value");
        assert!(!format!("{settings:?}").contains("very-secret"));

        assert_eq!(ApiKey::new("short").masked(), "****");
    }

    #[test]
    fn test_generation_config_snapshot() {
        let mut settings = Settings::default();
        settings.set_temperature(0.2).unwrap();
        settings.set_max_output_tokens(1000).unwrap();
        let config = settings.generation_config();
        assert_eq!(
            config,
            GenerationConfig {
                model: DEFAULT_MODEL.into(),
                temperature: 0.2,
                max_output_tokens: 1000,
            }
        );
    }
}
