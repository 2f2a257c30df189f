pub mod claude;
pub mod mistral;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use studybot_core::config::LlmConfig;
use tracing::info;

use crate::provider::LlmProvider;

/// The fixed set of backends the gateway can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Mistral,
    Claude,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Mistral, ProviderKind::Claude];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Mistral => "mistral",
            ProviderKind::Claude => "claude",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mistral" => Ok(ProviderKind::Mistral),
            "claude" => Ok(ProviderKind::Claude),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Errors raised before any request leaves the process.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported LLM provider: '{0}'")]
    UnknownProvider(String),
    #[error("provider '{provider}' is not configured: {var} not set")]
    MissingCredential {
        provider: ProviderKind,
        var: &'static str,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Build every provider the configuration has credentials for.
///
/// Providers share one client with a fixed request timeout. Claude is skipped
/// when `ANTHROPIC_API_KEY` is unset; routing to it later reports
/// [`ConfigError::MissingCredential`].
pub fn create_providers(
    config: &LlmConfig,
) -> Result<HashMap<ProviderKind, Arc<dyn LlmProvider>>, ConfigError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let mut providers: HashMap<ProviderKind, Arc<dyn LlmProvider>> = HashMap::new();
    providers.insert(
        ProviderKind::Mistral,
        Arc::new(mistral::MistralProvider::new(
            client.clone(),
            config.mistral_url.clone(),
            config.mistral_model.clone(),
        )),
    );

    match &config.anthropic_api_key {
        Some(api_key) => {
            providers.insert(
                ProviderKind::Claude,
                Arc::new(claude::ClaudeProvider::new(
                    client,
                    api_key.clone(),
                    config.anthropic_model.clone(),
                )),
            );
        }
        None => info!("ANTHROPIC_API_KEY not set, claude provider disabled"),
    }

    Ok(providers)
}

/// Credential variable a provider needs, if any.
pub(crate) fn credential_var(kind: ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::Mistral => None,
        ProviderKind::Claude => Some("ANTHROPIC_API_KEY"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_are_case_insensitive() {
        assert_eq!("Mistral".parse::<ProviderKind>().unwrap(), ProviderKind::Mistral);
        assert_eq!("CLAUDE".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
        assert_eq!(" claude ".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = "gpt-4".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(ref name) if name == "gpt-4"));
    }

    #[test]
    fn claude_needs_a_key() {
        let providers = create_providers(&LlmConfig::default()).unwrap();
        assert!(providers.contains_key(&ProviderKind::Mistral));
        assert!(!providers.contains_key(&ProviderKind::Claude));

        let config = LlmConfig {
            anthropic_api_key: Some("sk-test".into()),
            ..LlmConfig::default()
        };
        let providers = create_providers(&config).unwrap();
        assert!(providers.contains_key(&ProviderKind::Claude));
    }
}
