//! Model provider construction.

use std::time::Duration;

use agent_platform_openai_model::{
    Error as ProviderError, OpenAIConfig, OpenAIConfigBuilder, OpenAIProvider,
};

use crate::config::Config;
use crate::secrets::{Error as SecretsError, Secrets};

/// Name of the secret holding the API key of the LLM endpoint.
pub const API_KEY_SECRET: &str = "LITELLM_TOKEN";

/// How long a single model request may take before it fails as
/// unavailable and becomes eligible for a retry.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors that can occur while creating the model provider.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API key is missing.
    #[error(transparent)]
    Secrets(#[from] SecretsError),
    /// The HTTP client could not be created.
    #[error("failed to create model provider: {0}")]
    Provider(#[from] ProviderError),
}

/// Creates the provider configuration from the service configuration.
pub fn provider_config(
    config: &Config,
    secrets: &Secrets,
) -> Result<OpenAIConfig, SecretsError> {
    let api_key = secrets.get_value(API_KEY_SECRET, None)?;
    Ok(OpenAIConfigBuilder::with_api_key(api_key)
        .with_base_url(&config.urls.llm)
        .with_model(&config.model.name)
        .with_max_tokens(config.model.max_tokens)
        .with_extra_body("ttl", config.model.timeout)
        .with_timeout(REQUEST_TIMEOUT)
        .build())
}

/// Creates the model provider used by the agent.
pub fn create_provider(
    config: &Config,
    secrets: &Secrets,
) -> Result<OpenAIProvider, Error> {
    let provider_config = provider_config(config, secrets)?;
    info!(
        "using model {} at {}",
        provider_config.model(),
        provider_config.base_url()
    );
    Ok(OpenAIProvider::new(provider_config)?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SAMPLE: &str = r#"
model: { max_tokens: 512, name: local-model, timeout: 60 }
server: { host: localhost, port: 8000, threads: 2 }
urls: { llm: "http://localhost:4000/", tokens: "http://localhost:4000/tokens" }
secrets: { path: /unused }
"#;

    #[test]
    fn test_provider_config() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("litellm-token"), "sk-test").unwrap();
        let secrets = Secrets::load(dir.path()).unwrap();

        let provider_config = provider_config(&config, &secrets).unwrap();
        assert_eq!(provider_config.model(), "local-model");
        assert_eq!(provider_config.base_url(), "http://localhost:4000");
        assert_eq!(provider_config.timeout(), Some(REQUEST_TIMEOUT));
        assert!(!format!("{provider_config:?}").contains("sk-test"));
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        let err = create_provider(&config, &Secrets::default()).unwrap_err();
        assert_eq!(err.to_string(), "secret key LITELLM_TOKEN not found");
    }
}
