use super::{types::Config, ConfigError, LlmProvider};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Queue timing values are sane
/// - Backend-specific sections exist for the selected LLM provider
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Queue validation
    if config.queue.visibility_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "queue.visibility_timeout_secs cannot be 0".to_string(),
        ));
    }

    // Translator validation
    if let Some(ref translator) = config.translator {
        if translator.max_chunk_chars == 0 {
            return Err(ConfigError::ValidationError(
                "translator.max_chunk_chars cannot be 0".to_string(),
            ));
        }
        if translator.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "translator.url cannot be empty".to_string(),
            ));
        }
    }

    // Generator validation
    if let Some(ref generator) = config.generator {
        match generator.provider {
            LlmProvider::Anthropic => {
                if generator.anthropic.is_none() {
                    return Err(ConfigError::ValidationError(
                        "generator.provider is \"anthropic\" but [generator.anthropic] is missing"
                            .to_string(),
                    ));
                }
            }
            LlmProvider::Ollama => {
                if generator.ollama.is_none() {
                    return Err(ConfigError::ValidationError(
                        "generator.provider is \"ollama\" but [generator.ollama] is missing"
                            .to_string(),
                    ));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorConfig, ServerConfig, TranslatorConfig};
    use std::net::IpAddr;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Config::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_chunk_size_fails() {
        let config = Config {
            translator: Some(TranslatorConfig {
                url: "http://localhost:5000".to_string(),
                api_key: None,
                max_chunk_chars: 0,
                timeout_secs: 30,
            }),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_provider_without_section_fails() {
        let config = Config {
            generator: Some(GeneratorConfig {
                provider: LlmProvider::Anthropic,
                anthropic: None,
                ollama: None,
            }),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
