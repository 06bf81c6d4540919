//! Config handling

use std::num::NonZeroU16;

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;
use crate::error::LogoError;

/// Shown when the API credential is missing; the server refuses to start.
pub const MISSING_API_KEY_NOTICE: &str =
    "API_KEY environment variable not set. Please set it to run the application.";

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Validated runtime configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address to bind
    pub listen_address: String,
    /// Port to bind
    pub port: NonZeroU16,
    /// Credential for the image-generation API
    pub api_key: String,
    /// Image model identifier
    pub model: String,
    /// Base URL of the image-generation API
    pub api_base: Url,
}

impl AppConfig {
    /// Checks the CLI options; a missing credential is a configuration error.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, LogoError> {
        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LogoError::Configuration(MISSING_API_KEY_NOTICE.to_string()))?;

        let model = cli.model.trim();
        if model.is_empty() {
            return Err(LogoError::Configuration("model must not be empty".into()));
        }

        let api_base = Url::parse(&cli.api_base).map_err(|err| {
            LogoError::Configuration(format!("invalid API base URL {:?}: {err}", cli.api_base))
        })?;

        Ok(Self {
            listen_address: cli.listen_address.clone(),
            port: cli.port,
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{DEFAULT_API_BASE, DEFAULT_MODEL};

    fn cli(api_key: Option<&str>) -> CliOptions {
        CliOptions {
            debug: false,
            port: NonZeroU16::new(9000).unwrap(),
            listen_address: "127.0.0.1".into(),
            api_key: api_key.map(str::to_string),
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
        }
    }

    #[test]
    fn missing_key_refuses_to_start() {
        for key in [None, Some(""), Some("   ")] {
            match AppConfig::from_cli(&cli(key)) {
                Err(LogoError::Configuration(message)) => {
                    assert_eq!(message, MISSING_API_KEY_NOTICE)
                }
                other => panic!("expected configuration error, got {other:?}"),
            }
        }
    }

    #[test]
    fn valid_options_produce_config() {
        let config = AppConfig::from_cli(&cli(Some(" abc123 "))).unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_base.host_str(), Some("generativelanguage.googleapis.com"));
    }

    #[test]
    fn bad_api_base_is_rejected() {
        let mut options = cli(Some("abc123"));
        options.api_base = "not a url".into();
        assert!(matches!(
            AppConfig::from_cli(&options),
            Err(LogoError::Configuration(_))
        ));
    }
}
