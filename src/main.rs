use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use logogen::config::{AppConfig, setup_logging};
use logogen::error::LogoError;
use logogen::generator::ImagenClient;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = logogen::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return ExitCode::FAILURE;
    }

    let config = match AppConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            if let LogoError::Configuration(message) = &err {
                eprintln!("{}", message);
            }
            return ExitCode::FAILURE;
        }
    };

    let generator = Arc::new(ImagenClient::new(
        config.api_key,
        config.model,
        config.api_base,
    ));

    if let Err(err) =
        logogen::web::setup_server(&config.listen_address, config.port, generator).await
    {
        error!("Application error: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
