//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;

use crate::generator::{DEFAULT_API_BASE, DEFAULT_MODEL};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "LOGOGEN_DEBUG")]
    /// Enable debug logging. Env: LOGOGEN_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "LOGOGEN_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: LOGOGEN_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "LOGOGEN_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: LOGOGEN_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, env = "API_KEY", hide_env_values = true)]
    /// Image-generation API key, required.
    /// Env: API_KEY
    pub api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_MODEL, env = "LOGOGEN_MODEL")]
    /// Image model identifier.
    /// Env: LOGOGEN_MODEL
    pub model: String,

    #[clap(long, default_value = DEFAULT_API_BASE, env = "LOGOGEN_API_BASE")]
    /// Base URL of the image-generation API.
    /// Env: LOGOGEN_API_BASE
    pub api_base: String,
}
