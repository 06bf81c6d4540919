use rand::distr::{Alphanumeric, SampleString};
use tower_sessions::Session;

use crate::constants::TOKEN_LENGTH;
use crate::error::LogoError;

const CSRF_TOKEN_KEY: &str = "csrf_token";

pub(crate) fn generate_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), TOKEN_LENGTH)
}

pub(crate) async fn csrf_token(session: &Session) -> Result<String, LogoError> {
    let existing = session.get::<String>(CSRF_TOKEN_KEY).await?;
    let token = existing.unwrap_or_else(generate_token);
    session.insert(CSRF_TOKEN_KEY, token.clone()).await?;
    Ok(token)
}

pub(crate) async fn validate_csrf(session: &Session, token: &str) -> Result<(), LogoError> {
    let stored = session.get::<String>(CSRF_TOKEN_KEY).await?;
    match stored {
        Some(expected) if expected == token => Ok(()),
        _ => Err(LogoError::Unauthorized),
    }
}
