//! Error handling

use axum::response::IntoResponse;
use tracing::{error, info};

use crate::generator::GeneratorError;

/// definitions for the logogen application.
#[derive(Debug)]
pub enum LogoError {
    /// Required configuration (the API credential) is missing or unusable
    Configuration(String),
    /// A required form field was left empty
    Validation(String),
    /// The image-generation call failed
    Generation(String),
    /// A generation request is already in flight for this workspace
    Busy,
    /// When you didn't do the right thing
    BadRequest,
    /// Missing or invalid session
    Unauthorized,
    /// When a requested resource is not found
    NotFound(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl std::fmt::Display for LogoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogoError::Configuration(message) => write!(f, "configuration error: {message}"),
            LogoError::Validation(message) => write!(f, "validation error: {message}"),
            LogoError::Generation(message) => write!(f, "generation failed: {message}"),
            LogoError::Busy => write!(f, "a generation request is already in progress"),
            LogoError::BadRequest => write!(f, "bad request"),
            LogoError::Unauthorized => write!(f, "unauthorized"),
            LogoError::NotFound(what) => write!(f, "not found: {what}"),
            LogoError::InternalServerError(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for LogoError {}

impl From<GeneratorError> for LogoError {
    fn from(err: GeneratorError) -> Self {
        LogoError::Generation(err.to_string())
    }
}

impl From<std::io::Error> for LogoError {
    fn from(err: std::io::Error) -> Self {
        LogoError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for LogoError {
    fn from(err: axum::http::Error) -> Self {
        LogoError::InternalServerError(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for LogoError {
    fn from(err: tower_sessions::session::Error) -> Self {
        LogoError::InternalServerError(err.to_string())
    }
}

fn plain_response(
    status: axum::http::StatusCode,
    body: &'static str,
) -> axum::response::Response {
    let mut response = axum::response::Response::new(axum::body::Body::from(body));
    *response.status_mut() = status;
    response
}

impl IntoResponse for LogoError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        match self {
            LogoError::Configuration(message) => {
                error!("Configuration error: {}", message);
                plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Server misconfigured")
            }
            LogoError::Validation(message) => {
                info!("Validation failed: {}", message);
                plain_response(StatusCode::BAD_REQUEST, "Please fill out the brand description.")
            }
            LogoError::Generation(message) => {
                error!("Error generating images: {}", message);
                plain_response(
                    StatusCode::BAD_GATEWAY,
                    "Sorry, we couldn't generate your logos. Please try again later.",
                )
            }
            LogoError::Busy => {
                info!("Generation already in progress");
                plain_response(StatusCode::CONFLICT, "Generation already in progress")
            }
            LogoError::BadRequest => {
                info!("Bad request received");
                plain_response(StatusCode::BAD_REQUEST, "Bad Request")
            }
            LogoError::Unauthorized => {
                info!("Unauthorized request received");
                plain_response(
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized: invalid or missing session.",
                )
            }
            LogoError::NotFound(what) => {
                tracing::error!("404 {what}");
                plain_response(StatusCode::NOT_FOUND, "Not Found")
            }
            LogoError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}
