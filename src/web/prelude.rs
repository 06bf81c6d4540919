pub(crate) use super::AppState;
pub(crate) use super::csrf::{csrf_token, validate_csrf};
pub(crate) use super::flash;
pub(crate) use crate::error::LogoError;
pub(crate) use askama::Template;
pub(crate) use askama_web::WebTemplate;
pub(crate) use axum::extract::{Form, Path, State};
pub(crate) use axum::http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
pub(crate) use axum::response::{Redirect, Response};
pub(crate) use serde::Deserialize;
pub(crate) use tower_sessions::Session;
pub(crate) use tracing::{debug, error, info};
