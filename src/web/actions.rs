//! Form posts: palette clicks, generation, download gate, overlay dismissal.

use axum::http::header::CONTENT_DISPOSITION;

use super::prelude::*;
use super::workspace::FormDraft;
use crate::presenter::{Download, GateOutcome};

#[derive(Deserialize)]
pub(crate) struct CsrfForm {
    csrf_token: String,
}

#[derive(Deserialize)]
pub(crate) struct GenerateForm {
    csrf_token: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    industry: String,
    #[serde(default)]
    style: String,
}

#[derive(Deserialize)]
pub(crate) struct PaletteForm {
    csrf_token: String,
    palette: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    industry: String,
    #[serde(default)]
    style: String,
}

/// Stores the notice for a user-facing failure and sends the browser home.
async fn notice(session: &Session, err: LogoError) -> Result<Redirect, LogoError> {
    let flag = flash::flag_for(err)?;
    flash::set_flash(session, flag).await?;
    Ok(Redirect::to("/"))
}

pub(crate) async fn select_palette_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaletteForm>,
) -> Result<Redirect, LogoError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let workspace = state.workspaces.for_session(&session).await?;
    let mut workspace = workspace.lock().await;
    workspace.draft = FormDraft::new(&form.description, &form.industry, &form.style);
    workspace.palettes.select(&form.palette)?;
    debug!("Selected palette {}", form.palette);
    Ok(Redirect::to("/"))
}

pub(crate) async fn generate_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GenerateForm>,
) -> Result<Redirect, LogoError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let workspace = state.workspaces.for_session(&session).await?;

    let pending = {
        let mut workspace = workspace.lock().await;
        workspace.draft = FormDraft::new(&form.description, &form.industry, &form.style);
        let request = workspace.request();
        match workspace.orchestrator.begin(&request) {
            Ok(pending) => {
                workspace.start_generation();
                pending
            }
            Err(err) => {
                drop(workspace);
                return notice(&session, err).await;
            }
        }
    };

    // runs to completion even if the browser stops waiting; the workspace
    // lock is not held while the model works
    let task = tokio::spawn(async move {
        let (outcome, _in_flight) = pending.run_and_hold().await;
        let mut workspace = workspace.lock().await;
        match outcome {
            Ok(images) => {
                info!("Rendering {} logos", images.len());
                workspace.presenter.render(images);
            }
            Err(err) => match flash::flag_for(err) {
                Ok(flag) => workspace.notice = Some(flag),
                Err(err) => error!("Unexpected generation error: {}", err),
            },
        }
    });
    task.await
        .map_err(|err| LogoError::InternalServerError(err.to_string()))?;
    Ok(Redirect::to("/"))
}

fn attachment(download: Download) -> Result<Response, LogoError> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        download.filename
    ))
    .map_err(|err| LogoError::InternalServerError(err.to_string()))?;
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, download.content_type)
        .header(CONTENT_DISPOSITION, disposition)
        .body(axum::body::Body::from(download.bytes))
        .map_err(LogoError::from)
}

/// Runs a card's download gate. Both clicks land back on the page; the
/// second one leaves the file ready for [`download_file_handler`].
pub(crate) async fn download_handler(
    State(state): State<AppState>,
    session: Session,
    Path(position): Path<usize>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, LogoError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let workspace = state.workspaces.for_session(&session).await?;
    let mut workspace = workspace.lock().await;

    match workspace.presenter.activate_download(position)? {
        GateOutcome::PromoShown => debug!("Showing promotion for logo {}", position),
        GateOutcome::Download(download) => {
            debug!("Prepared {}", download.filename);
            workspace.offer_download(position, download);
        }
    }
    Ok(Redirect::to("/"))
}

/// handles the /logos/{position}/file GET the page is pointed at after a
/// second click
pub(crate) async fn download_file_handler(
    State(state): State<AppState>,
    session: Session,
    Path(position): Path<usize>,
) -> Result<Response, LogoError> {
    let workspace = state.workspaces.for_session(&session).await?;
    let download = workspace
        .lock()
        .await
        .take_download(position)
        .ok_or_else(|| LogoError::NotFound(format!("download for logo {position}")))?;
    info!("Downloading {}", download.filename);
    attachment(download)
}

pub(crate) async fn dismiss_promo_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, LogoError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let workspace = state.workspaces.for_session(&session).await?;
    workspace.lock().await.presenter.dismiss_promo();
    Ok(Redirect::to("/"))
}
