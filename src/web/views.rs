use super::flash::FlashMessage;
use super::prelude::*;
use super::workspace::Workspace;
use crate::constants::{GENERATE_LABEL, GENERATING_LABEL, INDUSTRIES, STYLES};
use crate::presenter::{NO_RESULTS_MESSAGE, ResultView};

#[derive(Clone, Debug)]
pub(crate) struct PaletteView {
    pub(crate) name: &'static str,
    pub(crate) colors: Vec<&'static str>,
    pub(crate) selected: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ChoiceView {
    pub(crate) value: String,
    pub(crate) selected: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct CardView {
    pub(crate) position: usize,
    pub(crate) alt: String,
    pub(crate) data_uri: String,
    pub(crate) label: &'static str,
    pub(crate) armed: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub(crate) struct HomeTemplate {
    pub(crate) csrf_token: String,
    pub(crate) palettes: Vec<PaletteView>,
    pub(crate) description: String,
    pub(crate) industries: Vec<ChoiceView>,
    pub(crate) styles: Vec<ChoiceView>,
    pub(crate) generating: bool,
    pub(crate) generate_label: &'static str,
    pub(crate) busy_label: &'static str,
    pub(crate) show_placeholder: bool,
    pub(crate) placeholder: &'static str,
    pub(crate) cards: Vec<CardView>,
    pub(crate) promo_visible: bool,
    pub(crate) has_flash: bool,
    pub(crate) flash_message: String,
    pub(crate) flash_class: String,
    pub(crate) has_download: bool,
    pub(crate) download_position: usize,
}

/// Options for a `<select>`, keeping a custom value the browser sent us.
fn choices(options: &[&str], current: &str) -> Vec<ChoiceView> {
    let current = if current.is_empty() {
        options.first().copied().unwrap_or_default()
    } else {
        current
    };
    let mut views: Vec<ChoiceView> = options
        .iter()
        .map(|option| ChoiceView {
            value: option.to_string(),
            selected: *option == current,
        })
        .collect();
    if !options.contains(&current) {
        views.push(ChoiceView {
            value: current.to_string(),
            selected: true,
        });
    }
    views
}

impl HomeTemplate {
    fn build(
        workspace: &Workspace,
        csrf_token: String,
        flash: Option<FlashMessage>,
        download: Option<usize>,
    ) -> Self {
        let palettes = workspace
            .palettes
            .entries()
            .map(|(palette, selected)| PaletteView {
                name: palette.name,
                colors: palette.colors.to_vec(),
                selected,
            })
            .collect();

        let cards = workspace
            .presenter
            .cards()
            .iter()
            .map(|card| CardView {
                position: card.position(),
                alt: card.alt_text(),
                data_uri: card.image.payload.data_uri(),
                label: card.gate.label(),
                armed: card.gate.is_armed(),
            })
            .collect();

        let generating = workspace.orchestrator.is_busy();
        let (has_flash, flash_message, flash_class) = match flash {
            Some(message) => (true, message.text.to_string(), message.class.to_string()),
            None => (false, String::new(), String::new()),
        };

        Self {
            csrf_token,
            palettes,
            description: workspace.draft.description.clone(),
            industries: choices(INDUSTRIES, &workspace.draft.industry),
            styles: choices(STYLES, &workspace.draft.style),
            generating,
            generate_label: if generating {
                GENERATING_LABEL
            } else {
                GENERATE_LABEL
            },
            busy_label: GENERATING_LABEL,
            show_placeholder: matches!(workspace.presenter.view(), ResultView::Empty),
            placeholder: NO_RESULTS_MESSAGE,
            cards,
            promo_visible: workspace.presenter.promo_visible(),
            has_flash,
            flash_message,
            flash_class,
            has_download: download.is_some(),
            download_position: download.unwrap_or_default(),
        }
    }
}

/// handles the / GET
pub(crate) async fn home_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<HomeTemplate, LogoError> {
    let workspace = state.workspaces.for_session(&session).await?;
    let csrf_token = csrf_token(&session).await?;
    let flash = flash::take_flash_message(&session).await?;

    let mut workspace = workspace.lock().await;
    let flash = match flash {
        Some(message) => Some(message),
        None => workspace.notice.take().and_then(flash::message_for),
    };
    let download = workspace.announce_download();
    Ok(HomeTemplate::build(&workspace, csrf_token, flash, download))
}
