//! Holds the current result set and each card's download gate.

use crate::error::LogoError;
use crate::gate::{DownloadGate, GateAction};
use crate::orchestrator::GeneratedImage;

/// Placeholder text for a successful generation that produced nothing.
pub const NO_RESULTS_MESSAGE: &str =
    "No logos were generated. Try adjusting your prompt or try again.";

/// A rendered logo with its own download gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoCard {
    /// The image shown on the card
    pub image: GeneratedImage,
    /// Download gate for this card only
    pub gate: DownloadGate,
}

impl LogoCard {
    fn new(image: GeneratedImage) -> Self {
        Self {
            image,
            gate: DownloadGate::default(),
        }
    }

    /// 1-based position label.
    pub fn position(&self) -> usize {
        self.image.position()
    }

    /// Alt text for the image.
    pub fn alt_text(&self) -> String {
        format!("Generated Logo {}", self.position())
    }
}

/// What the results grid currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ResultView {
    /// Nothing generated yet, or a generation is running or has failed
    #[default]
    Idle,
    /// Generation succeeded without any usable image
    Empty,
    /// One card per image, in order
    Cards(Vec<LogoCard>),
}

/// A file ready to be sent to the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    /// Suggested filename, eg `logo-1.png`
    pub filename: String,
    /// MIME type of the bytes
    pub content_type: &'static str,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Result of clicking a card's download control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// First click: the promotion is now visible, nothing downloaded
    PromoShown,
    /// Second click: send this file
    Download(Download),
}

/// The results grid plus the promotional overlay.
#[derive(Clone, Debug, Default)]
pub struct ResultPresenter {
    view: ResultView,
    promo_visible: bool,
}

impl ResultPresenter {
    /// Replaces whatever was shown with `images`.
    pub fn render(&mut self, images: Vec<GeneratedImage>) {
        self.view = if images.is_empty() {
            ResultView::Empty
        } else {
            ResultView::Cards(images.into_iter().map(LogoCard::new).collect())
        };
    }

    /// Hides the previous result set and the overlay while a new one is generated.
    pub fn clear(&mut self) {
        self.view = ResultView::Idle;
        self.promo_visible = false;
    }

    /// Current grid contents.
    pub fn view(&self) -> &ResultView {
        &self.view
    }

    /// Rendered cards; empty unless the view is [`ResultView::Cards`].
    pub fn cards(&self) -> &[LogoCard] {
        match &self.view {
            ResultView::Cards(cards) => cards.as_slice(),
            _ => &[],
        }
    }

    /// Whether the promotional overlay is showing.
    pub fn promo_visible(&self) -> bool {
        self.promo_visible
    }

    /// Closes the overlay. Card gates are left as they are.
    pub fn dismiss_promo(&mut self) {
        self.promo_visible = false;
    }

    /// Runs the download gate of the card at 1-based `position`.
    pub fn activate_download(&mut self, position: usize) -> Result<GateOutcome, LogoError> {
        let card = match &mut self.view {
            ResultView::Cards(cards) => position
                .checked_sub(1)
                .and_then(|index| cards.get_mut(index)),
            _ => None,
        }
        .ok_or_else(|| LogoError::NotFound(format!("logo {position}")))?;

        let outcome = match card.gate.activate() {
            GateAction::ShowPromo => GateOutcome::PromoShown,
            GateAction::Download => GateOutcome::Download(Download {
                filename: card.image.filename(),
                content_type: card.image.payload.content_type(),
                bytes: card.image.payload.bytes().to_vec(),
            }),
        };
        self.promo_visible = matches!(outcome, GateOutcome::PromoShown);
        Ok(outcome)
    }
}
