//! Turns a filled-in brand form into a set of generated logos.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info};

use crate::error::LogoError;
use crate::generator::{GenerationSlot, ImageGenerationSpec, ImageGenerator, ImagePayload};

/// Shown when the brand description is left empty.
pub const DESCRIPTION_REQUIRED: &str = "Please fill out the brand description.";

/// One form submission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    /// What the brand is about
    pub description: String,
    /// Industry the brand operates in
    pub industry: String,
    /// Visual style, eg `minimalist`
    pub style: String,
    /// Name of the selected colour palette
    pub palette_name: String,
}

/// An image that survived filtering, with its position in the result set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedImage {
    /// 0-based index among the surviving images
    pub index: usize,
    /// The image itself
    pub payload: ImagePayload,
}

impl GeneratedImage {
    /// 1-based position shown on the card.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    /// Suggested download filename, eg `logo-1.png`.
    pub fn filename(&self) -> String {
        format!("logo-{}.{}", self.position(), self.payload.extension())
    }
}

/// Builds the prompt sent to the model.
pub fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        "A professional logo for a \"{industry}\" company. The brand identity is \"{description}\". \
         Style: {style}. Use a color scheme inspired by a \"{palette}\" color palette. \
         The logo should be a clean, modern, vector-style graphic on a solid white background. \
         It must be an icon or abstract mark, with no text.",
        industry = request.industry,
        description = request.description,
        style = request.style,
        palette = request.palette_name,
    )
}

/// Keeps the slots that carry an image, in order, re-indexed from zero.
pub fn filter_slots(slots: Vec<GenerationSlot>) -> Vec<GeneratedImage> {
    slots
        .into_iter()
        .filter_map(|slot| slot.image)
        .enumerate()
        .map(|(index, payload)| GeneratedImage { index, payload })
        .collect()
}

/// Marks the orchestrator busy for as long as it lives.
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Sends one prompt at a time to the image generator.
///
/// Clones share the same in-flight flag, so a clone can run the request
/// while the first one is used to answer [`GenerationOrchestrator::is_busy`].
#[derive(Clone, Debug)]
pub struct GenerationOrchestrator {
    generator: Arc<dyn ImageGenerator>,
    in_flight: Arc<AtomicBool>,
}

impl GenerationOrchestrator {
    /// Wraps a generator.
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            generator,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a request is outstanding; the generate button is disabled.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validates the request and claims the in-flight slot without calling
    /// the generator yet. Dropping the returned value releases the slot.
    pub fn begin(&self, request: &GenerationRequest) -> Result<PendingGeneration, LogoError> {
        if request.description.trim().is_empty() {
            return Err(LogoError::Validation(DESCRIPTION_REQUIRED.to_string()));
        }
        let guard = InFlightGuard::acquire(&self.in_flight).ok_or(LogoError::Busy)?;
        Ok(PendingGeneration {
            guard,
            generator: self.generator.clone(),
            spec: ImageGenerationSpec::new(build_prompt(request)),
        })
    }

    /// Validates, generates and filters in one go.
    pub async fn submit(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedImage>, LogoError> {
        self.begin(request)?.run().await
    }
}

/// A validated request holding the in-flight slot.
#[derive(Debug)]
pub struct PendingGeneration {
    guard: InFlightGuard,
    generator: Arc<dyn ImageGenerator>,
    spec: ImageGenerationSpec,
}

impl PendingGeneration {
    /// The prompt that will be sent.
    pub fn prompt(&self) -> &str {
        &self.spec.prompt
    }

    /// Calls the generator once. The in-flight slot is released when this
    /// returns, whatever the outcome.
    pub async fn run(self) -> Result<Vec<GeneratedImage>, LogoError> {
        let (outcome, _guard) = self.run_and_hold().await;
        outcome
    }

    /// Calls the generator once and hands the in-flight slot back, so the
    /// caller can publish the outcome before the orchestrator reads as idle.
    pub async fn run_and_hold(self) -> (Result<Vec<GeneratedImage>, LogoError>, InFlightGuard) {
        let outcome = self.generate().await;
        (outcome, self.guard)
    }

    async fn generate(&self) -> Result<Vec<GeneratedImage>, LogoError> {
        info!(
            "Generating {} logos with {}",
            self.spec.number_of_images,
            self.generator.model()
        );
        let slots = match self.generator.generate(&self.spec).await {
            Ok(slots) => slots,
            Err(err) => {
                error!("Error generating images: {}", err);
                return Err(err.into());
            }
        };
        let requested = slots.len();
        let images = filter_slots(slots);
        info!("Model returned {} of {} images", images.len(), requested);
        Ok(images)
    }
}
