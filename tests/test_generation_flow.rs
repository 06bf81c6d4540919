use std::sync::Arc;

use async_trait::async_trait;
use logogen::config::setup_logging;
use logogen::error::LogoError;
use logogen::generator::{
    GenerationSlot, GeneratorError, ImageGenerationSpec, ImageGenerator, ImagePayload,
};
use logogen::orchestrator::{GenerationOrchestrator, GenerationRequest};
use logogen::palette::PaletteSelector;
use logogen::presenter::{GateOutcome, ResultPresenter, ResultView};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

struct HalfEmptyGenerator;

#[async_trait]
impl ImageGenerator for HalfEmptyGenerator {
    async fn generate(
        &self,
        spec: &ImageGenerationSpec,
    ) -> Result<Vec<GenerationSlot>, GeneratorError> {
        Ok((0..spec.number_of_images)
            .map(|index| {
                if index % 2 == 0 {
                    let mut bytes = PNG_MAGIC.to_vec();
                    bytes.push(index);
                    GenerationSlot::with_image(ImagePayload::new(bytes))
                } else {
                    GenerationSlot::empty()
                }
            })
            .collect())
    }

    fn model(&self) -> &str {
        "half-empty"
    }
}

fn request(palettes: &PaletteSelector, description: &str) -> GenerationRequest {
    GenerationRequest {
        description: description.to_string(),
        industry: "Food & Beverage".to_string(),
        style: "Vintage".to_string(),
        palette_name: palettes.current_selection().to_string(),
    }
}

#[tokio::test]
async fn test_describe_generate_download() {
    let _ = setup_logging(true);

    let mut palettes = PaletteSelector::default();
    palettes.select("Forest Green").expect("known palette");

    let orchestrator = GenerationOrchestrator::new(Arc::new(HalfEmptyGenerator));
    let pending = orchestrator
        .begin(&request(&palettes, "a family bakery"))
        .expect("valid request");
    assert!(pending.prompt().contains("a family bakery"));
    assert!(pending.prompt().contains("\"Forest Green\" color palette"));
    assert!(orchestrator.is_busy());

    let images = pending.run().await.expect("generation succeeds");
    assert!(!orchestrator.is_busy());
    assert_eq!(images.len(), 2);

    let mut presenter = ResultPresenter::default();
    presenter.render(images);
    let positions: Vec<usize> = presenter.cards().iter().map(|card| card.position()).collect();
    assert_eq!(positions, vec![1, 2]);

    assert_eq!(
        presenter.activate_download(2).expect("card exists"),
        GateOutcome::PromoShown
    );
    assert!(presenter.promo_visible());
    presenter.dismiss_promo();

    match presenter.activate_download(2).expect("card exists") {
        GateOutcome::Download(download) => {
            assert_eq!(download.filename, "logo-2.png");
            assert_eq!(download.content_type, "image/png");
            assert!(download.bytes.starts_with(PNG_MAGIC));
        }
        other => panic!("expected a download, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_description_never_reaches_the_model() {
    let palettes = PaletteSelector::default();
    let orchestrator = GenerationOrchestrator::new(Arc::new(HalfEmptyGenerator));

    let result = orchestrator.submit(&request(&palettes, "   ")).await;
    assert!(matches!(result, Err(LogoError::Validation(_))));
    assert!(!orchestrator.is_busy());

    let mut presenter = ResultPresenter::default();
    presenter.render(Vec::new());
    assert_eq!(presenter.view(), &ResultView::Empty);
}
