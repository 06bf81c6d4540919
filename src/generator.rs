//! Client for the hosted image-generation model.
//!
//! The rest of the crate only talks to [`ImageGenerator`]; [`ImagenClient`]
//! is the production implementation that calls Google's `:predict` endpoint.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "imagen-3.0-generate-002";

/// Base URL of the Generative Language API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Errors raised while talking to the image-generation API.
#[derive(Debug)]
pub enum GeneratorError {
    /// API returned a non-success status.
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, trimmed
        message: String,
    },
    /// Network or HTTP transport error.
    Network(reqwest::Error),
    /// Response body was not the JSON we expected.
    Json(serde_json::Error),
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorError::Api { status, message } => {
                write!(f, "API error: {status} - {message}")
            }
            GeneratorError::Network(err) => write!(f, "network error: {err}"),
            GeneratorError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for GeneratorError {}

impl From<reqwest::Error> for GeneratorError {
    fn from(err: reqwest::Error) -> Self {
        GeneratorError::Network(err)
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::Json(err)
    }
}

/// What we ask the model for: one prompt, a fixed image count and shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageGenerationSpec {
    /// Natural-language prompt
    pub prompt: String,
    /// Number of images requested
    pub number_of_images: u8,
    /// Requested output MIME type
    pub output_mime_type: &'static str,
    /// Requested aspect ratio, eg `1:1`
    pub aspect_ratio: &'static str,
}

impl ImageGenerationSpec {
    /// Four square PNGs for `prompt`.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            number_of_images: 4,
            output_mime_type: "image/png",
            aspect_ratio: "1:1",
        }
    }
}

/// Decoded image bytes as returned by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    format: image::ImageFormat,
}

impl ImagePayload {
    /// Wraps raw bytes, sniffing the format from magic bytes (PNG if unknown).
    pub fn new(bytes: Vec<u8>) -> Self {
        let format = image::guess_format(&bytes).unwrap_or(image::ImageFormat::Png);
        Self { bytes, format }
    }

    /// Decodes a standard base64 payload; `None` if it isn't valid base64 or is empty.
    pub fn from_base64(encoded: &str) -> Option<Self> {
        let bytes = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
        if bytes.is_empty() {
            return None;
        }
        Some(Self::new(bytes))
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type of the payload, eg `image/png`.
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("png")
    }

    /// `data:` URI suitable for an `<img src>`.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// One slot of a generation response. A slot may legitimately be empty when
/// the model failed (or refused) to produce that particular image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationSlot {
    /// The image, if the model produced one
    pub image: Option<ImagePayload>,
}

impl GenerationSlot {
    /// A slot carrying an image.
    pub fn with_image(image: ImagePayload) -> Self {
        Self { image: Some(image) }
    }

    /// A slot without an image.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Something that turns a prompt into image slots.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Sends exactly one generation request.
    async fn generate(
        &self,
        spec: &ImageGenerationSpec,
    ) -> Result<Vec<GenerationSlot>, GeneratorError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

impl std::fmt::Debug for dyn ImageGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImageGenerator({})", self.model())
    }
}

/// Imagen over the Generative Language REST API.
#[derive(Clone, Debug)]
pub struct ImagenClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: Url,
}

impl ImagenClient {
    /// Creates a client for `model` at `api_base`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, api_base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:predict",
            self.api_base.as_str().trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ImageGenerator for ImagenClient {
    async fn generate(
        &self,
        spec: &ImageGenerationSpec,
    ) -> Result<Vec<GenerationSlot>, GeneratorError> {
        let body = PredictRequest::from_spec(spec);
        debug!(
            "Requesting {} images from {}",
            spec.number_of_images, self.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }

        let parsed: PredictResponse = serde_json::from_slice(&bytes)?;
        Ok(slots_from_response(parsed, usize::from(spec.number_of_images)))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u8,
    aspect_ratio: &'a str,
    output_options: OutputOptions<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions<'a> {
    mime_type: &'a str,
}

impl<'a> PredictRequest<'a> {
    fn from_spec(spec: &'a ImageGenerationSpec) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: &spec.prompt,
            }],
            parameters: PredictParameters {
                sample_count: spec.number_of_images,
                aspect_ratio: spec.aspect_ratio,
                output_options: OutputOptions {
                    mime_type: spec.output_mime_type,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

/// Maps predictions onto slots, padding with empty slots up to `requested`.
fn slots_from_response(response: PredictResponse, requested: usize) -> Vec<GenerationSlot> {
    let mut slots: Vec<GenerationSlot> = response
        .predictions
        .into_iter()
        .map(|prediction| {
            if let Some(reason) = prediction.rai_filtered_reason {
                debug!("Image filtered by the model: {reason}");
            }
            match prediction.bytes_base64_encoded.as_deref() {
                Some(encoded) => match ImagePayload::from_base64(encoded) {
                    Some(image) => GenerationSlot::with_image(image),
                    None => {
                        warn!("Discarding prediction with undecodable image data");
                        GenerationSlot::empty()
                    }
                },
                None => GenerationSlot::empty(),
            }
        })
        .collect();
    if slots.len() < requested {
        slots.resize_with(requested, GenerationSlot::empty);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Json;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_bytes(marker: u8) -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 13, marker]);
        bytes
    }

    #[test]
    fn spec_defaults_to_four_square_pngs() {
        let spec = ImageGenerationSpec::new("a fox");
        assert_eq!(spec.number_of_images, 4);
        assert_eq!(spec.aspect_ratio, "1:1");
        assert_eq!(spec.output_mime_type, "image/png");
    }

    #[test]
    fn request_body_uses_camel_case_parameters() {
        let spec = ImageGenerationSpec::new("a fox");
        let body = serde_json::to_value(PredictRequest::from_spec(&spec)).unwrap();
        assert_eq!(
            body,
            json!({
                "instances": [{"prompt": "a fox"}],
                "parameters": {
                    "sampleCount": 4,
                    "aspectRatio": "1:1",
                    "outputOptions": {"mimeType": "image/png"}
                }
            })
        );
    }

    #[test]
    fn payload_sniffs_format() {
        let png = ImagePayload::new(png_bytes(1));
        assert_eq!(png.content_type(), "image/png");
        assert_eq!(png.extension(), "png");
        assert!(png.data_uri().starts_with("data:image/png;base64,iVBORw0KGgo"));

        let jpeg = ImagePayload::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]);
        assert_eq!(jpeg.content_type(), "image/jpeg");
        assert_eq!(jpeg.extension(), "jpg");
    }

    #[test]
    fn invalid_base64_is_not_a_payload() {
        assert!(ImagePayload::from_base64("not base64!!").is_none());
        assert!(ImagePayload::from_base64("").is_none());
        assert!(ImagePayload::from_base64("iVBORw0KGgo=").is_some());
    }

    #[test]
    fn missing_predictions_become_empty_slots() {
        let response: PredictResponse = serde_json::from_value(json!({
            "predictions": [
                {"bytesBase64Encoded": "iVBORw0KGgo=", "mimeType": "image/png"},
                {"raiFilteredReason": "filtered"},
                {"bytesBase64Encoded": "@@@"}
            ]
        }))
        .unwrap();
        let slots = slots_from_response(response, 4);
        let present: Vec<bool> = slots.iter().map(|slot| slot.image.is_some()).collect();
        assert_eq!(present, vec![true, false, false, false]);
    }

    #[test]
    fn empty_response_body_parses() {
        let response: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(slots_from_response(response, 0).is_empty());
    }

    async fn spawn_fake_api(status: StatusCode, reply: Value) -> (Url, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let app = axum::Router::new().route(
            "/v1beta/models/{model}",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let recorder = recorder.clone();
                let reply = reply.clone();
                async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    recorder
                        .lock()
                        .unwrap()
                        .push(json!({"key": key, "body": body}));
                    (status, Json(reply))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let base = Url::parse(&format!("http://{addr}")).unwrap();
        (base, seen)
    }

    #[tokio::test]
    async fn client_posts_prompt_and_reads_slots() {
        let (base, seen) = spawn_fake_api(
            StatusCode::OK,
            json!({"predictions": [
                {"bytesBase64Encoded": "iVBORw0KGgo=", "mimeType": "image/png"},
                {"bytesBase64Encoded": "iVBORw0KGgo=", "mimeType": "image/png"}
            ]}),
        )
        .await;
        let client = ImagenClient::new("secret", DEFAULT_MODEL, base);

        let slots = client
            .generate(&ImageGenerationSpec::new("a lighthouse"))
            .await
            .unwrap();
        assert_eq!(slots.len(), 4);
        assert_eq!(slots.iter().filter(|slot| slot.image.is_some()).count(), 2);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["key"], "secret");
        assert_eq!(seen[0]["body"]["instances"][0]["prompt"], "a lighthouse");
    }

    #[tokio::test]
    async fn client_reports_api_errors() {
        let (base, _seen) = spawn_fake_api(
            StatusCode::FORBIDDEN,
            json!({"error": {"message": "API key not valid"}}),
        )
        .await;
        let client = ImagenClient::new("bad", DEFAULT_MODEL, base);

        let err = client
            .generate(&ImageGenerationSpec::new("a lighthouse"))
            .await
            .unwrap_err();
        match err {
            GeneratorError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
