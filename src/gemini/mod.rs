pub mod image_client;
pub mod text_client;
pub mod transport;

use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
    logger,
    models::{GenerationRequest, ImageData},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub use image_client::{Backend, FlashImageBackend, ImageBackend, ImagenBackend};
pub use text_client::TextClient;
pub use transport::{HttpTransport, Transport};

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Every harm category set to `BLOCK_NONE`; content filtering is off for this tool.
pub fn safety_settings() -> Value {
    HARM_CATEGORIES
        .iter()
        .map(|category| json!({ "category": category, "threshold": "BLOCK_NONE" }))
        .collect()
}

/// What the studio needs from a generation service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageData>;

    async fn refine_prompt(&self, prompt: &str) -> Result<Vec<String>>;

    async fn translate(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    transport: Arc<dyn Transport>,
    text_client: TextClient,
    imagen: ImagenBackend,
}

impl GeminiClient {
    /// Builds the HTTP-backed client; fails when no API key is configured.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(transport, config.text_model)
            .with_imagen(ImagenBackend::new(config.imagen_safety)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, text_model: impl Into<String>) -> Self {
        Self {
            text_client: TextClient::new(transport.clone(), text_model),
            transport,
            imagen: ImagenBackend::default(),
        }
    }

    pub fn with_imagen(mut self, imagen: ImagenBackend) -> Self {
        self.imagen = imagen;
        self
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    async fn call_backend(&self, backend: Backend, request: &GenerationRequest) -> Result<ImageData> {
        let payload = backend.build(request)?;
        let endpoint = backend.endpoint();

        log::info!("Generating image with model: {}", backend.model());
        log::debug!(
            "Image request for {} ({} bytes)",
            endpoint,
            payload.to_string().len()
        );

        let _timer = logger::timer(&format!("generate {}", backend.model()));
        let response = self.transport.post(&endpoint, &payload).await?;
        backend.parse(response)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageData> {
        let backend = Backend::with_imagen(request.model, self.imagen.clone());
        let descriptor = request.model.descriptor();

        let result = if request.image.is_some() && !backend.supports_edit() {
            Err(StudioError::UnsupportedOperation(descriptor.name.into()))
        } else {
            self.call_backend(backend, request).await
        };

        result.map_err(|e| {
            log::error!("Error generating image with {}: {}", request.model, e);
            StudioError::generation(descriptor.name, e)
        })
    }

    async fn refine_prompt(&self, prompt: &str) -> Result<Vec<String>> {
        self.text_client.refine(prompt).await
    }

    async fn translate(&self, prompt: &str) -> Result<String> {
        self.text_client.translate(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::transport::mock::MockTransport;
    use crate::models::{ImageSize, ModelId};

    fn client(transport: MockTransport) -> (GeminiClient, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        (
            GeminiClient::with_transport(transport.clone(), "gemini-2.5-flash"),
            transport,
        )
    }

    fn flash_image_response(data: &str) -> Value {
        json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": data } }
            ]}}]
        })
    }

    #[test]
    fn test_safety_settings_disable_all_categories() {
        let settings = safety_settings();
        let settings = settings.as_array().unwrap();
        assert_eq!(settings.len(), 4);
        assert!(settings.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
    }

    #[tokio::test]
    async fn test_generate_only_model_rejects_upload_without_network() {
        let (client, transport) = client(MockTransport::new());

        for size in ImageSize::ALL {
            let request = GenerationRequest::new("a cat", ModelId::Imagen4)
                .with_size(size)
                .with_image(ImageData::new("image/png", "AAAA"));
            let err = client.generate(&request).await.unwrap_err();
            assert!(matches!(err.root(), StudioError::UnsupportedOperation(_)));
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_with_flash() {
        let (client, transport) = client(MockTransport::new().respond(flash_image_response("iVBOR")));

        let request = GenerationRequest::new("a red fox in snow", ModelId::GeminiFlashImage)
            .with_size(ImageSize::Square512);
        let image = client.generate(&request).await.unwrap();
        assert_eq!(image.data, "iVBOR");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "gemini-2.5-flash-image:generateContent");
    }

    #[tokio::test]
    async fn test_generate_with_imagen() {
        let (client, transport) = client(
            MockTransport::new()
                .respond(json!({ "predictions": [{ "bytesBase64Encoded": "iVBOR", "mimeType": "image/png" }] })),
        );

        let request =
            GenerationRequest::new("a lighthouse", ModelId::Imagen4).with_size(ImageSize::Widescreen);
        let image = client.generate(&request).await.unwrap();
        assert_eq!(image.mime_type, "image/png");

        let body = &transport.requests()[0].1;
        assert_eq!(body["parameters"]["aspectRatio"], "16:9");
        assert_eq!(body["parameters"]["safetySetting"], "block_only_high");
    }

    #[tokio::test]
    async fn test_imagen_safety_comes_from_client() {
        let transport = Arc::new(
            MockTransport::new().respond(json!({ "predictions": [{ "bytesBase64Encoded": "iVBOR" }] })),
        );
        let client = GeminiClient::with_transport(transport.clone(), "gemini-2.5-flash")
            .with_imagen(ImagenBackend::new("block_low_and_above"));

        client
            .generate(&GenerationRequest::new("a lighthouse", ModelId::Imagen4))
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[0].1["parameters"]["safetySetting"],
            "block_low_and_above"
        );
    }

    #[tokio::test]
    async fn test_transport_errors_carry_model_name() {
        let (client, _) = client(MockTransport::new().fail(StudioError::ApiError {
            status: 429,
            message: "Resource has been exhausted".into(),
        }));

        let request = GenerationRequest::new("a fox", ModelId::GeminiFlashImage);
        let err = client.generate(&request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API Error (Gemini Flash): API error (429): Resource has been exhausted"
        );
    }

    #[tokio::test]
    async fn test_missing_image_is_reported() {
        let (client, _) = client(MockTransport::new().respond(json!({ "predictions": [] })));
        let err = client
            .generate(&GenerationRequest::new("a fox", ModelId::Imagen4))
            .await
            .unwrap_err();
        assert!(matches!(err.root(), StudioError::NoImageInResponse(_)));
        assert!(err.to_string().starts_with("API Error (Imagen 4):"));
    }
}
