use crate::{
    error::{Result, StudioError},
    gemini::safety_settings,
    models::{GenerateContentResponse, GenerationRequest, ImageData, ImagenPredictResponse, ModelId},
};
use serde_json::{json, Value};

/// Request building and response parsing for one remote image model.
pub trait ImageBackend {
    fn model(&self) -> ModelId;

    fn supports_edit(&self) -> bool {
        self.model().supports_edit()
    }

    /// Model method the request is posted to.
    fn endpoint(&self) -> String;

    fn build(&self, request: &GenerationRequest) -> Result<Value>;

    fn parse(&self, response: Value) -> Result<ImageData>;
}

/// Gemini Flash image model: prompt and/or source image via `generateContent`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlashImageBackend;

/// Least restrictive `safetySetting` the predict endpoint accepts.
pub const DEFAULT_IMAGEN_SAFETY: &str = "block_only_high";

/// Imagen: prompt-only generation via `predict`.
#[derive(Debug, Clone)]
pub struct ImagenBackend {
    safety_setting: String,
}

impl Default for ImagenBackend {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGEN_SAFETY)
    }
}

impl ImagenBackend {
    pub fn new(safety_setting: impl Into<String>) -> Self {
        Self {
            safety_setting: safety_setting.into(),
        }
    }

    pub fn safety_setting(&self) -> &str {
        &self.safety_setting
    }
}

#[derive(Debug, Clone)]
pub enum Backend {
    Flash(FlashImageBackend),
    Imagen(ImagenBackend),
}

impl Backend {
    pub fn for_model(model: ModelId) -> Self {
        Self::with_imagen(model, ImagenBackend::default())
    }

    /// Like `for_model`, with the Imagen backend supplied by the caller.
    pub fn with_imagen(model: ModelId, imagen: ImagenBackend) -> Self {
        match model {
            ModelId::GeminiFlashImage => Backend::Flash(FlashImageBackend),
            ModelId::Imagen4 => Backend::Imagen(imagen),
        }
    }

    fn inner(&self) -> &dyn ImageBackend {
        match self {
            Backend::Flash(backend) => backend,
            Backend::Imagen(backend) => backend,
        }
    }
}

impl ImageBackend for Backend {
    fn model(&self) -> ModelId {
        self.inner().model()
    }

    fn endpoint(&self) -> String {
        self.inner().endpoint()
    }

    fn build(&self, request: &GenerationRequest) -> Result<Value> {
        self.inner().build(request)
    }

    fn parse(&self, response: Value) -> Result<ImageData> {
        self.inner().parse(response)
    }
}

impl FlashImageBackend {
    /// Text actually sent: expanded with size guidance unless editing an upload.
    pub fn prompt_text(request: &GenerationRequest) -> String {
        if request.image.is_some() {
            request.prompt.clone()
        } else {
            format!(
                "Generate a high-quality, detailed image {} Prompt: {}",
                request.size.dimension_instruction(),
                request.prompt
            )
        }
    }
}

impl ImageBackend for FlashImageBackend {
    fn model(&self) -> ModelId {
        ModelId::GeminiFlashImage
    }

    fn endpoint(&self) -> String {
        format!("{}:generateContent", self.model().as_str())
    }

    fn build(&self, request: &GenerationRequest) -> Result<Value> {
        let mut parts = Vec::new();

        if let Some(image) = request.image.as_ref().filter(|image| !image.data.is_empty()) {
            parts.push(json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.data
                }
            }));
        }

        let text = Self::prompt_text(request);
        if !text.trim().is_empty() {
            parts.push(json!({ "text": text }));
        }

        if parts.is_empty() {
            return Err(StudioError::EmptyRequest);
        }

        Ok(json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseModalities": ["IMAGE"]
            },
            "safetySettings": safety_settings()
        }))
    }

    fn parse(&self, response: Value) -> Result<ImageData> {
        let response: GenerateContentResponse = serde_json::from_value(response)
            .map_err(|e| StudioError::ResponseError(e.to_string()))?;

        response
            .first_image()
            .filter(|image| !image.data.is_empty())
            .cloned()
            .ok_or_else(|| StudioError::NoImageInResponse(self.model().display_name().into()))
    }
}

impl ImageBackend for ImagenBackend {
    fn model(&self) -> ModelId {
        ModelId::Imagen4
    }

    fn endpoint(&self) -> String {
        format!("{}:predict", self.model().as_str())
    }

    fn build(&self, request: &GenerationRequest) -> Result<Value> {
        if request.image.is_some() {
            return Err(StudioError::UnsupportedOperation(
                self.model().display_name().into(),
            ));
        }

        // Imagen takes a single threshold instead of per-category settings.
        Ok(json!({
            "instances": [{ "prompt": request.prompt }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": request.size.aspect_ratio(),
                "outputOptions": { "mimeType": "image/png" },
                "safetySetting": self.safety_setting
            }
        }))
    }

    fn parse(&self, response: Value) -> Result<ImageData> {
        let response: ImagenPredictResponse = serde_json::from_value(response)
            .map_err(|e| StudioError::ResponseError(e.to_string()))?;

        response
            .predictions
            .into_iter()
            .next()
            .and_then(|prediction| {
                let mime_type = prediction.mime_type.unwrap_or_else(|| "image/png".into());
                prediction
                    .bytes_base64_encoded
                    .filter(|data| !data.is_empty())
                    .map(|data| ImageData::new(mime_type, data))
            })
            .ok_or_else(|| StudioError::NoImageInResponse(self.model().display_name().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageSize;

    fn upload() -> ImageData {
        ImageData::new("image/jpeg", "/9j/4AAQ")
    }

    #[test]
    fn test_backend_selection_follows_model() {
        for model in ModelId::ALL {
            let backend = Backend::for_model(model);
            assert_eq!(backend.model(), model);
            assert_eq!(backend.supports_edit(), model.supports_edit());
        }
        assert_eq!(
            Backend::for_model(ModelId::Imagen4).endpoint(),
            "imagen-4.0-generate-001:predict"
        );
    }

    #[test]
    fn test_flash_expands_prompt_without_upload() {
        let request = GenerationRequest::new("a red fox in snow", ModelId::GeminiFlashImage)
            .with_size(ImageSize::Square512);
        let body = FlashImageBackend.build(&request).unwrap();

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(
            parts[0]["text"],
            "Generate a high-quality, detailed image The desired dimension is a square image of approximately 512 pixels. Prompt: a red fox in snow"
        );
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_flash_widescreen_guidance() {
        let request = GenerationRequest::new("city skyline", ModelId::GeminiFlashImage)
            .with_size(ImageSize::Widescreen);
        let body = FlashImageBackend.build(&request).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("YouTube thumbnail"));
        assert!(text.ends_with("Prompt: city skyline"));
    }

    #[test]
    fn test_flash_edit_sends_image_and_raw_prompt() {
        let request = GenerationRequest::new("make it night", ModelId::GeminiFlashImage)
            .with_image(upload());
        let body = FlashImageBackend.build(&request).unwrap();

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/4AAQ");
        assert_eq!(parts[1]["text"], "make it night");
    }

    #[test]
    fn test_flash_image_only_edit_has_no_text_part() {
        let request = GenerationRequest::new("", ModelId::GeminiFlashImage).with_image(upload());
        let body = FlashImageBackend.build(&request).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].get("text").is_none());
    }

    #[test]
    fn test_flash_empty_request() {
        let request = GenerationRequest::new("  ", ModelId::GeminiFlashImage)
            .with_image(ImageData::new("image/png", ""));
        let err = FlashImageBackend.build(&request).unwrap_err();
        assert!(matches!(err, StudioError::EmptyRequest));
    }

    #[test]
    fn test_flash_parse() {
        let image = FlashImageBackend
            .parse(json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "sure" },
                    { "inlineData": { "mimeType": "image/png", "data": "iVBOR" } }
                ]}}]
            }))
            .unwrap();
        assert_eq!(image, ImageData::new("image/png", "iVBOR"));

        let err = FlashImageBackend
            .parse(json!({ "candidates": [{ "content": { "parts": [{ "text": "refused" }] } }] }))
            .unwrap_err();
        assert!(matches!(err, StudioError::NoImageInResponse(name) if name == "Gemini Flash"));
    }

    #[test]
    fn test_imagen_rejects_upload() {
        let request = GenerationRequest::new("a cat", ModelId::Imagen4).with_image(upload());
        let err = ImagenBackend::default().build(&request).unwrap_err();
        assert!(matches!(err, StudioError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_imagen_aspect_ratio_mapping() {
        for size in ImageSize::ALL {
            let request = GenerationRequest::new("a cat", ModelId::Imagen4).with_size(size);
            let body = ImagenBackend::default().build(&request).unwrap();
            assert_eq!(body["parameters"]["aspectRatio"], size.aspect_ratio());
            assert_eq!(body["parameters"]["sampleCount"], 1);
            assert_eq!(body["parameters"]["outputOptions"]["mimeType"], "image/png");
            assert_eq!(body["instances"][0]["prompt"], "a cat");
        }
    }

    #[test]
    fn test_imagen_safety_setting() {
        let request = GenerationRequest::new("a cat", ModelId::Imagen4);
        let body = ImagenBackend::default().build(&request).unwrap();
        assert_eq!(body["parameters"]["safetySetting"], DEFAULT_IMAGEN_SAFETY);

        let backend = Backend::with_imagen(ModelId::Imagen4, ImagenBackend::new("block_medium_and_above"));
        let body = backend.build(&request).unwrap();
        assert_eq!(body["parameters"]["safetySetting"], "block_medium_and_above");
    }

    #[test]
    fn test_imagen_parse() {
        let image = ImagenBackend::default()
            .parse(json!({ "predictions": [{ "bytesBase64Encoded": "iVBOR", "mimeType": "image/png" }] }))
            .unwrap();
        assert_eq!(image.data, "iVBOR");

        let err = ImagenBackend::default().parse(json!({})).unwrap_err();
        assert!(matches!(err, StudioError::NoImageInResponse(name) if name == "Imagen 4"));
    }
}
