use crate::error::{Result, StudioError};
use crate::models::ModelId;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "YouTube (16:9)")]
    Widescreen,
}

impl ImageSize {
    pub const ALL: [ImageSize; 4] = [
        ImageSize::Square256,
        ImageSize::Square512,
        ImageSize::Square1024,
        ImageSize::Widescreen,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ImageSize::Square256 => "256x256",
            ImageSize::Square512 => "512x512",
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Widescreen => "YouTube (16:9)",
        }
    }

    /// Edge length in pixels for the square sizes.
    pub fn square_edge(&self) -> Option<u32> {
        match self {
            ImageSize::Square256 => Some(256),
            ImageSize::Square512 => Some(512),
            ImageSize::Square1024 => Some(1024),
            ImageSize::Widescreen => None,
        }
    }

    pub fn aspect_ratio(&self) -> &'static str {
        match self {
            ImageSize::Widescreen => "16:9",
            _ => "1:1",
        }
    }

    /// Natural-language steering for models without a resolution parameter.
    pub fn dimension_instruction(&self) -> String {
        match self.square_edge() {
            Some(edge) => format!(
                "The desired dimension is a square image of approximately {} pixels.",
                edge
            ),
            None => "suitable for a YouTube thumbnail. The desired dimension is a 16:9 aspect ratio image of approximately 1280x720 pixels.".to_string(),
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for ImageSize {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "256x256" | "256" => Ok(ImageSize::Square256),
            "512x512" | "512" => Ok(ImageSize::Square512),
            "1024x1024" | "1024" => Ok(ImageSize::Square1024),
            "youtube (16:9)" | "youtube" | "16:9" | "widescreen" => Ok(ImageSize::Widescreen),
            _ => Err(StudioError::UnsupportedSize(s.to_string())),
        }
    }
}

/// An encoded image carried as base64 text together with its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub mime_type: String,
    pub data: String,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, STANDARD.encode(bytes))
    }

    /// Builds an uploaded source image, rejecting anything that is not an image.
    pub fn upload(mime_type: &str, bytes: &[u8]) -> Result<Self> {
        if !mime_type.starts_with("image/") {
            return Err(StudioError::InvalidUpload(mime_type.to_string()));
        }
        Ok(Self::from_bytes(mime_type, bytes))
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.data.as_bytes())?)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Guesses an image media type from a file extension.
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// One generation call, built fresh for every submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub size: ImageSize,
    pub image: Option<ImageData>,
    pub model: ModelId,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: ModelId) -> Self {
        Self {
            prompt: prompt.into(),
            size: ImageSize::default(),
            image: None,
            model,
        }
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenPrediction {
    pub bytes_base64_encoded: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagenPredictResponse {
    #[serde(default)]
    pub predictions: Vec<ImagenPrediction>,
}
