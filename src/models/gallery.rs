use crate::models::{ImageData, ImageSize, ModelId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label stored for image-only edits submitted without prompt text.
pub const EDIT_FALLBACK_PROMPT: &str = "Edit of uploaded image";

/// A finished generation kept in the local gallery. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryRecord {
    pub id: String,
    pub image: ImageData,
    pub prompt: String,
    pub model: ModelId,
    pub size: ImageSize,
    pub created_at: DateTime<Utc>,
}

impl GalleryRecord {
    pub fn new(image: ImageData, prompt: &str, model: ModelId, size: ImageSize) -> Self {
        let prompt = if prompt.is_empty() {
            EDIT_FALLBACK_PROMPT.to_string()
        } else {
            prompt.to_string()
        };

        Self {
            id: Uuid::new_v4().to_string(),
            image,
            prompt,
            model,
            size,
            created_at: Utc::now(),
        }
    }

    pub fn download_name(&self) -> String {
        let short: String = self.id.chars().take(8).collect();
        format!("pika-{}.{}", short, self.image.file_extension())
    }
}
