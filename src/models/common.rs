use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Static description of a generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: ModelId,
    pub name: &'static str,
    pub supports_edit: bool,
    /// Rough latency in seconds, used to seed the countdown.
    pub estimated_secs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gemini-2.5-flash-image")]
    GeminiFlashImage,
    #[serde(rename = "imagen-4.0-generate-001")]
    Imagen4,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::GeminiFlashImage, ModelId::Imagen4];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::GeminiFlashImage => "gemini-2.5-flash-image",
            ModelId::Imagen4 => "imagen-4.0-generate-001",
        }
    }

    pub fn descriptor(&self) -> ModelDescriptor {
        match self {
            ModelId::GeminiFlashImage => ModelDescriptor {
                id: *self,
                name: "Gemini Flash",
                supports_edit: true,
                estimated_secs: 15,
            },
            ModelId::Imagen4 => ModelDescriptor {
                id: *self,
                name: "Imagen 4",
                supports_edit: false,
                estimated_secs: 30,
            },
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.descriptor().name
    }

    pub fn supports_edit(&self) -> bool {
        self.descriptor().supports_edit
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        ModelId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| StudioError::UnsupportedModel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_model_supports_edit() {
        let editable: Vec<_> = ModelId::ALL
            .iter()
            .filter(|id| id.supports_edit())
            .collect();
        assert_eq!(editable, vec![&ModelId::GeminiFlashImage]);
    }

    #[test]
    fn test_model_id_parsing() {
        assert_eq!(
            "imagen-4.0-generate-001".parse::<ModelId>().unwrap(),
            ModelId::Imagen4
        );
        let err = "dall-e-3".parse::<ModelId>().unwrap_err();
        assert!(matches!(err, StudioError::UnsupportedModel(id) if id == "dall-e-3"));
    }

    #[test]
    fn test_model_id_serializes_as_remote_identifier() {
        let json = serde_json::to_string(&ModelId::GeminiFlashImage).unwrap();
        assert_eq!(json, "\"gemini-2.5-flash-image\"");
        assert!(serde_json::from_str::<ModelId>("\"unknown\"").is_err());
    }
}
