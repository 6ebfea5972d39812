use crate::models::ImageData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPart {
    pub text: Option<String>,
    pub inline_data: Option<ImageData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

/// Response shape of the `generateContent` method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ContentPart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// First inline image of the first candidate.
    pub fn first_image(&self) -> Option<&ImageData> {
        self.first_parts()
            .iter()
            .find_map(|part| part.inline_data.as_ref())
    }

    /// All text parts of the first candidate, concatenated.
    pub fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefinementResponse {
    pub suggestions: Vec<String>,
}
