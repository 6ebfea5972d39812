use crate::{
    error::{Result, StudioError},
    gemini::{safety_settings, transport::Transport},
    models::{GenerateContentResponse, RefinementResponse},
};
use serde_json::{json, Value};
use std::sync::Arc;

const REFINE_INSTRUCTION: &str = "You are a prompt engineering expert for generative AI image models. Your goal is to help users enhance their initial ideas. You will be given a user's prompt and you must return 3 improved suggestions in a JSON object format.";

const TRANSLATE_INSTRUCTION: &str = "You are a highly efficient translation engine. Translate the user's text to English. Do not add any extra text, explanations, or labels like 'English:'. Only return the translated text itself.";

pub const REFINEMENT_COUNT: usize = 3;

/// Text-generation calls that support the image workflow.
#[derive(Clone)]
pub struct TextClient {
    transport: Arc<dyn Transport>,
    model: String,
}

impl TextClient {
    pub fn new(transport: Arc<dyn Transport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}:generateContent", self.model)
    }

    pub async fn refine(&self, prompt: &str) -> Result<Vec<String>> {
        let payload = refine_payload(prompt);
        log::info!("Refining prompt with model: {}", self.model);

        let result = async {
            let response = self.transport.post(&self.endpoint(), &payload).await?;
            parse_refinement(response)
        }
        .await;

        result.map_err(|e| {
            log::error!("Error refining prompt: {}", e);
            StudioError::Refinement(Box::new(e))
        })
    }

    pub async fn translate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Ok(prompt.to_string());
        }

        let payload = translate_payload(prompt);
        log::info!("Translating prompt with model: {}", self.model);

        let result = async {
            let response = self.transport.post(&self.endpoint(), &payload).await?;
            let response: GenerateContentResponse = serde_json::from_value(response)
                .map_err(|e| StudioError::ResponseError(e.to_string()))?;
            Ok::<_, StudioError>(response.text().trim().to_string())
        }
        .await;

        result.map_err(|e| {
            log::error!("Error translating prompt: {}", e);
            StudioError::Translation(Box::new(e))
        })
    }
}

fn refine_payload(prompt: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": REFINE_INSTRUCTION }] },
        "contents": [{
            "parts": [{
                "text": format!(
                    "Based on the following user prompt, provide 3 more descriptive and creative alternatives that would generate a better image. User Prompt: \"{}\"",
                    prompt
                )
            }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "suggestions": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "An array of exactly 3 refined prompt suggestions."
                    }
                },
                "required": ["suggestions"]
            }
        },
        "safetySettings": safety_settings()
    })
}

fn translate_payload(prompt: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": TRANSLATE_INSTRUCTION }] },
        "contents": [{ "parts": [{ "text": prompt }] }],
        "safetySettings": safety_settings()
    })
}

fn parse_refinement(response: Value) -> Result<Vec<String>> {
    let response: GenerateContentResponse = serde_json::from_value(response)
        .map_err(|e| StudioError::ResponseError(e.to_string()))?;
    let json_text = response.text();

    let parsed: Value = serde_json::from_str(json_text.trim())?;
    let refinement: RefinementResponse =
        serde_json::from_value(parsed).map_err(|_| StudioError::InvalidRefinementResponse)?;

    if refinement.suggestions.len() != REFINEMENT_COUNT {
        log::warn!(
            "Expected {} prompt suggestions, received {}",
            REFINEMENT_COUNT,
            refinement.suggestions.len()
        );
    }
    Ok(refinement.suggestions)
}
