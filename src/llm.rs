use crate::types::AspectRatio;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Static system-level directive attached to every call. Not user
/// configurable.
pub const SAFETY_INSTRUCTION: &str = "\
CRITICAL SAFETY INSTRUCTION:
You must strictly adhere to all safety policies. Do not generate content that \
is sexually explicit, hateful, harassing, violent, or promotes self-harm. All \
content, including character descriptions, actions, dialogue, and visual \
elements, must be appropriate for a general, family-friendly audience. If a \
user prompt can be interpreted in multiple ways, you must always choose the \
safest and most positive interpretation. Avoid any controversial or sensitive \
topics.";

/// One attempt against the remote service with one credential. The failover
/// loop in [`crate::client::GenerationClient`] lives above this seam so that
/// tests can swap in a scripted backend.
#[async_trait]
pub trait ModelBackend: Send + Sync + Debug {
    async fn generate_text(&self, api_key: &str, prompt: &str) -> Result<String>;

    /// Returns the raw model text; the caller parses and validates it.
    async fn generate_json(&self, api_key: &str, prompt: &str, schema: &Value) -> Result<String>;

    async fn generate_image(
        &self,
        api_key: &str,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<u8>>;
}

#[derive(Debug)]
pub struct GeminiBackend {
    text_model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(text_model: &str, image_model: &str) -> Self {
        Self {
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn generate_content(
        &self,
        api_key: &str,
        prompt: &str,
        generation_config: Option<GenerationConfig>,
    ) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", API_BASE, self.text_model);

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Some(SystemInstruction {
                parts: vec![Part {
                    text: SAFETY_INSTRUCTION.to_string(),
                }],
            }),
            generation_config,
        };

        // The key travels in a header, never in the URL, so transport errors
        // and logged URLs cannot leak it.
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error ({}): {}", status, error_text));
        }

        let response_text = resp.text().await?;
        let result: GenerateContentResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                anyhow!("failed to parse Gemini response: {}. Body: {}", e, response_text)
            })?;

        if let Some(err) = result.error {
            return Err(anyhow!("Gemini API returned error: {}", err.message));
        }

        if let Some(candidates) = result.candidates {
            if let Some(first) = candidates.first() {
                if let Some(content) = &first.content {
                    if let Some(part) = content.parts.first() {
                        return Ok(part.text.clone());
                    }
                }
                // Content or parts missing, usually a safety block.
                let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
                return Err(anyhow!("Gemini response empty. Finish reason: {}", reason));
            }
        }

        Err(anyhow!("Gemini response format unexpected or empty"))
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate_text(&self, api_key: &str, prompt: &str) -> Result<String> {
        self.generate_content(api_key, prompt, None).await
    }

    async fn generate_json(&self, api_key: &str, prompt: &str, schema: &Value) -> Result<String> {
        let config = GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema.clone()),
        };
        self.generate_content(api_key, prompt, Some(config)).await
    }

    async fn generate_image(
        &self,
        api_key: &str,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/models/{}:predict", API_BASE, self.image_model);

        let request_body = PredictRequest {
            instances: vec![ImageInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImageParameters {
                sample_count: 1,
                aspect_ratio: aspect_ratio.as_str().to_string(),
                output_mime_type: "image/jpeg".to_string(),
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Imagen API error ({}): {}", status, error_text));
        }

        let result: PredictResponse = resp.json().await?;
        let first = result
            .predictions
            .first()
            .ok_or_else(|| anyhow!("no image was generated by the API"))?;

        let bytes = BASE64
            .decode(&first.bytes_base64_encoded)
            .map_err(|e| anyhow!("image payload is not valid base64: {}", e))?;
        if bytes.is_empty() {
            return Err(anyhow!("image payload was empty"));
        }
        Ok(bytes)
    }
}

// --- generateContent wire types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: Option<String>,
    response_schema: Option<Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

// --- Imagen predict wire types ---

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<ImageInstance>,
    parameters: ImageParameters,
}

#[derive(Serialize)]
struct ImageInstance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_mime_type: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: String,
}
