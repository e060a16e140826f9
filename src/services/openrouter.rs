use anyhow::Context;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Result, SuggestionError};
use crate::models::ImageHandle;
use crate::services::ai_service::FoodRecognizer;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const DETECTION_PROMPT: &str = "You are a food recognition expert. Look at this meal photo carefully.\n\
    \n\
    1. List every distinct food you can see (main dish, sides, drinks).\n\
    2. Use short, common English names (e.g. \"grilled chicken\", \"white rice\").\n\
    3. Order them from most to least prominent on the plate.\n\
    \n\
    ANSWER FORMAT (USE EXACTLY THIS FORMAT):\n\
    Foods: [comma separated food names]";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// Vision-model food recognizer backed by OpenRouter chat completions.
pub struct OpenRouterRecognizer {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterRecognizer {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// Remote images are passed through; local files are inlined as a data URL.
    fn image_url(&self, image: &ImageHandle) -> Result<String> {
        let handle = image.as_str().trim();
        if handle.starts_with("http://") || handle.starts_with("https://") {
            return Ok(handle.to_string());
        }

        let path = handle.strip_prefix("file://").unwrap_or(handle);
        let image_data = fs::read(path)
            .map_err(|e| SuggestionError::ImageUnavailable(format!("{}: {}", path, e)))?;
        let base64_image = general_purpose::STANDARD.encode(&image_data);

        log::debug!("📊 Image file size: {} bytes", image_data.len());
        log::debug!("🔄 Base64 encoded size: {} bytes", base64_image.len());

        // MIME type from the file extension
        let lower = path.to_lowercase();
        let mime_type = if lower.ends_with(".png") {
            "image/png"
        } else if lower.ends_with(".webp") {
            "image/webp"
        } else {
            "image/jpeg" // default
        };

        Ok(format!("data:{};base64,{}", mime_type, base64_image))
    }

    async fn request_detection(&self, image_url: String) -> anyhow::Result<String> {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    content_type: "text".to_string(),
                    text: DETECTION_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    content_type: "image_url".to_string(),
                    image_url: ImageData { url: image_url },
                },
            ],
        }];

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: 200,
        };

        log::info!("🤖 Sending request to OpenRouter with model: {}", self.model);
        log::debug!("📤 Request payload size: {} bytes", serde_json::to_string(&request)?.len());

        let response = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Fitness Tracker")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ OpenRouter API error response: {}", error_text);
            anyhow::bail!("OpenRouter API error ({}): {}", status, error_text);
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("OpenRouter response contained no choices")?;

        log::info!("💬 OpenRouter response content: {}", content);
        Ok(content)
    }

    fn parse_response(&self, response: &str) -> Vec<String> {
        let listed = response
            .lines()
            .map(str::trim)
            .find_map(|line| {
                line.strip_prefix("Foods:")
                    .or_else(|| line.strip_prefix("foods:"))
            });

        let Some(listed) = listed else {
            log::warn!("Could not find a 'Foods:' line in recognizer response");
            return Vec::new();
        };

        listed
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|food| food.trim().trim_matches('"').to_string())
            .filter(|food| !food.is_empty())
            .collect()
    }
}

#[async_trait::async_trait]
impl FoodRecognizer for OpenRouterRecognizer {
    async fn detect_foods(&self, image: &ImageHandle) -> Result<Vec<String>> {
        if image.is_empty() {
            return Err(SuggestionError::ImageUnavailable("empty image handle".to_string()));
        }

        log::debug!("📸 Starting image recognition for: {}", image.as_str());

        let image_url = self.image_url(image)?;
        let content = self.request_detection(image_url).await?;
        Ok(self.parse_response(&content))
    }
}
