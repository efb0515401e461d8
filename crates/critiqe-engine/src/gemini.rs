use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::{CancelToken, ImageGenerator, TextModel};
use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::request::{GenerationRequest, ImageHandle};

pub const NO_IMAGE_REASON: &str = "No image was generated. The model might have refused the request due to safety policies or an invalid prompt.";

const API_KEY_HEADER: &str = "x-goog-api-key";
const ERROR_BODY_MAX_CHARS: usize = 512;

/// Gemini `generateContent` transport for both image generation and prompt
/// drafting.
pub struct GeminiClient {
    config: StudioConfig,
    http: HttpClient,
    cancel: CancelToken,
}

impl GeminiClient {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            config: config.clone(),
            http: HttpClient::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Token checked around every call. Once cancelled it stays cancelled
    /// until reset; `Session::with_cancel_token` does that per admission.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn api_key(&self) -> StudioResult<String> {
        self.config.resolve_api_key().ok_or(StudioError::AuthMissing)
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!(
            "{}/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model_path
        )
    }

    pub(crate) fn build_image_payload(request: &GenerationRequest) -> Value {
        let mut parts: Vec<Value> = request
            .reference_images
            .iter()
            .map(|image| {
                json!({
                    "inlineData": {
                        "mimeType": image.mime_type,
                        "data": image.base64(),
                    }
                })
            })
            .collect();
        parts.push(json!({ "text": request.instruction }));

        json!({
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": {
                    "aspectRatio": request.aspect_ratio.as_str(),
                },
            },
        })
    }

    pub(crate) fn build_text_payload(prompt: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "responseMimeType": "text/plain",
            },
        })
    }

    fn post(&self, model: &str, payload: &Value) -> StudioResult<Value> {
        let api_key = self.api_key()?;
        if self.cancel.is_cancelled() {
            return Err(StudioError::Cancelled);
        }
        let endpoint = self.endpoint_for_model(model);
        let timeout = self.config.request_timeout();

        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .timeout(timeout)
            .json(payload)
            .send()
            .map_err(|err| transport_error(err, timeout))?;
        let parsed = response_json_or_error(response, timeout)?;

        if self.cancel.is_cancelled() {
            warn!(model, "discarding response of cancelled request");
            return Err(StudioError::Cancelled);
        }
        Ok(parsed)
    }

    /// First inline image part of the first candidate.
    pub(crate) fn extract_image_handle(response: &Value) -> StudioResult<ImageHandle> {
        let candidate = response
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|rows| rows.first());
        let parts = candidate
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for part in &parts {
            let Some(inline) = part
                .get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(Value::as_object)
            else {
                continue;
            };
            let data = inline
                .get("data")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if data.is_empty() {
                continue;
            }
            if BASE64.decode(data.as_bytes()).is_err() {
                return Err(StudioError::GenerationFailed(
                    "The model returned image data that could not be decoded.".to_string(),
                ));
            }
            let mime_type = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or("image/png");
            return Ok(ImageHandle::from_base64(mime_type, data));
        }

        Err(StudioError::GenerationFailed(no_image_reason(
            response, candidate, &parts,
        )))
    }

    pub(crate) fn extract_text(response: &Value) -> String {
        response
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|rows| rows.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect::<Vec<&str>>()
                    .join("")
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

impl ImageGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &GenerationRequest) -> StudioResult<ImageHandle> {
        let model = self.config.image_model.as_str();
        info!(
            model,
            references = request.reference_images.len(),
            aspect_ratio = %request.aspect_ratio,
            prompt_chars = request.instruction.chars().count(),
            "requesting image generation"
        );
        let payload = Self::build_image_payload(request);
        let response = self.post(model, &payload)?;
        let handle = Self::extract_image_handle(&response).inspect_err(|err| {
            warn!(model, error = %err, "generation returned no image");
        })?;
        info!(model, image = %handle, "image generated");
        Ok(handle)
    }
}

impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn complete(&self, prompt: &str) -> StudioResult<String> {
        let model = self.config.text_model.as_str();
        info!(model, prompt_chars = prompt.chars().count(), "requesting prompt draft");
        let payload = Self::build_text_payload(prompt);
        let response = self.post(model, &payload)?;
        Ok(Self::extract_text(&response))
    }
}

fn no_image_reason(response: &Value, candidate: Option<&Value>, parts: &[Value]) -> String {
    let mut details = Vec::new();
    if let Some(reason) = response
        .get("promptFeedback")
        .and_then(|feedback| feedback.get("blockReason"))
        .and_then(Value::as_str)
    {
        details.push(format!("blocked: {reason}"));
    }
    if let Some(reason) = candidate
        .and_then(|candidate| candidate.get("finishReason"))
        .and_then(Value::as_str)
        .filter(|reason| *reason != "STOP")
    {
        details.push(format!("finish reason: {reason}"));
    }
    let model_text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<&str>>()
        .join(" ");
    if !model_text.trim().is_empty() {
        details.push(format!("model said: {}", truncate_text(model_text.trim(), 200)));
    }
    if details.is_empty() {
        NO_IMAGE_REASON.to_string()
    } else {
        format!("{NO_IMAGE_REASON} ({})", details.join("; "))
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> StudioError {
    if err.is_timeout() {
        return StudioError::TransportError(format!(
            "Gemini request timed out after {}s",
            timeout.as_secs()
        ));
    }
    StudioError::TransportError(format!("Gemini request failed: {}", err.without_url()))
}

fn response_json_or_error(response: HttpResponse, timeout: Duration) -> StudioResult<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .map_err(|err| transport_error(err, timeout))?;
    if !status.is_success() {
        return Err(StudioError::TransportError(format!(
            "Gemini request failed ({code}): {}",
            truncate_text(&body, ERROR_BODY_MAX_CHARS)
        )));
    }
    serde_json::from_str(&body).map_err(|err| {
        StudioError::TransportError(format!("Gemini returned invalid JSON payload: {err}"))
    })
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
