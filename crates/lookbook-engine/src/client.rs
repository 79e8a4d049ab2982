use std::error::Error as StdError;
use std::fmt;

use anyhow::{Context, Result};
use lookbook_contracts::assets::ImageAsset;
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config::StudioConfig;
use crate::credentials::ApiCredential;
use crate::outcome::{FailureKind, GenerationResult};

pub const OUTPUT_ASPECT_RATIO: &str = "3:4";
pub const INPUT_MIME: &str = "image/jpeg";
pub const OUTPUT_MIME: &str = "image/png";
pub const REFUSAL_PREVIEW_CHARS: usize = 100;
pub const EMPTY_RESPONSE_REASON: &str =
    "No image data found in response. The model may have filtered the request.";

const API_KEY_HEADER: &str = "x-goog-api-key";
const ERROR_BODY_PREVIEW_CHARS: usize = 512;

/// One output part of a candidate, in response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Image {
        data: String,
        mime_type: Option<String>,
    },
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<WirePart>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, alias = "inline_data")]
    inline_data: Option<InlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default, alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl WirePart {
    fn into_part(self) -> Option<ResponsePart> {
        if let Some(inline) = self.inline_data {
            if let Some(data) = inline.data.filter(|data| !data.is_empty()) {
                return Some(ResponsePart::Image {
                    data,
                    mime_type: inline.mime_type,
                });
            }
        }
        self.text
            .filter(|text| !text.is_empty())
            .map(ResponsePart::Text)
    }
}

/// Non-2xx answer from the generation endpoint.
#[derive(Debug)]
pub struct HttpStatusError {
    pub provider: String,
    pub status: u16,
    pub body: String,
}

impl HttpStatusError {
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self.status, 401 | 403)
            || self.body.contains("API_KEY_INVALID")
            || self.body.contains("API key not valid")
    }
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} request failed ({}): {}",
            self.provider,
            self.status,
            truncate_chars(&self.body, ERROR_BODY_PREVIEW_CHARS)
        )
    }
}

impl StdError for HttpStatusError {}

/// Request body for one composite: instruction first, then the model image,
/// then the product image, asking for a 3:4 portrait.
pub fn build_request_body(
    instruction: &str,
    model_image: &ImageAsset,
    product_image: &ImageAsset,
) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": instruction },
                inline_image_part(model_image),
                inline_image_part(product_image),
            ],
        }],
        "generationConfig": {
            "imageConfig": {
                "aspectRatio": OUTPUT_ASPECT_RATIO,
            },
        },
    })
}

/// Inputs are always declared as JPEG, which is what the resizer emits.
fn inline_image_part(asset: &ImageAsset) -> Value {
    json!({
        "inlineData": {
            "mimeType": INPUT_MIME,
            "data": asset.to_base64(),
        }
    })
}

/// Parts of the first candidate. A payload without candidates, content or
/// parts yields an empty list; a payload of the wrong shape is an error.
pub fn response_parts(payload: Value) -> Result<Vec<ResponsePart>> {
    let response: GenerateContentResponse =
        serde_json::from_value(payload).context("Gemini response has an unexpected shape")?;
    let parts = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .unwrap_or_default();
    Ok(parts.into_iter().filter_map(WirePart::into_part).collect())
}

/// Scans the parts once, in order. The first image wins; otherwise any text is
/// read as a refusal; otherwise the response is empty.
pub fn classify_parts(parts: Vec<ResponsePart>) -> GenerationResult {
    let mut text = String::new();
    for part in parts {
        match part {
            ResponsePart::Image { data, .. } => {
                return match ImageAsset::from_base64(&data, OUTPUT_MIME) {
                    Ok(image) => GenerationResult::Success { image },
                    Err(err) => GenerationResult::failure(
                        FailureKind::Transport,
                        error_chain_text(&err, ERROR_BODY_PREVIEW_CHARS),
                    ),
                };
            }
            ResponsePart::Text(fragment) => text.push_str(&fragment),
        }
    }
    if !text.is_empty() {
        return GenerationResult::Refusal {
            explanation: truncate_chars(&text, REFUSAL_PREVIEW_CHARS),
        };
    }
    GenerationResult::failure(FailureKind::EmptyResponse, EMPTY_RESPONSE_REASON)
}

pub fn classify_response(payload: Value) -> GenerationResult {
    match response_parts(payload) {
        Ok(parts) => classify_parts(parts),
        Err(err) => failure_from_error(&err),
    }
}

/// One-shot client bound to a single credential. Build a new one for every
/// generation so a newly selected key is always used.
pub struct GeminiClient {
    endpoint: String,
    credential: ApiCredential,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(config: &StudioConfig, credential: ApiCredential) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            endpoint: config.endpoint(),
            credential,
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn generate(
        &self,
        model_image: &ImageAsset,
        product_image: &ImageAsset,
        instruction: &str,
    ) -> GenerationResult {
        let body = build_request_body(instruction, model_image, product_image);
        info!(
            endpoint = %self.endpoint,
            model_bytes = model_image.len(),
            product_bytes = product_image.len(),
            instruction_chars = instruction.chars().count(),
            "sending generation request"
        );
        let result = match self.post(&body) {
            Ok(payload) => classify_response(payload),
            Err(err) => failure_from_error(&err),
        };
        if let GenerationResult::Failure {
            kind: kind @ (FailureKind::Transport | FailureKind::Credential),
            reason,
        } = &result
        {
            error!(%kind, "Gemini image generation error: {reason}");
        }
        result
    }

    fn post(&self, body: &Value) -> Result<Value> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.credential.expose())
            .json(body)
            .send()
            .with_context(|| format!("Gemini request failed ({})", self.endpoint))?;
        response_json_or_error("Gemini", response)
    }
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        return Err(HttpStatusError {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        }
        .into());
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

fn failure_from_error(err: &anyhow::Error) -> GenerationResult {
    let credential_rejected = err.chain().any(|cause| {
        cause
            .downcast_ref::<HttpStatusError>()
            .map(HttpStatusError::is_credential_rejection)
            .unwrap_or(false)
    });
    let kind = if credential_rejected {
        FailureKind::Credential
    } else {
        FailureKind::Transport
    };
    GenerationResult::failure(kind, error_chain_text(err, ERROR_BODY_PREVIEW_CHARS))
}

fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parts
            .last()
            .map(|existing| existing == trimmed)
            .unwrap_or(false)
        {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_chars(&err.to_string(), max_chars);
    }
    truncate_chars(&parts.join(" | caused by: "), max_chars)
}

/// First `max_chars` code points.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use serde_json::json;

    use super::*;
    use crate::test_support::{capture_logs, serve_once};

    fn asset(bytes: &[u8]) -> ImageAsset {
        ImageAsset::new(bytes.to_vec(), "image/jpeg")
    }

    fn client_for(api_base: String) -> anyhow::Result<GeminiClient> {
        let config = StudioConfig {
            api_base,
            ..StudioConfig::default()
        };
        GeminiClient::new(&config, ApiCredential::new("test-key").expect("non-empty key"))
    }

    #[test]
    fn request_body_orders_text_then_model_then_product() {
        let body = build_request_body("do it", &asset(b"model"), &asset(b"product"));
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], json!("do it"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], json!("image/jpeg"));
        assert_eq!(parts[1]["inlineData"]["data"], json!("bW9kZWw="));
        assert_eq!(parts[2]["inlineData"]["data"], json!("cHJvZHVjdA=="));
        assert_eq!(body["contents"][0]["role"], json!("user"));
        assert_eq!(
            body["generationConfig"]["imageConfig"]["aspectRatio"],
            json!("3:4")
        );
    }

    #[test]
    fn png_input_is_still_declared_as_jpeg() {
        let png = ImageAsset::new(b"raw".to_vec(), "image/png");
        let body = build_request_body("x", &png, &png);
        assert_eq!(
            body["contents"][0]["parts"][2]["inlineData"]["mimeType"],
            json!("image/jpeg")
        );
    }

    #[test]
    fn first_inline_image_becomes_png_data_url() {
        let payload = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here you go" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "aGVsbG8=" } },
                        { "inlineData": { "mimeType": "image/png", "data": "c2Vjb25k" } }
                    ]
                }
            }]
        });
        let result = classify_response(payload);
        assert_eq!(
            result.image_data_url().as_deref(),
            Some("data:image/png;base64,aGVsbG8=")
        );
    }

    #[test]
    fn snake_case_inline_data_is_accepted() -> anyhow::Result<()> {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "inline_data": { "mime_type": "image/png", "data": "aGk=" } }] }
            }]
        });
        let parts = response_parts(payload)?;
        assert_eq!(
            parts,
            vec![ResponsePart::Image {
                data: "aGk=".to_string(),
                mime_type: Some("image/png".to_string()),
            }]
        );
        Ok(())
    }

    #[test]
    fn text_only_response_is_a_truncated_refusal() {
        let long = "x".repeat(150);
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I cannot " }, { "text": long }] }
            }]
        });
        match classify_response(payload) {
            GenerationResult::Refusal { explanation } => {
                assert_eq!(explanation.chars().count(), 100);
                assert!(explanation.starts_with("I cannot xxx"));
            }
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    #[test]
    fn refusal_truncation_counts_code_points() {
        let text = "é".repeat(120);
        let result = classify_parts(vec![ResponsePart::Text(text)]);
        assert_eq!(
            result,
            GenerationResult::Refusal {
                explanation: "é".repeat(100)
            }
        );
    }

    #[test]
    fn empty_candidates_and_empty_parts_are_filtered_failures() {
        for payload in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "" }, { "inlineData": { "data": "" } }] } }] }),
        ] {
            let result = classify_response(payload.clone());
            assert_eq!(
                result,
                GenerationResult::failure(FailureKind::EmptyResponse, EMPTY_RESPONSE_REASON),
                "{payload}"
            );
        }
    }

    #[test]
    fn only_the_first_candidate_is_read() {
        let payload = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "blocked" }] } },
                { "content": { "parts": [{ "inlineData": { "data": "aGVsbG8=" } }] } }
            ]
        });
        assert!(matches!(
            classify_response(payload),
            GenerationResult::Refusal { .. }
        ));
    }

    #[test]
    fn malformed_payload_and_bad_base64_are_transport_failures() {
        let malformed = classify_response(json!({ "candidates": "nope" }));
        assert_eq!(malformed.failure_kind(), Some(FailureKind::Transport));

        let bad_data = classify_parts(vec![ResponsePart::Image {
            data: "***".to_string(),
            mime_type: None,
        }]);
        assert_eq!(bad_data.failure_kind(), Some(FailureKind::Transport));
    }

    #[test]
    fn credential_rejections_are_classified() {
        let unauthorized = HttpStatusError {
            provider: "Gemini".to_string(),
            status: 403,
            body: "{}".to_string(),
        };
        assert!(unauthorized.is_credential_rejection());
        let invalid_key = HttpStatusError {
            provider: "Gemini".to_string(),
            status: 400,
            body: "{\"error\":{\"details\":[{\"reason\":\"API_KEY_INVALID\"}]}}".to_string(),
        };
        assert!(invalid_key.is_credential_rejection());
        let server = HttpStatusError {
            provider: "Gemini".to_string(),
            status: 500,
            body: "oops".to_string(),
        };
        assert!(!server.is_credential_rejection());
        assert_eq!(server.to_string(), "Gemini request failed (500): oops");

        let result = failure_from_error(&anyhow::Error::new(invalid_key));
        assert_eq!(result.failure_kind(), Some(FailureKind::Credential));
    }

    #[test]
    fn client_posts_payload_and_parses_image() -> anyhow::Result<()> {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }] } }]
        })
        .to_string();
        let (base, server) = serve_once("200 OK", body);
        let client = client_for(base)?;

        let result = client.generate(&asset(b"model"), &asset(b"product"), "compose it");
        let request = server.join().unwrap_or_default();

        assert_eq!(
            result.image_data_url().as_deref(),
            Some("data:image/png;base64,aGVsbG8=")
        );
        assert!(request.starts_with("POST /models/gemini-2.5-flash-image:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(!request.contains("key=test-key"));
        assert!(request.contains("\"aspectRatio\":\"3:4\""));
        assert!(request.contains("compose it"));
        Ok(())
    }

    #[test]
    fn client_maps_rejected_key_to_credential_failure() -> anyhow::Result<()> {
        let (base, server) = serve_once(
            "400 Bad Request",
            json!({ "error": { "message": "API key not valid. Please pass a valid API key." } })
                .to_string(),
        );
        let client = client_for(base)?;
        let result = client.generate(&asset(b"m"), &asset(b"p"), "x");
        let _ = server.join();

        assert_eq!(result.failure_kind(), Some(FailureKind::Credential));
        assert!(result
            .user_message()
            .unwrap_or_default()
            .contains("Gemini request failed (400)"));
        Ok(())
    }

    #[test]
    fn malformed_success_body_is_logged_as_an_error() -> anyhow::Result<()> {
        let (base, server) = serve_once("200 OK", json!({ "candidates": "nope" }).to_string());
        let client = client_for(base)?;

        let (result, logs) = capture_logs(|| client.generate(&asset(b"m"), &asset(b"p"), "x"));
        let _ = server.join();

        assert_eq!(result.failure_kind(), Some(FailureKind::Transport));
        assert!(logs.contains("ERROR"), "logs: {logs}");
        assert!(logs.contains("unexpected shape"), "logs: {logs}");
        Ok(())
    }

    #[test]
    fn refusal_is_not_logged_as_an_error() -> anyhow::Result<()> {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "I can't make that." }] } }]
        })
        .to_string();
        let (base, server) = serve_once("200 OK", body);
        let client = client_for(base)?;

        let (result, logs) = capture_logs(|| client.generate(&asset(b"m"), &asset(b"p"), "x"));
        let _ = server.join();

        assert_eq!(result.outcome_label(), "refused");
        assert!(!logs.contains("ERROR"), "logs: {logs}");
        Ok(())
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_failure() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let client = client_for(format!("http://{addr}"))?;
        let result = client.generate(&asset(b"m"), &asset(b"p"), "x");
        assert_eq!(result.failure_kind(), Some(FailureKind::Transport));
        assert!(result
            .user_message()
            .unwrap_or_default()
            .starts_with("Gemini request failed"));
        Ok(())
    }
}
