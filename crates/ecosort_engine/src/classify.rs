use std::time::Duration;

use ecosort_core::{BinColor, ClassificationResult, ImageArtifact, WasteCategory};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{ClassifyError, FailureKind};

const PROMPT: &str = "Analyze this photo of waste as a smart trash bin. Identify the item, \
choose the correct bin (blue = recyclable, green = organic, red = hazardous, gray = residual) \
and answer in JSON.";

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &ImageArtifact) -> Result<ClassificationResult, ClassifyError>;
}

/// Calls Gemini `generateContent` with the image inline and a response schema.
#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    settings: ClassifierSettings,
}

impl GeminiClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ClassifyError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ClassifyError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self) -> Result<reqwest::Url, ClassifyError> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );
        reqwest::Url::parse(&raw)
            .map_err(|err| ClassifyError::new(FailureKind::InvalidEndpoint, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(&self, image: &ImageArtifact) -> Result<ClassificationResult, ClassifyError> {
        if self.settings.api_key.is_empty() {
            return Err(ClassifyError::new(
                FailureKind::MissingApiKey,
                "set ECOSORT_API_KEY or GEMINI_API_KEY",
            ));
        }
        let url = self.endpoint()?;
        let client = self.build_client()?;
        let body = serde_json::to_vec(&build_request(image))
            .map_err(|err| ClassifyError::new(FailureKind::Malformed, err.to_string()))?;

        let response = client
            .post(url)
            .header("x-goog-api-key", &self.settings.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ClassifyError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ClassifyError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        parse_response(&bytes)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// The answer as the model writes it, before range and enum checks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClassification {
    item_name: String,
    category: String,
    bin_color: String,
    confidence: f64,
    explanation: String,
    tip: String,
    eco_points: f64,
}

fn build_request(image: &ImageArtifact) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part {
                    inline_data: Some(InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.base64(),
                    }),
                    text: None,
                },
                Part {
                    inline_data: None,
                    text: Some(PROMPT.to_string()),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
        },
    }
}

fn response_schema() -> serde_json::Value {
    let categories: Vec<_> = WasteCategory::ALL.iter().map(|c| c.as_str()).collect();
    let colors: Vec<_> = BinColor::ALL.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "itemName": { "type": "STRING", "description": "Common name of the item." },
            "category": { "type": "STRING", "enum": categories },
            "binColor": { "type": "STRING", "enum": colors },
            "confidence": { "type": "NUMBER", "description": "Confidence from 0 to 1." },
            "explanation": { "type": "STRING", "description": "Short reason for the category." },
            "tip": { "type": "STRING", "description": "What to do before throwing it away." },
            "ecoPoints": { "type": "NUMBER", "description": "Points from 10 to 50." }
        },
        "required": ["itemName", "category", "binColor", "confidence", "explanation", "tip", "ecoPoints"]
    })
}

fn parse_response(bytes: &[u8]) -> Result<ClassificationResult, ClassifyError> {
    let envelope: GenerateResponse = serde_json::from_slice(bytes)
        .map_err(|err| ClassifyError::new(FailureKind::Malformed, err.to_string()))?;
    let text = envelope
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ClassifyError::new(FailureKind::EmptyResponse, "no text in response"))?;

    let wire: WireClassification = serde_json::from_str(&text)
        .map_err(|err| ClassifyError::new(FailureKind::Malformed, err.to_string()))?;
    into_result(wire)
}

fn into_result(wire: WireClassification) -> Result<ClassificationResult, ClassifyError> {
    let category = WasteCategory::parse(&wire.category).ok_or_else(|| {
        ClassifyError::new(
            FailureKind::Malformed,
            format!("unknown category {:?}", wire.category),
        )
    })?;
    let bin_color = BinColor::parse(&wire.bin_color).ok_or_else(|| {
        ClassifyError::new(
            FailureKind::Malformed,
            format!("unknown bin color {:?}", wire.bin_color),
        )
    })?;
    if !wire.eco_points.is_finite() || wire.eco_points < 0.0 {
        return Err(ClassifyError::new(
            FailureKind::Malformed,
            format!("eco points out of range: {}", wire.eco_points),
        ));
    }
    let result = ClassificationResult {
        item_name: wire.item_name.trim().to_string(),
        category,
        bin_color,
        confidence: wire.confidence,
        explanation: wire.explanation,
        tip: wire.tip,
        eco_points: wire.eco_points.round() as u64,
    };
    validate(&result)?;
    Ok(result)
}

/// Checks the invariants every accepted result must satisfy, whatever the source.
pub fn validate(result: &ClassificationResult) -> Result<(), ClassifyError> {
    if result.item_name.trim().is_empty() {
        return Err(ClassifyError::new(FailureKind::Malformed, "empty item name"));
    }
    if !(0.0..=1.0).contains(&result.confidence) {
        return Err(ClassifyError::new(
            FailureKind::Malformed,
            format!("confidence out of range: {}", result.confidence),
        ));
    }
    Ok(())
}

fn map_reqwest_error(err: reqwest::Error) -> ClassifyError {
    if err.is_timeout() {
        return ClassifyError::new(FailureKind::Timeout, err.to_string());
    }
    ClassifyError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(text: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
        .unwrap()
    }

    #[test]
    fn parses_well_formed_answer() {
        let body = envelope(
            r#"{"itemName":"Plastic Bottle","category":"Recyclable","binColor":"blue",
                "confidence":0.93,"explanation":"PET","tip":"Crush it","ecoPoints":35}"#,
        );
        let result = parse_response(&body).unwrap();
        assert_eq!(result.category, WasteCategory::Recyclable);
        assert_eq!(result.bin_color, BinColor::Blue);
        assert_eq!(result.eco_points, 35);
    }

    #[test]
    fn fractional_points_are_rounded() {
        let body = envelope(
            r#"{"itemName":"Leaf","category":"Organic","binColor":"green",
                "confidence":1,"explanation":"","tip":"","ecoPoints":12.6}"#,
        );
        assert_eq!(parse_response(&body).unwrap().eco_points, 13);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for text in [
            r#"{"itemName":"X","category":"Organic","binColor":"green","confidence":1.4,"explanation":"","tip":"","ecoPoints":10}"#,
            r#"{"itemName":"X","category":"Organic","binColor":"green","confidence":0.5,"explanation":"","tip":"","ecoPoints":-3}"#,
            r#"{"itemName":"X","category":"Plastic","binColor":"green","confidence":0.5,"explanation":"","tip":"","ecoPoints":10}"#,
            r#"{"itemName":"X","category":"Organic","binColor":"purple","confidence":0.5,"explanation":"","tip":"","ecoPoints":10}"#,
            r#"{"itemName":" ","category":"Organic","binColor":"green","confidence":0.5,"explanation":"","tip":"","ecoPoints":10}"#,
            r#"{"itemName":"X","category":"Organic"}"#,
        ] {
            let err = parse_response(&envelope(text)).unwrap_err();
            assert_eq!(err.kind, FailureKind::Malformed, "{text}");
        }
    }

    #[test]
    fn missing_text_is_an_empty_response() {
        let body = serde_json::to_vec(&json!({ "candidates": [] })).unwrap();
        assert_eq!(
            parse_response(&body).unwrap_err().kind,
            FailureKind::EmptyResponse
        );
    }

    #[test]
    fn request_carries_image_inline() {
        let image = ImageArtifact::new("image/png", vec![1, 2, 3]);
        let value = serde_json::to_value(build_request(&image)).unwrap();
        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "AQID");
        assert!(parts[1]["text"].as_str().unwrap().contains("bin"));
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            value["generationConfig"]["responseSchema"]["required"]
                .as_array()
                .unwrap()
                .len(),
            7
        );
    }
}
