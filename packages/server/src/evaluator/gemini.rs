use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{
    Attachment, Evaluation, EvaluationRequest, EvaluatorError, SignEvaluator, system_prompt,
};
use crate::config::GeminiConfig;

/// Gemini `generateContent` over REST.
pub struct GeminiEvaluator {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiEvaluator {
    pub fn new(config: &GeminiConfig) -> Result<Self, EvaluatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EvaluatorError::Transport(format!("failed to build HTTP client: {e}")))?;

        let model = if config.model.starts_with("models/") {
            config.model.clone()
        } else {
            format!("models/{}", config.model)
        };
        let url = format!(
            "{}/{model}:generateContent",
            config.endpoint.trim_end_matches('/')
        );

        Ok(Self {
            client,
            url,
            api_key: config.api_key.clone(),
            model,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn build_body(&self, request: &EvaluationRequest<'_>) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(system_prompt(request.letter))],
            },
            // Reference first, then the photo being judged.
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part::inline(request.reference),
                    Part::inline(request.photo),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl SignEvaluator for GeminiEvaluator {
    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, letter = request.letter))]
    async fn evaluate(&self, request: EvaluationRequest<'_>) -> Result<Evaluation, EvaluatorError> {
        let body = self.build_body(&request);

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EvaluatorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "model request rejected");
            return Err(EvaluatorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| EvaluatorError::Decode(e.to_string()))?;

        let evaluation = parsed.into_evaluation();
        debug!(
            has_text = evaluation.result_text.is_some(),
            finish_reason = ?evaluation.finish_reason,
            "model answered"
        );
        Ok(evaluation)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
    },
}

impl Part {
    fn text(text: String) -> Self {
        Part::Text(text)
    }

    fn inline(attachment: Attachment<'_>) -> Self {
        Part::InlineData {
            mime_type: attachment.mime_type.to_string(),
            data: STANDARD.encode(attachment.data),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate plus the reason generation stopped. A
    /// prompt blocked before any candidate was produced reports its block
    /// reason instead.
    fn into_evaluation(self) -> Evaluation {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Evaluation {
                result_text: None,
                finish_reason: block_reason,
            };
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Evaluation {
            result_text: (!text.trim().is_empty()).then_some(text),
            finish_reason: candidate.finish_reason.or(block_reason),
        }
    }
}
