//! Gemini `generateContent` client.

use crate::config::GeminiConfig;
use crate::error::LlmError;
use crate::llm::CompletionProvider;
use crate::ConversationTurn;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Client for the Gemini REST API.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn generate(&self, turns: &[ConversationTurn]) -> Result<Option<String>, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let request = build_request(turns);

        tracing::debug!(model = %self.config.model, turns = turns.len(), "querying gemini");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .pointer("/error/message")
                .and_then(|value| value.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("gemini returned status {}", status.as_u16()));
            let code = body
                .pointer("/error/status")
                .and_then(|value| value.as_str())
                .unwrap_or("unknown")
                .to_string();
            return Err(LlmError::Api { code, message });
        }

        let body: GenerateContentResponse = response.json().await?;
        Ok(extract_text(&body))
    }
}

fn build_request(turns: &[ConversationTurn]) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: turns
            .iter()
            .map(|turn| Content {
                role: turn.role.as_str(),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect(),
        // Web-search grounding is always on for this bot.
        tools: vec![Tool {
            google_search: GoogleSearch {},
        }],
    }
}

/// First candidate's text parts, joined. `None` when the response carries no
/// candidates or no usable text.
fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let joined = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n");
    if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use indoc::indoc;

    #[test]
    fn request_carries_roles_and_the_search_tool() {
        let turns = vec![
            ConversationTurn {
                role: Role::User,
                text: "what is 2+2?".into(),
            },
            ConversationTurn {
                role: Role::Model,
                text: "4".into(),
            },
        ];

        let value = serde_json::to_value(build_request(&turns)).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "what is 2+2?");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["tools"][0]["google_search"], serde_json::json!({}));
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = indoc! {r#"
            {
              "candidates": [
                {
                  "content": {
                    "role": "model",
                    "parts": [{ "text": "4" }]
                  },
                  "finishReason": "STOP"
                }
              ]
            }
        "#};

        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(&response).as_deref(), Some("4"));
    }

    #[test]
    fn joins_multiple_text_parts() {
        let raw = indoc! {r#"
            {
              "candidates": [
                {
                  "content": {
                    "parts": [{ "text": "line one" }, { "text": "line two" }]
                  }
                }
              ]
            }
        "#};

        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            extract_text(&response).as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn no_candidates_means_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_text(&response), None);
    }

    #[test]
    fn textless_parts_mean_no_text() {
        let raw = indoc! {r#"
            {
              "candidates": [
                {
                  "content": {
                    "parts": [{ "functionCall": { "name": "lookup" } }]
                  }
                }
              ]
            }
        "#};

        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(&response), None);
    }
}
