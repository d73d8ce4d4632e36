//! Gemini client for exercise import

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::{ExerciseCandidate, ExerciseParser};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Upper bound for one import request, connect to last byte
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Calls `models/<model>:generateContent` with a JSON response schema
#[derive(Clone)]
pub struct GeminiParser {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiParser {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: client(REQUEST_TIMEOUT)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Replace the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = client(timeout)?;
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    async fn request(&self, text: &str) -> Result<Vec<ExerciseCandidate>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("no API key configured"))?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&request_body(text))
            .send()
            .await
            .context("import request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("import service answered {}", status);
        }

        let body: Value = response.json().await.context("import response is not JSON")?;
        extract_candidates(&body)
    }
}

impl ExerciseParser for GeminiParser {
    async fn parse(&self, text: &str) -> Vec<ExerciseCandidate> {
        match self.request(text).await {
            Ok(candidates) => {
                info!("Import service returned {} exercises", candidates.len());
                candidates
            }
            Err(e) => {
                error!("Error parsing workout text: {:#}", e);
                Vec::new()
            }
        }
    }
}

fn client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

fn prompt(text: &str) -> String {
    format!(
        "Transform this text into a JSON array of exercises: \"{text}\".\n\
         Rules:\n\
         - name: string\n\
         - sets: number (default 3)\n\
         - reps: string (like \"12\" or \"10-12\")\n\
         - restTime: number (in seconds, default 60)\n\
         - observation: string (extract any notes like 'slow' or 'drop set')"
    )
}

fn request_body(text: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt(text) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "sets": { "type": "NUMBER" },
                        "reps": { "type": "STRING" },
                        "restTime": { "type": "NUMBER" },
                        "observation": { "type": "STRING" }
                    },
                    "required": ["name", "sets", "reps", "restTime"]
                }
            }
        }
    })
}

/// Pull the exercise array out of a `generateContent` response
pub fn extract_candidates(body: &Value) -> Result<Vec<ExerciseCandidate>> {
    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("response has no text part"))?;

    let candidates: Vec<ExerciseCandidate> =
        serde_json::from_str(text.trim()).context("response text is not an exercise array")?;
    if candidates.is_empty() {
        warn!("Import service found no exercises in the text");
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn test_extract_candidates() {
        let body = wrap(
            r#" [{"name":"Squat","sets":4,"reps":"8","restTime":90,"observation":"heavy"},
                {"name":"Leg curl","sets":3,"reps":"10-12","restTime":60}] "#,
        );
        let candidates = extract_candidates(&body).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name.as_deref(), Some("Squat"));
        assert_eq!(candidates[0].sets, Some(4.0));
        assert_eq!(candidates[1].observation, None);
    }

    #[test]
    fn test_extract_rejects_wrong_shape() {
        assert!(extract_candidates(&json!({})).is_err());
        assert!(extract_candidates(&wrap("not json")).is_err());
        assert!(extract_candidates(&wrap(r#"{"name":"Squat"}"#)).is_err());
        assert!(extract_candidates(&wrap(r#"[{"sets":"four"}]"#)).is_err());
    }

    #[test]
    fn test_request_body_carries_text_and_schema() {
        let body = request_body("supino 4x10");
        let text = body.pointer("/contents/0/parts/0/text").and_then(Value::as_str).unwrap();
        assert!(text.contains("supino 4x10"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn test_endpoint() {
        let parser = GeminiParser::new("http://localhost:8080/v1beta/", "gemini-test", None).unwrap();
        assert_eq!(
            parser.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_key_yields_empty() {
        let parser = GeminiParser::new(DEFAULT_API_BASE, DEFAULT_MODEL, None).unwrap();
        assert!(parser.parse("rosca direta 3x12").await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_yields_empty() {
        let parser = GeminiParser::new("http://127.0.0.1:9", DEFAULT_MODEL, Some("key".into())).unwrap();
        assert!(parser.parse("rosca direta 3x12").await.is_empty());
    }

    #[tokio::test]
    async fn test_stalled_service_times_out_empty() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let parser = GeminiParser::new(format!("http://{}", addr), DEFAULT_MODEL, Some("key".into()))
            .unwrap()
            .with_timeout(Duration::from_millis(200))
            .unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), parser.parse("supino 4x10")).await;
        assert_eq!(result.ok().map(|c| c.len()), Some(0));
        server.abort();
    }
}
