//! Client for the external vision-capable chat-completion service. One
//! request per uploaded photo; the reply text is fence-stripped and parsed
//! as JSON.

use crate::settings::Settings;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

/// Fixed instruction sent alongside every photo
const TAG_PROMPT: &str = "Suggest OpenStreetMap tags for the primary subject in the given image. If there are opening hours visible in the image, return them in OpenStreetMap 'opening_hours' format. Remember: 'opening_hours' format MUST use two letter English abbreviations for days of the week. Only output JSON. Do not make up OpenStreetMap tags. If you find something that should have OpenStreetMap tags, set status to 'ok'. If nothing has OpenStreetMap tags, set status to 'not_found'. Output a JSON object with keys 'status' and 'tags'. 'tags' should be a simple object with tag key and tag value.";

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion service returned HTTP {0}: {1}")]
    Api(u16, String),

    #[error("completion reply carried no choices")]
    EmptyReply,

    #[error("completion reply was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

/// Shared handle to the completion service. Carries only the connection pool
/// and credentials; read-only after construction, so one instance serves all
/// requests.
#[derive(Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for VisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VisionClient {{ api_base: {}, model: {}, api_key: <redacted> }}",
            self.api_base, self.model
        )
    }
}

impl VisionClient {
    pub fn new(settings: &Settings) -> Self {
        VisionClient {
            http: reqwest::Client::new(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }

    /// Ask the model for OpenStreetMap tags for one normalized photo.
    ///
    /// `image_data_url` must already be transport-ready (see
    /// [`crate::imaging::prepare_for_inference`]). The reply's first choice
    /// is fence-stripped and parsed as JSON; the parsed value is returned
    /// as-is, shape unvalidated.
    pub async fn suggest_tags(&self, image_data_url: &str) -> Result<Value, VisionError> {
        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": TAG_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": image_data_url, "detail": "high" }
                    }
                ]
            }]
        });

        let url = format!("{}/chat/completions", self.api_base);
        debug!("requesting tag suggestions from {url} with model {}", self.model);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(VisionError::Api(status, text));
        }

        let completion: ChatCompletion = resp.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(VisionError::EmptyReply)?;

        info!("model replied with {} chars", content.len());
        parse_reply(&content)
    }
}

/// Strip markdown fence decoration from the reply and parse it as JSON
fn parse_reply(content: &str) -> Result<Value, VisionError> {
    Ok(serde_json::from_str(&strip_code_fences(content))?)
}

/// Remove every occurrence of the ```json and ``` fence markers, then trim
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let reply = "```json\n{\"status\":\"ok\"}\n```";
        assert_eq!(strip_code_fences(reply), "{\"status\":\"ok\"}");
    }

    #[test]
    fn strips_bare_fences() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn leaves_plain_replies_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n{\"status\":\"ok\",\"tags\":{\"shop\":\"bakery\"}}\n```";
        let value = parse_reply(reply).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["tags"]["shop"], "bakery");
    }

    #[test]
    fn parses_unfenced_reply() {
        let value = parse_reply("{\"status\":\"not_found\",\"tags\":{}}").unwrap();
        assert_eq!(value["status"], "not_found");
    }

    #[test]
    fn rejects_prose_replies() {
        let err = parse_reply("I cannot identify anything taggable here.").unwrap_err();
        assert!(matches!(err, VisionError::Parse(_)));
    }

    #[test]
    fn malformed_json_shape_is_still_returned() {
        // The reply is valid JSON but not the expected status/tags shape;
        // it is passed through untouched.
        let value = parse_reply("{\"unexpected\": [1, 2, 3]}").unwrap();
        assert_eq!(value["unexpected"][2], 3);
    }
}
