use serde::{Deserialize, Serialize};

/// Token limit used when the caller does not send `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// How a backend wants the image handed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Raw decoded bytes, serialized as an array of integers.
    Bytes,
    /// The caller's data URI, forwarded untouched.
    DataUri,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImagePayload {
    Bytes(Vec<u8>),
    DataUri(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceInput {
    pub prompt: String,
    pub image: ImagePayload,
    pub max_tokens: u32,
}

/// The model's answer. Fields other than `description` are carried through
/// untouched so the caller sees the downstream object as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub description: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Description {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub image: ImagePayload,
}

/// Body posted to either backend. The binding endpoint also needs the model
/// name in the body; the REST endpoint carries it in the URL.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl RunRequest {
    pub fn new(input: InferenceInput, model: Option<String>) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: input.prompt,
                image: input.image,
            }],
            max_tokens: input.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEntry {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response envelope returned by the account-scoped REST endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RunEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub result: Option<Description>,
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

impl RunEnvelope {
    /// Message of the first error entry, if the downstream sent one.
    pub fn first_error(&self) -> Option<&str> {
        self.errors
            .first()
            .and_then(|entry| entry.message.as_deref())
            .filter(|message| !message.is_empty())
    }
}

/// Pulls a human readable error out of a downstream error body. Accepts a
/// top-level `message` or `error` string, or the first `errors[]` entry.
pub fn extract_error_details(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;

    let direct = ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str));
    let first_entry = || {
        value
            .get("errors")?
            .get(0)?
            .get("message")?
            .as_str()
    };

    direct
        .or_else(first_entry)
        .filter(|details| !details.is_empty())
        .map(str::to_string)
}
