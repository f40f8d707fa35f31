use super::{
    Description, ImageEncoding, InferenceInput, InferenceProvider, RunRequest,
    extract_error_details,
};
use crate::{Error, Result, config::ProviderConfig};
use async_trait::async_trait;
use tracing::debug;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Calls a managed inference binding. The binding is reached over a local
/// endpoint that authenticates on our behalf, takes the model name in the
/// body, and wants the image as raw bytes.
///
/// Every failure, including transport faults, surfaces as [`Error::Model`]
/// without a status, so callers answer it with a 500.
pub struct BindingProvider {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl BindingProvider {
    pub fn new(http: reqwest::Client, config: &ProviderConfig) -> Result<Self> {
        let url = config
            .binding_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::config("Binding provider requires binding_url"))?;

        Ok(Self {
            http,
            url,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl InferenceProvider for BindingProvider {
    fn image_encoding(&self) -> ImageEncoding {
        ImageEncoding::Bytes
    }

    async fn infer(&self, input: InferenceInput) -> Result<Description> {
        let body = RunRequest::new(input, Some(self.model.clone()));

        debug!(
            "Calling inference binding for model {} with max_tokens {}",
            self.model, body.max_tokens
        );

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::model(None, e.without_url().to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::model(None, e.without_url().to_string()))?;

        if !status.is_success() {
            let details =
                extract_error_details(&bytes).unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            return Err(Error::model(None, details));
        }

        serde_json::from_slice::<Description>(&bytes)
            .map_err(|e| Error::model(None, format!("Unexpected binding response: {}", e)))
    }
}
