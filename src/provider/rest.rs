use super::{
    Description, ImageEncoding, InferenceInput, InferenceProvider, RunEnvelope, RunRequest,
    extract_error_details,
};
use crate::{Error, Result, config::ProviderConfig};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use tracing::{debug, warn};

const UNKNOWN_ERROR: &str = "Unknown error";

/// Calls the account-scoped `ai/run` REST endpoint with a bearer token.
///
/// The data URI is forwarded as-is. A non-2xx answer becomes
/// [`Error::Model`] carrying the downstream status; transport faults stay
/// [`Error::Network`]. The endpoint embeds the account id, so it is kept out
/// of logs and error text.
pub struct RestProvider {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_token: Secret<String>,
}

impl RestProvider {
    pub fn new(http: reqwest::Client, config: &ProviderConfig) -> Result<Self> {
        let account_id = config
            .account_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::config("REST provider requires an account id"))?;
        let api_token = config
            .api_token
            .clone()
            .ok_or_else(|| Error::config("REST provider requires an API token"))?;

        let endpoint = format!(
            "{}/accounts/{}/ai/run/{}",
            config.base_url.trim_end_matches('/'),
            account_id,
            config.model.trim_start_matches('/')
        );

        Ok(Self {
            http,
            endpoint,
            model: config.model.clone(),
            api_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceProvider for RestProvider {
    fn image_encoding(&self) -> ImageEncoding {
        ImageEncoding::DataUri
    }

    async fn infer(&self, input: InferenceInput) -> Result<Description> {
        let body = RunRequest::new(input, None);

        debug!(
            "Calling inference endpoint for model {} with max_tokens {}",
            self.model, body.max_tokens
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            let details =
                extract_error_details(&bytes).unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            warn!("Inference endpoint returned {}: {}", status, details);
            return Err(Error::model(Some(status.as_u16()), details));
        }

        let envelope: RunEnvelope = serde_json::from_slice(&bytes)?;
        match envelope.result {
            Some(description) if envelope.success != Some(false) => Ok(description),
            _ => Err(Error::model(
                None,
                envelope.first_error().unwrap_or(UNKNOWN_ERROR),
            )),
        }
    }
}
