use async_trait::async_trait;
use describe_proxy::{
    Error, Result,
    provider::{Description, ImageEncoding, InferenceInput, InferenceProvider},
};
use std::sync::{Arc, Mutex};

/// Mock provider that records every input and replays a fixed outcome
#[derive(Debug, Clone)]
pub struct MockProvider {
    pub encoding: ImageEncoding,
    pub requests: Arc<Mutex<Vec<InferenceInput>>>,
    pub description: Option<String>,
    pub error: Option<(Option<u16>, String)>,
}

impl MockProvider {
    pub fn new(encoding: ImageEncoding) -> Self {
        Self {
            encoding,
            requests: Arc::new(Mutex::new(Vec::new())),
            description: None,
            error: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_error(mut self, status: Option<u16>, details: &str) -> Self {
        self.error = Some((status, details.to_string()));
        self
    }

    pub fn get_requests(&self) -> Vec<InferenceInput> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn image_encoding(&self) -> ImageEncoding {
        self.encoding
    }

    async fn infer(&self, input: InferenceInput) -> Result<Description> {
        self.requests.lock().unwrap().push(input);

        if let Some((status, details)) = &self.error {
            return Err(Error::model(*status, details.clone()));
        }

        match self.description {
            Some(ref description) => Ok(Description::new(description.clone())),
            None => Err(Error::internal("No mock description configured")),
        }
    }
}
