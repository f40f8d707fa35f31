mod binding;
mod rest;
mod types;

pub use binding::BindingProvider;
pub use rest::RestProvider;
pub use types::*;

use crate::{
    Result,
    config::{ProviderConfig, ProviderKind},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// A multimodal model that turns a prompt and an image into a description.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// The image representation this backend accepts.
    fn image_encoding(&self) -> ImageEncoding;

    async fn infer(&self, input: InferenceInput) -> Result<Description>;
}

/// Builds the backend selected by `config.kind`.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn InferenceProvider>> {
    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let provider: Arc<dyn InferenceProvider> = match config.kind {
        ProviderKind::Binding => Arc::new(BindingProvider::new(http, config)?),
        ProviderKind::Rest => Arc::new(RestProvider::new(http, config)?),
    };

    info!(
        "Using {:?} inference provider with model {}",
        config.kind, config.model
    );

    Ok(provider)
}
