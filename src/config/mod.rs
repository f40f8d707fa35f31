mod types;

pub use types::*;

use crate::{Error, Result};
use secrecy::{ExposeSecret, Secret};
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration file, applies environment overrides and validates
/// the result.
///
/// `CONFIG_PATH` points at an explicit file, which must exist. Without it,
/// `config.yaml` is used when present and built-in defaults otherwise, so the
/// proxy can be configured entirely through the environment.
pub async fn load() -> Result<Config> {
    let mut config = match env::var("CONFIG_PATH") {
        Ok(path) => from_file(&path).await?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            from_file(DEFAULT_CONFIG_PATH).await?
        }
        Err(_) => {
            debug!("No configuration file found, using defaults");
            Config::default()
        }
    };

    config.apply_overrides(|key| env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

pub async fn from_file(path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", path);

    let config_str = tokio::fs::read_to_string(path).await?;
    parse(&config_str)
}

pub fn parse(config_str: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(config_str)?)
}

impl Config {
    /// Applies secret and backend overrides. `lookup` resolves a variable
    /// name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("AI_PROVIDER") {
            self.provider.kind = kind.parse().map_err(Error::config)?;
        }
        if let Some(account_id) = lookup("CLOUDFLARE_ACCOUNT_ID") {
            self.provider.account_id = Some(account_id);
        }
        if let Some(token) = lookup("CLOUDFLARE_API_TOKEN") {
            self.provider.api_token = Some(Secret::new(token));
        }
        if let Some(binding_url) = lookup("AI_BINDING_URL") {
            self.provider.binding_url = Some(binding_url);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            return Err(Error::config("provider.model must not be empty"));
        }

        match self.provider.kind {
            ProviderKind::Rest => {
                if is_blank(self.provider.account_id.as_deref()) {
                    return Err(Error::config(
                        "REST provider requires an account id (CLOUDFLARE_ACCOUNT_ID)",
                    ));
                }
                let token = self
                    .provider
                    .api_token
                    .as_ref()
                    .map(|token| token.expose_secret().as_str());
                if is_blank(token) {
                    return Err(Error::config(
                        "REST provider requires an API token (CLOUDFLARE_API_TOKEN)",
                    ));
                }
            }
            ProviderKind::Binding => {
                if is_blank(self.provider.binding_url.as_deref()) {
                    return Err(Error::config(
                        "Binding provider requires binding_url (AI_BINDING_URL)",
                    ));
                }
            }
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
