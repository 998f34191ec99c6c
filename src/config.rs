//! Server configuration.
//!
//! One explicit struct constructed at startup and passed by reference into
//! the components that need it. Components never read ambient process-wide
//! state.

use crate::error::{CollectionError, CollectionResult};

/// Configuration for a collection server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host for the embedding transport.
    pub host: String,
    /// Bind port for the embedding transport.
    pub port: u16,
    /// Public base URL of the server, without the API prefix.
    /// Examples: "http://localhost:3000", "https://api.company.com"
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Base URL hypermedia links are rewritten against.
    pub fn api_base(&self) -> String {
        format!("{}/api", self.base_url)
    }

    /// Ensure the configuration is usable before the server starts.
    pub fn validate(&self) -> CollectionResult<()> {
        if self.host.is_empty() {
            return Err(CollectionError::internal("host must not be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(CollectionError::internal(
                "base_url must start with http:// or https://",
            ));
        }
        if self.base_url.ends_with('/') {
            return Err(CollectionError::internal(
                "base_url must not end with a slash",
            ));
        }
        Ok(())
    }
}
