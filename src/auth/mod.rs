//! Authentication capability.
//!
//! The server consumes an [`Authable`] collaborator that maps a request
//! credential to a user identity. [`StaticAuthentication`] is the bundled
//! implementation: a fixed token table built in code or loaded from a JSON
//! tokens file.

use crate::error::{CollectionError, CollectionResult};
use log::{debug, warn};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

/// An authenticated user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    email: String,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Capability mapping a request credential to a user.
///
/// Implementations are long-lived, shared across requests, and must be
/// internally synchronized.
pub trait Authable: Send + Sync {
    /// Resolve `token` to a user, or `None` when the token is unknown.
    fn get_user(&self, token: &str) -> impl Future<Output = Option<User>> + Send;
}

#[derive(Debug, Deserialize)]
struct TokenEntry {
    token: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct TokensFile {
    tokens: Vec<TokenEntry>,
}

/// Fixed token table, resolved without any external round-trip.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthentication {
    tokens: HashMap<String, User>,
}

impl StaticAuthentication {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a user.
    pub fn with_token(mut self, token: impl Into<String>, email: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), User::new(email));
        self
    }

    /// Load a token table from a JSON file of the form
    /// `{"tokens": [{"token": "...", "email": "..."}]}`.
    pub fn from_file(path: impl AsRef<Path>) -> CollectionResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|err| CollectionError::internal(err))?;
        Self::from_json(&contents)
    }

    /// Parse a token table from its JSON document.
    pub fn from_json(contents: &str) -> CollectionResult<Self> {
        let file: TokensFile =
            serde_json::from_str(contents).map_err(|err| CollectionError::internal(err))?;

        let mut auth = Self::new();
        for entry in file.tokens {
            auth = auth.with_token(entry.token, entry.email);
        }
        Ok(auth)
    }
}

impl Authable for StaticAuthentication {
    async fn get_user(&self, token: &str) -> Option<User> {
        // tokens are credentials; only their hash is ever logged
        let token_hash = format!("{:x}", Sha256::digest(token.as_bytes()));
        match self.tokens.get(token) {
            Some(user) => {
                debug!("resolved token {} to {}", token_hash, user.email());
                Some(user.clone())
            }
            None => {
                warn!("unknown token {}", token_hash);
                None
            }
        }
    }
}
