use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use rudby_types::PrincipalId;

use crate::error::{ServerError, ServerResult};

/// What the client presented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Read credentials from the `Authorization` header.
    ///
    /// Anything other than a well-formed `Bearer <token>` is anonymous.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Self::Bearer(token.to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

/// Resolves request credentials to the principal the catalog acts for.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<PrincipalId>;
}

/// Authenticates bearer tokens against a fixed token table.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, PrincipalId>,
}

impl StaticTokenAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: impl Into<String>) -> Self {
        self.tokens
            .insert(token.into(), PrincipalId::new(principal.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StaticTokenAuth
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |auth, (token, principal)| auth.with_token(token, principal))
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<PrincipalId> {
        match credentials {
            Credentials::Bearer(token) => self
                .tokens
                .get(token)
                .cloned()
                .ok_or_else(|| ServerError::Unauthorized("unknown bearer token".into())),
            Credentials::Anonymous => Err(ServerError::Unauthorized(
                "missing bearer token".into(),
            )),
        }
    }
}
