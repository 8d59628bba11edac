use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use super::{TokenGenerator, parse_token};
use crate::store::Store;
use crate::types::UserIdentity;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid authorization scheme")]
    InvalidScheme,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token does not belong to a registered user")]
    UnknownUser,

    #[error("identity lookup failed: {0}")]
    Internal(String),
}

/// Resolves a raw bearer token to the caller's identity.
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, raw_token: &str) -> Result<UserIdentity, IdentityError>;
}

/// Identity backed by the local token and user tables. Every call reads
/// the user, plan and linked provider tokens afresh.
pub struct StoreIdentityProvider {
    store: Arc<dyn Store>,
    generator: TokenGenerator,
}

impl StoreIdentityProvider {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            generator: TokenGenerator::new(),
        }
    }
}

impl IdentityProvider for StoreIdentityProvider {
    fn resolve(&self, raw_token: &str) -> Result<UserIdentity, IdentityError> {
        let internal = |e: crate::error::Error| IdentityError::Internal(e.to_string());

        let (lookup, _secret) = parse_token(raw_token).map_err(|_| IdentityError::InvalidToken)?;

        let token = self
            .store
            .get_token_by_lookup(lookup)
            .map_err(internal)?
            .ok_or(IdentityError::InvalidToken)?;

        if !self
            .generator
            .verify(raw_token, &token.token_hash)
            .map_err(internal)?
        {
            return Err(IdentityError::InvalidToken);
        }

        if let Some(expires_at) = &token.expires_at {
            if expires_at < &Utc::now() {
                return Err(IdentityError::TokenExpired);
            }
        }

        let user = self
            .store
            .get_user(&token.user_id)
            .map_err(internal)?
            .ok_or(IdentityError::UnknownUser)?;
        let access_tokens = self.store.list_access_tokens(&user.id).map_err(internal)?;

        if let Err(e) = self.store.update_token_last_used(&token.id) {
            tracing::warn!("Failed to update token last_used_at: {e}");
        }

        Ok(UserIdentity::from_user(user, access_tokens))
    }
}
