//! The authentication gate
//!
//! Resolves a bearer credential to an active principal. When the credential
//! has aged past the refresh interval, a replacement is minted and handed
//! back so the request surface can expose it in the `x-new-token` header.

use std::sync::Arc;

use time::OffsetDateTime;

use outlast_auth::{AuthError, Tokenizer};
use outlast_common::{AccountStatus, Error, ErrorCode, ObjectId, Result};
use outlast_store::schema::UserDoc;
use outlast_store::Store;

const AUTH_HEADER_PREFIX: &str = "Bearer ";

/// An authenticated caller
#[derive(Clone, Debug)]
pub struct Principal {
    /// The caller's user id
    pub id: ObjectId,
    /// The credential in effect for the rest of the request
    pub token: String,
    /// A replacement credential, when the presented one was due for refresh
    pub refreshed_token: Option<String>,
    /// The caller's user document
    pub user: UserDoc,
}

/// Bearer credential resolver
pub struct AuthGate {
    store: Arc<Store>,
    tokenizer: Arc<Tokenizer>,
}

impl AuthGate {
    /// Create a gate over the shared store and tokenizer
    pub fn new(store: Arc<Store>, tokenizer: Arc<Tokenizer>) -> Self {
        Self { store, tokenizer }
    }

    /// Resolve the `Authorization` header to a principal
    pub fn authenticate(&self, authorization: &str) -> Result<Principal> {
        if !authorization.starts_with(AUTH_HEADER_PREFIX) {
            return Err(Error::unauthorized("Missing credentials"));
        }

        let token = authorization[AUTH_HEADER_PREFIX.len()..].trim();
        let claims = self.tokenizer.decode(token).map_err(|e| match e {
            AuthError::TokenExpired => Error::new(ErrorCode::TokenExpired, "Token expired"),
            _ => Error::unauthorized("Invalid credentials"),
        })?;

        let user_id = ObjectId::parse_str(&claims.sub)
            .ok_or_else(|| Error::unauthorized("Invalid credentials"))?;

        let user = self
            .store
            .users
            .get(user_id)
            .ok_or_else(|| Error::unauthorized("Invalid credentials"))?;

        if user.account_status != AccountStatus::Active {
            return Err(Error::forbidden("Account inactive"));
        }

        // Credentials minted before a password change are dead
        if let Some(invalidated_at) = user.token_invalidated_at {
            if claims.iat <= invalidated_at.unix_timestamp() {
                return Err(Error::new(ErrorCode::TokenExpired, "Token expired"));
            }
        }

        let now = OffsetDateTime::now_utc();
        let mut token = token.to_string();
        let mut refreshed_token = None;
        if self.tokenizer.needs_refresh(&claims, now) {
            let fresh = self
                .tokenizer
                .issue_at(claims.sub.clone(), now)
                .map_err(|e| Error::internal(e.to_string()))?;
            token = fresh.clone();
            refreshed_token = Some(fresh);
            tracing::debug!(user_id = %user_id, "Credential refreshed");
        }

        Ok(Principal {
            id: user_id,
            token,
            refreshed_token,
            user,
        })
    }
}
