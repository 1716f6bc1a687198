//! Backend trait seams
//!
//! The application core depends only on these traits; the HTTP client and
//! the in-memory backend both implement them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientResult;
use crate::query::{Filter, SelectRequest};

/// Authenticated user identity returned by the auth surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
}

/// An authenticated session with the hosted service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    /// Token expiry as a Unix timestamp, when the token carries one
    pub expires_at: Option<u64>,
    pub user: UserInfo,
}

impl Session {
    /// Parse the expiry claim out of a JWT without verifying it
    ///
    /// Verification happens server-side; the client only needs the expiry
    /// to know when a cached session is no longer worth restoring.
    pub fn parse_jwt_exp(token: &str) -> Option<u64> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return None;
        }

        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
        let payload: Value = serde_json::from_slice(&payload_bytes).ok()?;
        payload.get("exp")?.as_u64()
    }

    /// True when the token carries an expiry in the past
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                now >= expires_at
            }
            None => false,
        }
    }
}

/// Relational query surface of the hosted service
///
/// Every call resolves to `ClientResult` (no `{data, error}` pairs);
/// callers branch on the `Result` instead.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Select rows matching the request
    async fn select(&self, request: &SelectRequest) -> ClientResult<Vec<Value>>;

    /// Insert one row, returning the stored representation
    async fn insert(&self, table: &str, row: Value) -> ClientResult<Value>;

    /// Update rows matching `filters`, returning the updated representations
    async fn update(&self, table: &str, filters: &[Filter], patch: Value)
    -> ClientResult<Vec<Value>>;

    /// Insert-or-update keyed by `on_conflict` columns, returning the stored
    /// representation. Saving the same key twice replaces, never duplicates.
    async fn upsert(&self, table: &str, on_conflict: &[&str], row: Value) -> ClientResult<Value>;

    /// Delete rows matching `filters`, returning how many were removed
    async fn delete(&self, table: &str, filters: &[Filter]) -> ClientResult<u64>;
}

/// Session-based auth surface of the hosted service
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a session
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session>;

    /// Invalidate the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> ClientResult<()>;

    /// Fetch the identity behind `access_token`
    async fn get_user(&self, access_token: &str) -> ClientResult<UserInfo>;
}
