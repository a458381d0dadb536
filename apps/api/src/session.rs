//! Request identity.
//!
//! Authentication lives in an external identity provider. Handlers receive an
//! explicit `Session`; a session without a user is a guest, and every
//! persistence operation becomes a no-op for it.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};
use serde::Serialize;
use std::convert::Infallible;
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<Identity>,
}

impl Session {
    #[cfg(test)]
    pub fn guest() -> Self {
        Self { user: None }
    }

    #[cfg(test)]
    pub fn for_user(id: Uuid) -> Self {
        Self {
            user: Some(Identity { id }),
        }
    }

    pub fn owner_id(&self) -> Option<Uuid> {
        self.user.map(|u| u.id)
    }
}

/// Resolves the current user for a request.
///
/// Carried in `AppState` as `Arc<dyn IdentityProvider>`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Trusts a user id header stamped by the upstream identity gateway.
pub struct HeaderIdentityProvider {
    header: HeaderName,
}

impl HeaderIdentityProvider {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn current_user(&self, headers: &HeaderMap) -> Option<Identity> {
        let raw = headers.get(&self.header)?.to_str().ok()?;
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(Identity { id }),
            Err(e) => {
                debug!("Ignoring malformed {} header: {e}", self.header);
                None
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session {
            user: state.identity.current_user(&parts.headers).await,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn provider() -> HeaderIdentityProvider {
        HeaderIdentityProvider::new(HeaderName::from_static("x-user-id"))
    }

    #[tokio::test]
    async fn test_header_identity_resolves_uuid() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(provider().current_user(&headers).await, Some(Identity { id }));
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header_is_guest() {
        assert_eq!(provider().current_user(&HeaderMap::new()).await, None);

        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-uuid"));
        assert_eq!(provider().current_user(&headers).await, None);
    }

    #[test]
    fn test_session_owner_id() {
        let id = Uuid::new_v4();
        assert_eq!(Session::for_user(id).owner_id(), Some(id));
        assert_eq!(Session::guest().owner_id(), None);
    }
}
