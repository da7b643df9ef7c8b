//! Caller identity. Authentication itself happens upstream (the gateway
//! verifies credentials and forwards the account id in a header); this
//! module only extracts and validates that forwarded identity.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::User;
use crate::store::Store;
use crate::utils::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// A verified caller. Extraction fails with 401 when the header is missing
/// or malformed.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Auth("Authentication required".to_string()))?;
        let raw = header
            .to_str()
            .map_err(|_| AppError::Auth("Invalid identity header".to_string()))?;
        let user_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::Auth("Invalid identity header".to_string()))?;
        Ok(AuthUser { user_id })
    }
}

/// Optional caller identity for endpoints that serve anonymous requests but
/// personalize for authenticated ones. A present-but-malformed header is
/// still a 401.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.map(|auth| auth.user_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if parts.headers.get(USER_ID_HEADER).is_none() {
            return Ok(MaybeAuthUser(None));
        }
        let auth = AuthUser::from_request_parts(parts, state).await?;
        Ok(MaybeAuthUser(Some(auth)))
    }
}

/// Load the caller's account and require the admin flag.
pub async fn require_admin(store: &dyn Store, auth: AuthUser) -> Result<User, AppError> {
    let user = match store.get_user(auth.user_id).await {
        Ok(user) => user,
        Err(crate::store::StoreError::NotFound { .. }) => {
            return Err(AppError::Auth("Unknown account".to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if !user.is_admin {
        return Err(AppError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }
    Ok(user)
}
