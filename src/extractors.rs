use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// The identity decoded from a verified bearer token. Passed to handlers
/// explicitly; nothing is attached to the request itself.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Authentication stage: extract and verify the bearer token.
/// Returns 401 on a missing header, malformed scheme, or failed verification.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Token not found".into()))?;

        let token = parse_bearer(header)
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".into()))?;

        let claims = state.tokens.verify(token)?;

        Ok(CurrentUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// Authorization stage, layered on top of authentication so that
/// authentication errors always come first.
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Access only for admin".into()));
        }
        Ok(AdminUser(user))
    }
}

/// The header must be exactly `Bearer <token>`.
fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;
    if scheme != "Bearer" || token.is_empty() || parts.next().is_some() {
        return None;
    }
    Some(token)
}
