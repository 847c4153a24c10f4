//! Identity forwarded by the authenticating proxy in front of the service.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use compclub_volunteering::model::UserId;

use crate::error::AppError;

pub const USER_HEADER: &str = "x-compclub-user";
pub const STAFF_HEADER: &str = "x-compclub-staff";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user: UserId,
    pub staff: bool,
}

impl Identity {
    fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user = headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i32>().ok())
            .map(UserId)
            .ok_or(AppError::Unauthenticated)?;
        let staff = headers
            .get(STAFF_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
        Ok(Self { user, staff })
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

/// An [`Identity`] that carries the staff flag.
#[derive(Debug, Clone, Copy)]
pub struct Staff(pub Identity);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Staff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        if !identity.staff {
            return Err(AppError::Forbidden);
        }
        Ok(Self(identity))
    }
}
