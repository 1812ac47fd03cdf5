//! Caller identity extraction.
//!
//! Authentication itself is an external collaborator: by the time a request
//! reaches this server, a gateway has already verified the caller and
//! forwards the opaque `(user_id, role)` pair as headers. This extractor
//! validates the role into the closed [`Role`] enum exactly once; handlers
//! and the core only ever see the typed value.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rollcall_core::{Role, UserId};

use crate::api::error::ApiError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
    /// The caller's user id.
    pub user_id: UserId,

    /// The caller's validated role.
    pub role: Role,
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)?
            .parse::<UserId>()
            .map_err(|_| ApiError::Unauthenticated {
                message: format!("'{USER_ID_HEADER}' header is not a valid user id"),
            })?;

        let role: Role = header_value(parts, USER_ROLE_HEADER)?
            .parse()
            .map_err(ApiError::from)?;

        Ok(Self { user_id, role })
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthenticated {
            message: format!("missing '{name}' header"),
        })?
        .to_str()
        .map_err(|_| ApiError::Unauthenticated {
            message: format!("'{name}' header is not valid UTF-8"),
        })
}
