//! Who is making the request. Resolved once per request by the axum
//! extractor and passed explicitly to every service call that needs it.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::model::User;
use crate::services::ServiceError;

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USERNAME: &str = "x-username";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionContext {
    #[default]
    Anonymous,
    User(User),
}

impl SessionContext {
    pub fn user(user: User) -> Self {
        Self::User(user)
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// The logged-in user, or [`ServiceError::NotLoggedIn`] for actions
    /// that need an identity (likes, bookmarks, comments, notifications).
    pub fn require_user(&self) -> Result<&User, ServiceError> {
        match self {
            Self::User(u) => Ok(u),
            Self::Anonymous => Err(ServiceError::NotLoggedIn),
        }
    }

    fn from_parts(parts: &Parts) -> Self {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        match header(HEADER_USER_ID) {
            Some(id) => Self::User(User {
                id,
                username: header(HEADER_USERNAME).unwrap_or_default(),
                name: None,
                avatar: None,
            }),
            None => Self::Anonymous,
        }
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
