//! Caller identity.
//!
//! Tokens are not verified yet: every request, with or without an
//! `Authorization` header, resolves to the development user.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

pub const DEV_USER: &str = "test_user";

/// The authenticated user id, extracted per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Token carried by an `Authorization` header, with or without a `Bearer ` prefix.
pub fn bearer_token(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(token) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(bearer_token)
        {
            debug!("authorization token present ({} chars), using {}", token.len(), DEV_USER);
        }
        Ok(CurrentUser(DEV_USER.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn resolve(header: Option<&str>) -> CurrentUser {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[test]
    fn strips_bearer_prefix() {
        assert_eq!(bearer_token("Bearer abc.def"), "abc.def");
        assert_eq!(bearer_token("abc.def"), "abc.def");
    }

    #[tokio::test]
    async fn always_resolves_dev_user() {
        assert_eq!(resolve(None).await.id(), DEV_USER);
        assert_eq!(resolve(Some("Bearer xyz")).await.id(), DEV_USER);
        assert_eq!(resolve(Some("garbage")).await.id(), DEV_USER);
    }
}
