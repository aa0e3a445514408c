use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's identity: user id plus the bearer token forwarded upstream.
/// Both must be present and non-blank, otherwise the caller is not
/// authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

impl Session {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let token = headers
            .get(axum::http::header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?
            .trim();
        let user_id = headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();

        if token.is_empty() || user_id.is_empty() {
            return None;
        }
        Some(Session {
            user_id: user_id.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Session::from_headers(&parts.headers).ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: Option<&str>, user: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(auth) = auth {
            headers.insert("authorization", HeaderValue::from_str(auth).unwrap());
        }
        if let Some(user) = user {
            headers.insert(USER_ID_HEADER, HeaderValue::from_str(user).unwrap());
        }
        headers
    }

    #[test]
    fn test_both_headers_present() {
        let session = Session::from_headers(&headers(Some("Bearer abc"), Some("u1"))).unwrap();
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.token, "abc");
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        assert!(Session::from_headers(&headers(None, Some("u1"))).is_none());
    }

    #[test]
    fn test_missing_user_is_unauthenticated() {
        assert!(Session::from_headers(&headers(Some("Bearer abc"), None)).is_none());
    }

    #[test]
    fn test_blank_values_are_unauthenticated() {
        assert!(Session::from_headers(&headers(Some("Bearer  "), Some("u1"))).is_none());
        assert!(Session::from_headers(&headers(Some("Bearer abc"), Some(" "))).is_none());
    }

    #[test]
    fn test_non_bearer_scheme_is_rejected() {
        assert!(Session::from_headers(&headers(Some("Basic abc"), Some("u1"))).is_none());
    }
}
