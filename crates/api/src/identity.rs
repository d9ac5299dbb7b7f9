//! Caller identity extraction.
//!
//! The upstream auth collaborator terminates sessions and forwards the
//! result as headers; this extractor resolves them into an [`Identity`]
//! exactly once per request. `x-user-id` (with optional `x-user-role`)
//! takes precedence over `x-session-token`.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use common::{Identity, SessionToken, UserId};
use uuid::Uuid;

use crate::error::ApiError;

/// Request extension carrying the resolved caller.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl Caller {
    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        if let Some(raw) = header(headers, "x-user-id") {
            let uuid = Uuid::parse_str(raw)
                .map_err(|e| ApiError::BadRequest(format!("invalid x-user-id: {e}")))?;
            let id = UserId::from_uuid(uuid);
            let is_admin = header(headers, "x-user-role")
                .is_some_and(|role| role.eq_ignore_ascii_case("admin"));
            return Ok(Caller(if is_admin {
                Identity::admin(id)
            } else {
                Identity::user(id)
            }));
        }

        if let Some(token) = header(headers, "x-session-token") {
            return Ok(Caller(Identity::Anonymous(SessionToken::new(token))));
        }

        Err(ApiError::Unauthenticated)
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Caller::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn resolves_authenticated_user() {
        let id = UserId::new();
        let caller =
            Caller::from_headers(&headers(&[("x-user-id", &id.to_string())])).unwrap();
        assert_eq!(caller.0, Identity::user(id));
    }

    #[test]
    fn resolves_admin_role() {
        let id = UserId::new();
        let caller = Caller::from_headers(&headers(&[
            ("x-user-id", &id.to_string()),
            ("x-user-role", "ADMIN"),
        ]))
        .unwrap();
        assert!(caller.0.is_admin());
    }

    #[test]
    fn resolves_anonymous_session() {
        let caller = Caller::from_headers(&headers(&[("x-session-token", "sess-42")])).unwrap();
        assert_eq!(caller.0, Identity::Anonymous("sess-42".into()));
    }

    #[test]
    fn user_header_takes_precedence() {
        let id = UserId::new();
        let caller = Caller::from_headers(&headers(&[
            ("x-user-id", &id.to_string()),
            ("x-session-token", "sess-42"),
        ]))
        .unwrap();
        assert_eq!(caller.0.user_id(), Some(id));
    }

    #[test]
    fn rejects_missing_identity() {
        let result = Caller::from_headers(&HeaderMap::new());
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn rejects_malformed_user_id() {
        let result = Caller::from_headers(&headers(&[("x-user-id", "not-a-uuid")]));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
