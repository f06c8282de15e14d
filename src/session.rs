use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use lazy_static::lazy_static;
use regex::Regex;

pub const SESSION_HEADER: &str = "x-session-id";

pub(crate) fn is_valid_session_id(id: &str) -> bool {
    lazy_static! {
        static ref SESSION_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{8,128}$").unwrap();
    }
    SESSION_RE.is_match(id)
}

/// Device-local session identifier taken from the `X-Session-Id` header.
///
/// Favorites and saved comparisons are keyed by it. Use `Option<SessionId>`
/// where the header is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::BAD_REQUEST, "missing X-Session-Id header".to_string()))?
            .trim();

        if !is_valid_session_id(raw) {
            return Err((StatusCode::BAD_REQUEST, "invalid X-Session-Id header".to_string()));
        }
        Ok(SessionId(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<SessionId, (StatusCode, String)> {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header(SESSION_HEADER, h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        SessionId::from_request_parts(&mut parts, &()).await
    }

    #[test]
    fn session_id_shape() {
        assert!(is_valid_session_id("guest_1715000000_k3j2h1"));
        assert!(!is_valid_session_id("short"));
        assert!(!is_valid_session_id("has spaces in it"));
    }

    #[tokio::test]
    async fn extracts_header() {
        let id = extract(Some("guest_abc12345")).await.unwrap();
        assert_eq!(id, SessionId("guest_abc12345".into()));
    }

    #[tokio::test]
    async fn rejects_missing_or_malformed() {
        let (status, _) = extract(None).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, msg) = extract(Some("bad id!")).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(msg.contains("invalid"));
    }
}
