//! Caller metadata recorded on audit entries.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Best-effort client address and user agent.
///
/// The address comes from `x-forwarded-for` (first hop) or `x-real-ip`;
/// the server is expected to sit behind a reverse proxy.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .or_else(|| header("x-real-ip"));

        Self {
            ip_address,
            user_agent: header("user-agent"),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.5, 172.16.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.1"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let info = ClientInfo::from_headers(&headers);
        assert_eq!(info.ip_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.9"));
        assert_eq!(
            ClientInfo::from_headers(&headers).ip_address.as_deref(),
            Some("192.168.1.9")
        );
    }

    #[test]
    fn missing_headers_yield_none() {
        let info = ClientInfo::from_headers(&HeaderMap::new());
        assert!(info.ip_address.is_none());
        assert!(info.user_agent.is_none());
    }
}
