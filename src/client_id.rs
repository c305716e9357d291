use axum::http::HeaderMap;
use std::fmt;

// Identifier used when no forwarding header is present
pub const ANONYMOUS: &str = "anonymous";

// Key used to partition rate limit accounting.
// Shared proxies collapse many clients into one id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

// Resolve the client id from forwarding headers.
// Header contents are trusted as-is, no address validation.
pub fn resolve(headers: &HeaderMap) -> ClientId {
    if let Some(forwarded) = header(headers, "x-forwarded-for") {
        // left-most entry is the original client
        let first = forwarded.split(',').next().unwrap_or(forwarded);
        return ClientId::new(first.trim());
    }

    if let Some(real_ip) = header(headers, "x-real-ip") {
        return ClientId::new(real_ip);
    }

    ClientId::anonymous()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn takes_first_forwarded_entry() {
        let id = resolve(&headers(&[("x-forwarded-for", "9.9.9.9, 10.0.0.1")]));
        assert_eq!(id.as_str(), "9.9.9.9");
    }

    #[test]
    fn trims_single_forwarded_entry() {
        let id = resolve(&headers(&[("x-forwarded-for", "  1.2.3.4 ")]));
        assert_eq!(id.as_str(), "1.2.3.4");
    }

    #[test]
    fn forwarded_wins_over_real_ip() {
        let id = resolve(&headers(&[
            ("x-forwarded-for", "1.1.1.1"),
            ("x-real-ip", "2.2.2.2"),
        ]));
        assert_eq!(id.as_str(), "1.1.1.1");
    }

    #[test]
    fn falls_back_to_real_ip_verbatim() {
        let id = resolve(&headers(&[("x-real-ip", "5.6.7.8")]));
        assert_eq!(id.as_str(), "5.6.7.8");
    }

    #[test]
    fn empty_forwarded_header_is_ignored() {
        let id = resolve(&headers(&[("x-forwarded-for", ""), ("x-real-ip", "5.6.7.8")]));
        assert_eq!(id.as_str(), "5.6.7.8");
    }

    #[test]
    fn no_headers_is_anonymous() {
        assert_eq!(resolve(&HeaderMap::new()), ClientId::anonymous());
        assert_eq!(ClientId::anonymous().to_string(), ANONYMOUS);
    }

    #[test]
    fn content_is_not_validated() {
        let id = resolve(&headers(&[("x-forwarded-for", "not-an-ip, 10.0.0.1")]));
        assert_eq!(id.as_str(), "not-an-ip");
    }
}
