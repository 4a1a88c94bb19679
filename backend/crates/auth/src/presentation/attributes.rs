//! Session attributes captured from the issuing request

use std::collections::BTreeMap;
use std::net::IpAddr;

use axum::http::HeaderMap;
use platform::client::{extract_client_ip, extract_user_agent};

use crate::domain::session::attribute;

/// Attributes to pass to `IssueSessionUseCase::execute`
///
/// Informational only; nothing re-checks them on later requests.
pub fn request_attributes(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    if let Some(user_agent) = extract_user_agent(headers) {
        attributes.insert(attribute::USER_AGENT.to_string(), user_agent);
    }
    if let Some(ip) = extract_client_ip(headers, direct_ip) {
        attributes.insert(attribute::CLIENT_IP.to_string(), ip.to_string());
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    #[test]
    fn test_request_attributes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("agent/1.0"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));

        let attributes = request_attributes(&headers, Some("10.0.0.1".parse().unwrap()));
        assert_eq!(attributes[attribute::USER_AGENT], "agent/1.0");
        assert_eq!(attributes[attribute::CLIENT_IP], "203.0.113.9");
    }

    #[test]
    fn test_request_attributes_without_headers() {
        let attributes = request_attributes(&HeaderMap::new(), None);
        assert!(attributes.is_empty());
    }
}
