use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Html,
    Json,
    Text,
    Binary,
}

impl ResponseType {
    pub fn detect(headers: &HashMap<String, String>, body: &[u8]) -> Self {
        if let Some(content_type) = headers.get("content-type") {
            return if content_type.contains("text/html")
                || content_type.contains("application/xhtml")
            {
                ResponseType::Html
            } else if content_type.contains("application/json") {
                ResponseType::Json
            } else if content_type.contains("text/") {
                ResponseType::Text
            } else {
                ResponseType::Binary
            };
        }

        let head = String::from_utf8_lossy(&body[..body.len().min(512)]);
        let head = head.trim_start();
        if head.starts_with('{') || head.starts_with('[') {
            ResponseType::Json
        } else if head.starts_with('<') {
            ResponseType::Html
        } else {
            ResponseType::Text
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects; relative links resolve against it.
    pub url: Url,
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Json and binary responses are not parsed for records.
    pub response_type: ResponseType,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_header() {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "text/html; charset=utf-8".to_string(),
        );
        assert_eq!(ResponseType::detect(&headers, b"{}"), ResponseType::Html);

        headers.insert("content-type".to_string(), "image/png".to_string());
        assert_eq!(ResponseType::detect(&headers, b""), ResponseType::Binary);
    }

    #[test]
    fn test_detect_from_body() {
        let headers = HashMap::new();
        assert_eq!(
            ResponseType::detect(&headers, b"  <!DOCTYPE html><html></html>"),
            ResponseType::Html
        );
        assert_eq!(
            ResponseType::detect(&headers, br#"{"a": 1}"#),
            ResponseType::Json
        );
        assert_eq!(ResponseType::detect(&headers, b"hello"), ResponseType::Text);
    }
}
