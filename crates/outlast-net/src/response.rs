//! HTTP response building and serialization

use crate::http::{Headers, StatusCode, Version};

/// An HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    version: Version,
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    /// Create a new response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: Version::Http11,
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Create an OK (200) response
    pub fn ok() -> Self {
        Self::new(StatusCode::Ok)
    }

    /// Create a Created (201) response
    pub fn created() -> Self {
        Self::new(StatusCode::Created)
    }

    /// Create a No Content (204) response
    pub fn no_content() -> Self {
        Self::new(StatusCode::NoContent)
    }

    /// Get the status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get mutable headers
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Get the body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Set the body
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set text body
    pub fn text(self, body: impl Into<String>) -> Self {
        self.header("Content-Type", "text/plain; charset=utf-8")
            .body_bytes(body.into().into_bytes())
    }

    /// Set HTML body
    pub fn html(self, body: impl Into<String>) -> Self {
        self.header("Content-Type", "text/html; charset=utf-8")
            .body_bytes(body.into().into_bytes())
    }

    /// Set JSON body
    pub fn json(self, body: impl Into<String>) -> Self {
        self.header("Content-Type", "application/json")
            .body_bytes(body.into().into_bytes())
    }

    /// Serialize the response to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.body.len() + 128);

        result.extend_from_slice(
            format!(
                "{} {} {}\r\n",
                self.version,
                self.status.code(),
                self.status.reason()
            )
            .as_bytes(),
        );

        for (name, value) in self.headers.iter() {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        if self.headers.get("content-length").is_none() {
            result.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response() {
        let res = Response::ok().text("Hello!");
        let text = String::from_utf8(res.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("content-type: text/plain"));
        assert!(text.contains("Content-Length: 6"));
        assert!(text.ends_with("Hello!"));
    }

    #[test]
    fn test_json_response() {
        let res = Response::created().json("{\"detail\":\"ok\"}");
        let text = String::from_utf8(res.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.contains("content-type: application/json"));
        assert!(text.ends_with("{\"detail\":\"ok\"}"));
    }

    #[test]
    fn test_no_content_has_empty_body() {
        let res = Response::no_content();
        let text = String::from_utf8(res.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert!(text.contains("Content-Length: 0"));
    }
}
