//! HTTP request parsing and representation

use std::collections::HashMap;
use std::str::FromStr;

use crate::http::{Headers, Method, Version};
use crate::{NetError, NetResult, MAX_HEADER_SIZE};

/// An HTTP request
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    version: Version,
    headers: Headers,
    body: Vec<u8>,
    /// Path parameters (set by the router)
    params: HashMap<String, String>,
}

impl Request {
    /// Create a request (tests and clients)
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path_str = path.into();
        let (path, query) = Self::split_path_and_query(&path_str);

        Self {
            method,
            path,
            query,
            version: Version::Http11,
            headers: Headers::new(),
            body: Vec::new(),
            params: HashMap::new(),
        }
    }

    /// Parse the header block (request line + headers). The body is read
    /// separately and attached with `set_body`.
    pub fn parse_head(head: &str) -> NetResult<Self> {
        if head.len() > MAX_HEADER_SIZE {
            return Err(NetError::HeaderTooLarge);
        }

        let mut lines = head.lines();
        let request_line = lines
            .next()
            .ok_or_else(|| NetError::InvalidRequest("Missing request line".into()))?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(NetError::InvalidRequest(format!(
                "Invalid request line: {}",
                request_line
            )));
        }

        let method = Method::from_str(parts[0])?;
        let version = Version::from_str(parts[2])?;
        let (path, query) = Self::split_path_and_query(parts[1]);

        let mut headers = Headers::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            let idx = line
                .find(':')
                .ok_or_else(|| NetError::InvalidRequest(format!("Invalid header: {}", line)))?;
            headers.append(line[..idx].trim(), line[idx + 1..].trim());
        }

        Ok(Self {
            method,
            path,
            query,
            version,
            headers,
            body: Vec::new(),
            params: HashMap::new(),
        })
    }

    fn split_path_and_query(path: &str) -> (String, HashMap<String, String>) {
        match path.find('?') {
            Some(idx) => (
                path[..idx].to_string(),
                Self::parse_query_string(&path[idx + 1..]),
            ),
            None => (path.to_string(), HashMap::new()),
        }
    }

    fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let key = parts.next()?;
                let value = parts.next().unwrap_or("");
                Some((url_decode(key), url_decode(value)))
            })
            .collect()
    }

    /// Get the HTTP method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the HTTP version
    pub fn version(&self) -> Version {
        self.version
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

    /// Get the body as a string
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Attach the body
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Get a query parameter
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(|s| s.as_str())
    }

    /// Get a path parameter (set by the router)
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|s| s.as_str())
    }

    /// Set path parameters (called by the router)
    pub fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// The bearer token from the Authorization header, if present
    pub fn authorization(&self) -> &str {
        self.headers.get("authorization").unwrap_or("")
    }
}

/// Percent-decode a URL component ('+' decodes to space)
fn url_decode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if hex.len() == 2 {
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    result.push(byte as char);
                    continue;
                }
            }
            result.push('%');
            result.push_str(&hex);
        } else if c == '+' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}
