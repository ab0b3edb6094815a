//! CORS middleware
//!
//! Origins are admitted by a configurable regex. Credentials are allowed,
//! all methods and headers pass, and `x-new-token` is exposed so browsers
//! can read refreshed credentials.

use regex::Regex;

use outlast_net::{Request, Response};

/// CORS settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Pattern an Origin header must fully match
    allow_origin: Regex,
}

impl CorsConfig {
    /// Build from the origin regex. The pattern is anchored so partial
    /// matches do not admit lookalike origins.
    pub fn new(origin_pattern: &str) -> Result<Self, regex::Error> {
        let anchored = format!("^(?:{})$", origin_pattern);
        Ok(Self {
            allow_origin: Regex::new(&anchored)?,
        })
    }

    /// Check whether an origin is admitted
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allow_origin.is_match(origin)
    }

    /// Stamp CORS headers onto a response
    pub fn apply(&self, origin: Option<&str>, response: &mut Response) {
        let Some(origin) = origin else { return };
        if !self.origin_allowed(origin) {
            return;
        }

        let headers = response.headers_mut();
        headers.set("access-control-allow-origin", origin);
        headers.set("access-control-allow-credentials", "true");
        headers.set("access-control-expose-headers", "x-new-token");
    }

    /// Answer a preflight request
    pub fn preflight(&self, request: &Request) -> Response {
        let mut response = Response::no_content();

        if let Some(origin) = request.headers().get("origin") {
            if self.origin_allowed(origin) {
                let origin = origin.to_string();
                let headers = response.headers_mut();
                headers.set("access-control-allow-origin", origin);
                headers.set("access-control-allow-credentials", "true");
                headers.set("access-control-allow-methods", "*");
                headers.set("access-control-allow-headers", "*");
                headers.set("access-control-expose-headers", "x-new-token");
                headers.set("access-control-max-age", "86400");
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlast_net::Method;

    fn local_cors() -> CorsConfig {
        CorsConfig::new(r"http://(localhost|127\.0\.0\.1)(:\d+)?").unwrap()
    }

    #[test]
    fn test_origin_matching_is_anchored() {
        let cors = local_cors();

        assert!(cors.origin_allowed("http://localhost:5173"));
        assert!(cors.origin_allowed("http://127.0.0.1:8080"));
        assert!(cors.origin_allowed("http://localhost"));

        assert!(!cors.origin_allowed("http://evil.com"));
        assert!(!cors.origin_allowed("http://localhost.evil.com"));
        assert!(!cors.origin_allowed("https://prefix http://localhost"));
    }

    #[test]
    fn test_apply_sets_headers_for_allowed_origin() {
        let cors = local_cors();
        let mut resp = Response::ok();

        cors.apply(Some("http://localhost:3000"), &mut resp);
        assert_eq!(
            resp.headers().get("access-control-allow-origin"),
            Some("http://localhost:3000")
        );
        assert_eq!(
            resp.headers().get("access-control-allow-credentials"),
            Some("true")
        );
        assert_eq!(
            resp.headers().get("access-control-expose-headers"),
            Some("x-new-token")
        );
    }

    #[test]
    fn test_apply_skips_disallowed_origin() {
        let cors = local_cors();
        let mut resp = Response::ok();

        cors.apply(Some("http://evil.com"), &mut resp);
        assert!(resp.headers().get("access-control-allow-origin").is_none());

        cors.apply(None, &mut resp);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn test_preflight() {
        let cors = local_cors();
        let mut req = Request::new(Method::OPTIONS, "/pools");
        req.headers_mut().set("origin", "http://localhost:5173");

        let resp = cors.preflight(&req);
        assert_eq!(resp.status().code(), 204);
        assert_eq!(
            resp.headers().get("access-control-allow-methods"),
            Some("*")
        );
        assert_eq!(
            resp.headers().get("access-control-allow-headers"),
            Some("*")
        );
    }
}
