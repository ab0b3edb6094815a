//! HTTP request routing

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::http::Method;
use crate::{NetError, NetResult, Request, Response};

/// Handler function type
pub type Handler = Arc<
    dyn Fn(Request) -> Pin<Box<dyn Future<Output = NetResult<Response>> + Send>> + Send + Sync,
>;

/// A route entry
#[derive(Clone)]
struct Route {
    method: Method,
    segments: Vec<PathSegment>,
}

/// A path segment for pattern matching
#[derive(Clone, Debug)]
enum PathSegment {
    /// Literal segment (e.g., "pools")
    Literal(String),
    /// Parameter segment (e.g., ":pool_id")
    Param(String),
}

impl Route {
    fn new(method: Method, pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if let Some(name) = s.strip_prefix(':') {
                    PathSegment::Param(name.to_string())
                } else {
                    PathSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self { method, segments }
    }

    fn matches_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, value) in self.segments.iter().zip(&path_segments) {
            match segment {
                PathSegment::Literal(s) => {
                    if s != value {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        Some(params)
    }
}

/// HTTP request router with `:param` patterns
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<(Route, Handler)>,
    /// Handles OPTIONS requests for any known path (CORS preflight)
    preflight: Option<Handler>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            preflight: None,
        }
    }

    /// Add a GET route
    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NetResult<Response>> + Send + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    /// Add a POST route
    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NetResult<Response>> + Send + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    /// Add a PATCH route
    pub fn patch<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NetResult<Response>> + Send + 'static,
    {
        self.route(Method::PATCH, path, handler)
    }

    /// Add a DELETE route
    pub fn delete<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NetResult<Response>> + Send + 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    /// Add a route for an explicit method
    pub fn route<F, Fut>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NetResult<Response>> + Send + 'static,
    {
        let handler = box_handler(handler);
        self.routes.push((Route::new(method, path), handler));
        self
    }

    /// Answer OPTIONS for every known path (CORS preflight)
    pub fn preflight<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NetResult<Response>> + Send + 'static,
    {
        self.preflight = Some(box_handler(handler));
        self
    }

    /// Route a request to the matching handler
    pub async fn handle(&self, mut request: Request) -> NetResult<Response> {
        let method = request.method();
        let path = request.path().to_string();

        if method == Method::OPTIONS {
            if let Some(handler) = &self.preflight {
                return (handler)(request).await;
            }
        }

        for (route, handler) in &self.routes {
            if route.method != method {
                continue;
            }
            if let Some(params) = route.matches_path(&path) {
                request.set_params(params);
                return (handler)(request).await;
            }
        }

        // Path known under another method?
        let path_matches = self
            .routes
            .iter()
            .any(|(route, _)| route.matches_path(&path).is_some());
        if path_matches {
            return Err(NetError::MethodNotAllowed);
        }

        Err(NetError::NotFound)
    }

    /// Number of registered routes
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

fn box_handler<F, Fut>(handler: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NetResult<Response>> + Send + 'static,
{
    Arc::new(move |req: Request| {
        Box::pin(handler(req)) as Pin<Box<dyn Future<Output = NetResult<Response>> + Send>>
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hello(_req: Request) -> NetResult<Response> {
        Ok(Response::ok().text("hello"))
    }

    async fn echo_id(req: Request) -> NetResult<Response> {
        let id = req.param("id").unwrap_or("?").to_string();
        Ok(Response::ok().text(id))
    }

    #[tokio::test]
    async fn test_literal_route() {
        let mut router = Router::new();
        router.get("/health", hello);

        let res = router.handle(Request::new(Method::GET, "/health")).await;
        assert_eq!(res.unwrap().status().code(), 200);
    }

    #[tokio::test]
    async fn test_param_route() {
        let mut router = Router::new();
        router.get("/pools/:id/leaderboard", echo_id);

        let res = router
            .handle(Request::new(Method::GET, "/pools/abc123/leaderboard"))
            .await
            .unwrap();
        assert_eq!(res.body(), b"abc123");
    }

    #[tokio::test]
    async fn test_not_found_and_wrong_method() {
        let mut router = Router::new();
        router.get("/health", hello);

        let missing = router.handle(Request::new(Method::GET, "/nope")).await;
        assert!(matches!(missing, Err(NetError::NotFound)));

        let wrong = router.handle(Request::new(Method::POST, "/health")).await;
        assert!(matches!(wrong, Err(NetError::MethodNotAllowed)));
    }

    #[tokio::test]
    async fn test_preflight_catches_options() {
        let mut router = Router::new();
        router.get("/health", hello);
        router.preflight(|_req| async { Ok(Response::no_content()) });

        let res = router
            .handle(Request::new(Method::OPTIONS, "/anything"))
            .await
            .unwrap();
        assert_eq!(res.status().code(), 204);
    }
}
