//! HTTP server implementation

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::{NetError, NetResult, Request, Response, Router, StatusCode, MAX_BODY_SIZE, MAX_HEADER_SIZE};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Create a new server config
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self { addr: addr.into() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(([127, 0, 0, 1], 8080))
    }
}

/// HTTP server: one tokio task per connection, keep-alive loop inside
pub struct Server {
    config: ServerConfig,
    router: Arc<Router>,
}

impl Server {
    /// Create a new server with the given config and router
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
        }
    }

    /// Get the configured address
    pub fn addr(&self) -> SocketAddr {
        self.config.addr
    }

    /// Run the accept loop
    pub async fn run(&self) -> NetResult<()> {
        let listener = TcpListener::bind(self.config.addr).await?;
        tracing::info!(addr = %self.config.addr, "Server listening");

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let router = self.router.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_connection(stream, router).await {
                            tracing::debug!(peer = %addr, error = %e, "Connection ended");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Serve requests on one connection until it closes
    async fn handle_connection(stream: TcpStream, router: Arc<Router>) -> NetResult<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        loop {
            let request = match Self::read_request(&mut reader).await {
                Ok(req) => req,
                Err(NetError::ConnectionClosed) => break,
                Err(e) => {
                    let response = Self::error_response(&e);
                    writer.write_all(&response.to_bytes()).await?;
                    break;
                }
            };

            let keep_alive = request.headers().is_keep_alive();

            let response = match router.handle(request).await {
                Ok(resp) => resp,
                Err(e) => Self::error_response(&e),
            };

            writer.write_all(&response.to_bytes()).await?;
            writer.flush().await?;

            if !keep_alive {
                break;
            }
        }

        Ok(())
    }

    /// Read one request: header block line by line, then the body per
    /// Content-Length
    async fn read_request<R>(reader: &mut BufReader<R>) -> NetResult<Request>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut head = String::new();
        loop {
            let mut line = String::new();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                return Err(NetError::ConnectionClosed);
            }

            head.push_str(&line);
            if head.len() > MAX_HEADER_SIZE {
                return Err(NetError::HeaderTooLarge);
            }

            if line == "\r\n" || line == "\n" {
                break;
            }
        }

        if head.trim().is_empty() {
            return Err(NetError::InvalidRequest("Empty request".into()));
        }

        let mut request = Request::parse_head(&head)?;

        if let Some(content_length) = request.headers().content_length() {
            if content_length > MAX_BODY_SIZE {
                return Err(NetError::RequestTooLarge);
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).await?;
            request.set_body(body);
        }

        Ok(request)
    }

    /// Create an error response from a NetError
    fn error_response(error: &NetError) -> Response {
        let (status, message) = match error {
            NetError::NotFound => (StatusCode::NotFound, "Not Found"),
            NetError::MethodNotAllowed => (StatusCode::MethodNotAllowed, "Method Not Allowed"),
            NetError::InvalidRequest(_) => (StatusCode::BadRequest, "Bad Request"),
            NetError::RequestTooLarge => (StatusCode::PayloadTooLarge, "Payload Too Large"),
            NetError::HeaderTooLarge => (StatusCode::BadRequest, "Header Too Large"),
            _ => (StatusCode::InternalServerError, "Internal Server Error"),
        };

        Response::new(status).json(format!("{{\"detail\":\"{}\"}}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config() {
        let config = ServerConfig::new(([127, 0, 0, 1], 3000));
        assert_eq!(config.addr.port(), 3000);
    }

    #[tokio::test]
    async fn test_read_request_with_body() {
        let raw = b"POST /pools HTTP/1.1\r\nContent-Length: 13\r\n\r\n{\"name\":\"x\"}!";
        let mut reader = BufReader::new(&raw[..]);

        let req = Server::read_request(&mut reader).await.unwrap();
        assert_eq!(req.method(), crate::Method::POST);
        assert_eq!(req.body().len(), 13);
        assert_eq!(req.body_str(), Some("{\"name\":\"x\"}!"));
    }

    #[tokio::test]
    async fn test_read_request_rejects_oversized_body() {
        let raw = format!(
            "POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            MAX_BODY_SIZE + 1
        );
        let mut reader = BufReader::new(raw.as_bytes());

        let result = Server::read_request(&mut reader).await;
        assert!(matches!(result, Err(NetError::RequestTooLarge)));
    }

    #[tokio::test]
    async fn test_closed_connection() {
        let raw: &[u8] = b"";
        let mut reader = BufReader::new(raw);

        let result = Server::read_request(&mut reader).await;
        assert!(matches!(result, Err(NetError::ConnectionClosed)));
    }
}
