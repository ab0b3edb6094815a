//! Error to response translation

use outlast_common::Error;
use outlast_net::{Response, StatusCode};

use crate::json::Json;

/// Render a core error as `{"detail": message}` with its mapped status
pub fn error_response(err: &Error) -> Response {
    if err.is_server_error() {
        tracing::error!(code = %err.code, message = %err.message, "Request failed");
    } else {
        tracing::debug!(code = %err.code, message = %err.message, "Request rejected");
    }

    let body = Json::obj(vec![("detail", Json::str(err.message.clone()))]);
    Response::new(StatusCode::from_u16(err.http_status())).json(body.to_string())
}
