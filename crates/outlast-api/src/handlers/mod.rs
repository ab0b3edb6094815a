//! Request handlers
//!
//! Conventions: authenticate first, then enforce caller-equals-subject for
//! every endpoint that names a subject, then call exactly one core
//! operation. Handlers return `Result<Response, Error>`; the route wrapper
//! turns errors into `{"detail": …}` bodies and stamps CORS headers.

pub mod pools;
pub mod system;
pub mod users;

use outlast_common::{parse_object_id, Error, ObjectId, Result};
use outlast_core::Principal;
use outlast_net::{Request, Response};

use crate::json::Json;
use crate::state::AppState;

/// Resolve the caller from the Authorization header
pub(crate) fn authenticate(state: &AppState, req: &Request) -> Result<Principal> {
    state.gate.authenticate(req.authorization())
}

/// Reject callers acting on someone else's resources
pub(crate) fn ensure_same_user(principal: &Principal, subject: ObjectId) -> Result<()> {
    if principal.id != subject {
        return Err(Error::forbidden("Cannot act on another user"));
    }
    Ok(())
}

/// Attach a refreshed credential to the response, if one was minted
pub(crate) fn with_token(principal: &Principal, response: Response) -> Response {
    match &principal.refreshed_token {
        Some(token) => response.header("x-new-token", token),
        None => response,
    }
}

/// Parse the request body as JSON
pub(crate) fn parse_body(req: &Request) -> Result<Json> {
    let body = req
        .body_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::bad_request("Missing request body"))?;
    Json::parse(body).map_err(|_| Error::bad_request("Invalid JSON body"))
}

/// A required string field from a JSON body
pub(crate) fn require_str<'a>(body: &'a Json, field: &str) -> Result<&'a str> {
    body.get(field)
        .and_then(Json::as_str)
        .ok_or_else(|| Error::bad_request(format!("Missing field: {}", field)))
}

/// A required identifier field from a JSON body
pub(crate) fn require_id(body: &Json, field: &str) -> Result<ObjectId> {
    parse_object_id(require_str(body, field)?, field)
}

/// A required identifier from the query string
pub(crate) fn query_id(req: &Request, name: &str) -> Result<ObjectId> {
    let value = req
        .query(name)
        .ok_or_else(|| Error::bad_request(format!("Missing {}", name)))?;
    parse_object_id(value, name)
}

/// A required identifier from the path
pub(crate) fn param_id(req: &Request, name: &str) -> Result<ObjectId> {
    let value = req
        .param(name)
        .ok_or_else(|| Error::bad_request(format!("Missing {}", name)))?;
    parse_object_id(value, name)
}
