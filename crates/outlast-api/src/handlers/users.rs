//! User endpoints

use std::sync::Arc;

use outlast_common::{parse_object_id, Error, Result};
use outlast_net::{Request, Response};

use super::{authenticate, ensure_same_user, param_id, parse_body, require_str, with_token};
use crate::json::Json;
use crate::render;
use crate::state::AppState;

/// POST /users
pub async fn create_user(state: Arc<AppState>, req: Request) -> Result<Response> {
    let body = parse_body(&req)?;
    let view = state.users.create_user(
        require_str(&body, "username")?,
        require_str(&body, "email")?,
        require_str(&body, "password")?,
    )?;
    Ok(Response::ok().json(render::user_view(&view).to_string()))
}

/// POST /users/login
pub async fn login_user(state: Arc<AppState>, req: Request) -> Result<Response> {
    let body = parse_body(&req)?;
    let view = state.users.login_user(
        require_str(&body, "identifier")?,
        require_str(&body, "password")?,
    )?;
    Ok(Response::ok().json(render::user_view(&view).to_string()))
}

/// POST /users/forgot_password
pub async fn forgot_password(state: Arc<AppState>, req: Request) -> Result<Response> {
    let body = parse_body(&req)?;
    state
        .users
        .request_password_reset(require_str(&body, "email")?)?;
    Ok(Response::no_content())
}

/// POST /users/reset_password
pub async fn reset_password(state: Arc<AppState>, req: Request) -> Result<Response> {
    let body = parse_body(&req)?;
    state.users.complete_password_reset(
        require_str(&body, "token")?,
        require_str(&body, "new_password")?,
        require_str(&body, "confirm_password")?,
    )?;
    Ok(Response::no_content())
}

/// GET /users/verify/:token — a browser-facing HTML page
pub async fn verify_email(state: Arc<AppState>, req: Request) -> Result<Response> {
    let token = req.param("token").unwrap_or("");

    let page = match state.users.verify_user_email(token) {
        Ok(_) => verification_page(
            "Email verified",
            "Your email address is confirmed. You can close this tab and sign in.",
        ),
        Err(err) => verification_page("Verification failed", &err.message),
    };

    Ok(Response::ok().html(page))
}

fn verification_page(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n\
         <body style=\"font-family:sans-serif;max-width:32rem;margin:4rem auto;\">\n\
         <h1>{title}</h1>\n<p>{message}</p>\n</body>\n</html>\n"
    )
}

/// GET /users/me
pub async fn me(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let view = state.users.get_user_profile(principal.id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::user_view(&view).to_string()),
    ))
}

/// GET /users/:user_id/pools
pub async fn list_pools(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let user_id = param_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let pools = state.users.list_user_pools(user_id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::pool_views(&pools).to_string()),
    ))
}

/// GET /users/:user_id/invites
pub async fn list_invites(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let user_id = param_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let invites = state.pools.get_pending_invites_for_user(user_id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::pending_invites(&invites).to_string()),
    ))
}

/// GET /users/search?q=&pool_id=&limit=
pub async fn search(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;

    let query = req.query("q").unwrap_or("");
    let pool_id = match req.query("pool_id") {
        Some(value) => Some(parse_object_id(value, "pool_id")?),
        None => None,
    };
    let limit: usize = match req.query("limit") {
        Some(raw) => raw.parse().map_err(|_| Error::bad_request("Invalid limit"))?,
        None => 10,
    };
    if !(1..=25).contains(&limit) {
        return Err(Error::bad_request("Invalid limit"));
    }

    let results = state.users.search_active_users(query, pool_id, limit)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::search_results(&results).to_string()),
    ))
}

/// PATCH /users/:user_id/default_pool
pub async fn update_default_pool(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let user_id = param_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let body = parse_body(&req)?;
    let default_pool = match body.get("default_pool") {
        None | Some(Json::Null) => None,
        Some(value) => {
            let raw = value
                .as_str()
                .ok_or_else(|| Error::bad_request("Invalid default_pool"))?;
            Some(parse_object_id(raw, "default_pool")?)
        }
    };

    let view = state.users.update_default_pool(user_id, default_pool)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::user_view(&view).to_string()),
    ))
}

/// PATCH /users/:user_id/password
pub async fn update_password(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let user_id = param_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let body = parse_body(&req)?;
    state.users.update_password(
        user_id,
        require_str(&body, "current_password")?,
        require_str(&body, "new_password")?,
        require_str(&body, "confirm_password")?,
    )?;
    Ok(with_token(&principal, Response::no_content()))
}

/// DELETE /users/:user_id
pub async fn delete_user(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let user_id = param_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    state.users.delete_user(user_id)?;
    Ok(Response::no_content())
}
