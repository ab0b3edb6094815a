//! Pool, invite, and pick endpoints

use std::sync::Arc;

use outlast_common::{parse_object_id, Error, ObjectId, Result};
use outlast_net::{Request, Response};

use super::{
    authenticate, ensure_same_user, param_id, parse_body, query_id, require_id, require_str,
    with_token,
};
use crate::json::Json;
use crate::render;
use crate::state::AppState;

/// POST /pools
pub async fn create_pool(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let body = parse_body(&req)?;

    let owner_id = require_id(&body, "owner_id")?;
    ensure_same_user(&principal, owner_id)?;

    let season_id = require_id(&body, "season_id")?;
    let name = require_str(&body, "name")?;
    let start_week = match body.get("start_week") {
        None | Some(Json::Null) => 1,
        Some(value) => value
            .as_i64()
            .filter(|w| *w >= 0)
            .ok_or_else(|| Error::bad_request("Invalid start_week"))?
            as u32,
    };

    let mut invitees: Vec<ObjectId> = Vec::new();
    if let Some(raw) = body.get("invite_user_ids") {
        let items = raw
            .as_array()
            .ok_or_else(|| Error::bad_request("Invalid invite_user_ids"))?;
        for item in items {
            let value = item
                .as_str()
                .ok_or_else(|| Error::bad_request("Invalid invite_user_ids"))?;
            invitees.push(parse_object_id(value, "invite_user_ids")?);
        }
    }

    let view = state
        .pools
        .create_pool(owner_id, name, season_id, start_week, &invitees)?;
    Ok(with_token(
        &principal,
        Response::created().json(render::pool_view(&view).to_string()),
    ))
}

/// DELETE /pools/:pool_id?owner_id=
pub async fn delete_pool(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let owner_id = query_id(&req, "owner_id")?;
    ensure_same_user(&principal, owner_id)?;

    state.pools.delete_pool(pool_id, owner_id)?;
    Ok(with_token(&principal, Response::no_content()))
}

/// GET /pools/:pool_id/available_contestants?user_id=
pub async fn available_contestants(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let user_id = query_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let view = state.pools.get_available_contestants(pool_id, user_id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::available_contestants(&view).to_string()),
    ))
}

/// GET /pools/:pool_id/contestants/:contestant_id?user_id=
pub async fn contestant_detail(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let contestant_id = req
        .param("contestant_id")
        .ok_or_else(|| Error::bad_request("Missing contestant_id"))?
        .to_string();
    let user_id = query_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let view = state
        .pools
        .get_contestant_detail(pool_id, &contestant_id, user_id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::contestant_detail(&view).to_string()),
    ))
}

/// GET /pools/:pool_id/advance-status?user_id=
pub async fn advance_status(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let user_id = query_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let status = state.pools.get_advance_status(pool_id, user_id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::advance_status(&status).to_string()),
    ))
}

/// POST /pools/:pool_id/advance-week
pub async fn advance_week(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let body = parse_body(&req)?;
    let user_id = require_id(&body, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let report = state.pools.advance_week(pool_id, user_id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::advance_report(&report).to_string()),
    ))
}

/// GET /pools/:pool_id/leaderboard?user_id=
pub async fn leaderboard(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let user_id = query_id(&req, "user_id")?;
    ensure_same_user(&principal, user_id)?;

    let view = state.pools.get_pool_leaderboard(pool_id, user_id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::leaderboard(&view).to_string()),
    ))
}

/// GET /pools/:pool_id/memberships?owner_id=
pub async fn memberships(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let owner_id = query_id(&req, "owner_id")?;
    ensure_same_user(&principal, owner_id)?;

    let list = state.pools.list_pool_memberships(pool_id, owner_id)?;
    Ok(with_token(
        &principal,
        Response::ok().json(render::membership_list(&list).to_string()),
    ))
}

/// POST /pools/:pool_id/invites
pub async fn invite(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let body = parse_body(&req)?;
    let owner_id = require_id(&body, "owner_id")?;
    ensure_same_user(&principal, owner_id)?;
    let invited_user_id = require_id(&body, "invited_user_id")?;

    let member = state
        .pools
        .invite_user_to_pool(pool_id, owner_id, invited_user_id)?;
    let json = Json::obj(vec![("member", render::member_summary(&member))]);
    Ok(with_token(&principal, Response::ok().json(json.to_string())))
}

/// POST /pools/:pool_id/invites/respond
pub async fn respond_to_invite(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let body = parse_body(&req)?;
    let user_id = require_id(&body, "user_id")?;
    ensure_same_user(&principal, user_id)?;
    let action = require_str(&body, "action")?;

    let member = state.pools.respond_to_invite(pool_id, user_id, action)?;
    let json = Json::obj(vec![("member", render::member_summary(&member))]);
    Ok(with_token(&principal, Response::ok().json(json.to_string())))
}

/// POST /pools/:pool_id/picks
pub async fn create_pick(state: Arc<AppState>, req: Request) -> Result<Response> {
    let principal = authenticate(&state, &req)?;
    let pool_id = param_id(&req, "pool_id")?;
    let body = parse_body(&req)?;
    let user_id = require_id(&body, "user_id")?;
    ensure_same_user(&principal, user_id)?;
    let contestant_id = require_str(&body, "contestant_id")?;

    let pick = state.pools.create_pick(pool_id, user_id, contestant_id)?;
    Ok(with_token(
        &principal,
        Response::created().json(render::pick_view(&pick).to_string()),
    ))
}
