//! Liveness, health, and season listing

use std::sync::Arc;

use outlast_common::Result;
use outlast_net::{Request, Response};
use outlast_pool::season;

use crate::json::Json;
use crate::render;
use crate::state::AppState;

/// GET /
pub async fn root(_state: Arc<AppState>, _req: Request) -> Result<Response> {
    let body = Json::obj(vec![("message", Json::str("Outlast survivor pool API"))]);
    Ok(Response::ok().json(body.to_string()))
}

/// GET /health — always 200; the body says whether the store answered
pub async fn health(state: Arc<AppState>, _req: Request) -> Result<Response> {
    let body = match state.store.ping() {
        Ok(()) => Json::obj(vec![
            ("status", Json::str("healthy")),
            ("database", Json::str("connected")),
        ]),
        Err(err) => Json::obj(vec![
            ("status", Json::str("unhealthy")),
            ("database", Json::str("disconnected")),
            ("error", Json::str(err.to_string())),
        ]),
    };
    Ok(Response::ok().json(body.to_string()))
}

/// GET /seasons
pub async fn list_seasons(state: Arc<AppState>, _req: Request) -> Result<Response> {
    let seasons = season::list_seasons(&state.store.seasons);
    Ok(Response::ok().json(render::season_summaries(&seasons).to_string()))
}
