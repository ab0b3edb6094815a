//! Route table
//!
//! Every handler is registered through `route`, which owns the shared
//! error translation and CORS stamping so no endpoint can forget either.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use outlast_common::Result;
use outlast_net::{NetResult, Request, Response, Router};

use crate::error::error_response;
use crate::handlers::{pools, system, users};
use crate::state::AppState;

type BoxedResponse = Pin<Box<dyn Future<Output = NetResult<Response>> + Send>>;

/// Wrap a handler: run it, translate errors, stamp CORS headers
fn route<H, Fut>(state: Arc<AppState>, handler: H) -> impl Fn(Request) -> BoxedResponse
where
    H: Fn(Arc<AppState>, Request) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    move |req: Request| {
        let state = state.clone();
        let handler = handler.clone();
        Box::pin(async move {
            let origin = req.headers().get("origin").map(str::to_string);
            let mut response = match handler(state.clone(), req).await {
                Ok(response) => response,
                Err(err) => error_response(&err),
            };
            state.cors.apply(origin.as_deref(), &mut response);
            Ok(response)
        }) as BoxedResponse
    }
}

/// Build the full route table
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();

    // System
    router.get("/", route(state.clone(), system::root));
    router.get("/health", route(state.clone(), system::health));
    router.get("/seasons", route(state.clone(), system::list_seasons));

    // Users
    router.post("/users", route(state.clone(), users::create_user));
    router.post("/users/login", route(state.clone(), users::login_user));
    router.post(
        "/users/forgot_password",
        route(state.clone(), users::forgot_password),
    );
    router.post(
        "/users/reset_password",
        route(state.clone(), users::reset_password),
    );
    router.get(
        "/users/verify/:token",
        route(state.clone(), users::verify_email),
    );
    router.get("/users/me", route(state.clone(), users::me));
    router.get("/users/search", route(state.clone(), users::search));
    router.get(
        "/users/:user_id/pools",
        route(state.clone(), users::list_pools),
    );
    router.get(
        "/users/:user_id/invites",
        route(state.clone(), users::list_invites),
    );
    router.patch(
        "/users/:user_id/default_pool",
        route(state.clone(), users::update_default_pool),
    );
    router.patch(
        "/users/:user_id/password",
        route(state.clone(), users::update_password),
    );
    router.delete("/users/:user_id", route(state.clone(), users::delete_user));

    // Pools
    router.post("/pools", route(state.clone(), pools::create_pool));
    router.delete("/pools/:pool_id", route(state.clone(), pools::delete_pool));
    router.get(
        "/pools/:pool_id/available_contestants",
        route(state.clone(), pools::available_contestants),
    );
    router.get(
        "/pools/:pool_id/contestants/:contestant_id",
        route(state.clone(), pools::contestant_detail),
    );
    router.get(
        "/pools/:pool_id/advance-status",
        route(state.clone(), pools::advance_status),
    );
    router.post(
        "/pools/:pool_id/advance-week",
        route(state.clone(), pools::advance_week),
    );
    router.get(
        "/pools/:pool_id/leaderboard",
        route(state.clone(), pools::leaderboard),
    );
    router.get(
        "/pools/:pool_id/memberships",
        route(state.clone(), pools::memberships),
    );
    router.post("/pools/:pool_id/invites", route(state.clone(), pools::invite));
    router.post(
        "/pools/:pool_id/invites/respond",
        route(state.clone(), pools::respond_to_invite),
    );
    router.post(
        "/pools/:pool_id/picks",
        route(state.clone(), pools::create_pick),
    );

    // CORS preflight for every path
    let preflight_state = state;
    router.preflight(move |req| {
        let state = preflight_state.clone();
        async move { Ok(state.cors.preflight(&req)) }
    });

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cors::CorsConfig;
    use crate::json::Json;
    use outlast_auth::{PasswordHasher, Tokenizer};
    use outlast_common::ObjectId;
    use outlast_core::{AuthGate, LogMailer, UserService};
    use outlast_net::Method;
    use outlast_pool::PoolService;
    use outlast_store::schema::{Contestant, SeasonDoc, SeasonElimination};
    use outlast_store::Store;
    use time::Duration;

    fn app() -> (Arc<AppState>, Router) {
        let store = Arc::new(Store::in_memory());
        let hasher = Arc::new(PasswordHasher::with_iterations(1000));
        let tokenizer = Arc::new(Tokenizer::new(
            b"routes-test-secret",
            Duration::days(30),
            Duration::days(3),
        ));
        let pools = PoolService::new(store.clone());
        let users = UserService::new(
            store.clone(),
            hasher,
            tokenizer.clone(),
            Arc::new(LogMailer),
            pools.clone(),
        );
        let gate = AuthGate::new(store.clone(), tokenizer);
        let cors = CorsConfig::new(r"http://(localhost|127\.0\.0\.1)(:\d+)?").unwrap();

        let state = Arc::new(AppState::new(store, users, pools, gate, cors));
        let router = build_router(state.clone());
        (state, router)
    }

    fn json_req(method: Method, path: &str, body: &str) -> Request {
        let mut req = Request::new(method, path);
        req.headers_mut().set("content-type", "application/json");
        req.set_body(body.as_bytes().to_vec());
        req
    }

    fn body_json(resp: &Response) -> Json {
        Json::parse(std::str::from_utf8(resp.body()).unwrap()).unwrap()
    }

    async fn signup_and_login(state: &Arc<AppState>, router: &Router, name: &str) -> (String, String) {
        let created = router
            .handle(json_req(
                Method::POST,
                "/users",
                &format!(
                    r#"{{"username":"{name}","email":"{name}@example.com","password":"torches"}}"#
                ),
            ))
            .await
            .unwrap();
        assert_eq!(created.status().code(), 200);
        let user_id = body_json(&created)
            .get("id")
            .and_then(Json::as_str)
            .unwrap()
            .to_string();

        // Pull the verification token out of the store and hit the page
        let oid = ObjectId::parse_str(&user_id).unwrap();
        let token = state
            .store
            .users
            .get(oid)
            .unwrap()
            .verification_token
            .unwrap();
        let verified = router
            .handle(Request::new(Method::GET, &format!("/users/verify/{}", token)))
            .await
            .unwrap();
        assert_eq!(verified.status().code(), 200);
        assert_eq!(
            verified.headers().get("content-type"),
            Some("text/html; charset=utf-8")
        );

        let logged_in = router
            .handle(json_req(
                Method::POST,
                "/users/login",
                &format!(r#"{{"identifier":"{name}","password":"torches"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(logged_in.status().code(), 200);
        let token = body_json(&logged_in)
            .get("token")
            .and_then(Json::as_str)
            .unwrap()
            .to_string();

        (user_id, token)
    }

    fn seed_season(state: &Arc<AppState>) -> ObjectId {
        let id = ObjectId::new().unwrap();
        state
            .store
            .seasons
            .insert(SeasonDoc {
                id,
                season_name: "Season 47".into(),
                season_number: Some(47),
                contestants: ["A", "B", "C", "D"]
                    .iter()
                    .map(|c| Contestant {
                        id: c.to_string(),
                        name: c.to_string(),
                        age: None,
                        occupation: None,
                        hometown: None,
                    })
                    .collect(),
                eliminations: vec![SeasonElimination {
                    week: 1,
                    eliminated_contestant_id: Some("A".into()),
                }],
                tribe_timeline: Vec::new(),
                advantages: Vec::new(),
            })
            .unwrap();
        id
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (_state, router) = app();

        let root = router.handle(Request::new(Method::GET, "/")).await.unwrap();
        assert_eq!(root.status().code(), 200);

        let health = router
            .handle(Request::new(Method::GET, "/health"))
            .await
            .unwrap();
        assert_eq!(health.status().code(), 200);
        assert_eq!(
            body_json(&health).get("status").and_then(Json::as_str),
            Some("healthy")
        );
    }

    #[tokio::test]
    async fn test_auth_required_for_protected_routes() {
        let (_state, router) = app();

        let me = router
            .handle(Request::new(Method::GET, "/users/me"))
            .await
            .unwrap();
        assert_eq!(me.status().code(), 401);
        assert_eq!(
            body_json(&me).get("detail").and_then(Json::as_str),
            Some("Missing credentials")
        );
    }

    #[tokio::test]
    async fn test_same_user_is_enforced() {
        let (state, router) = app();
        let (_alice_id, alice_token) = signup_and_login(&state, &router, "alice").await;
        let (bob_id, _bob_token) = signup_and_login(&state, &router, "bob").await;

        let mut req = Request::new(Method::GET, &format!("/users/{}/pools", bob_id));
        req.headers_mut()
            .set("authorization", format!("Bearer {}", alice_token));

        let resp = router.handle(req).await.unwrap();
        assert_eq!(resp.status().code(), 403);
        assert_eq!(
            body_json(&resp).get("detail").and_then(Json::as_str),
            Some("Cannot act on another user")
        );
    }

    #[tokio::test]
    async fn test_pool_lifecycle_over_http() {
        let (state, router) = app();
        let (alice_id, alice_token) = signup_and_login(&state, &router, "alice").await;
        let (bob_id, bob_token) = signup_and_login(&state, &router, "bob").await;
        let season_id = seed_season(&state);

        // Alice creates a pool and invites Bob
        let mut create = json_req(
            Method::POST,
            "/pools",
            &format!(
                r#"{{"name":"Island","season_id":"{}","owner_id":"{}","start_week":1,"invite_user_ids":["{}"]}}"#,
                season_id.to_hex(),
                alice_id,
                bob_id
            ),
        );
        create
            .headers_mut()
            .set("authorization", format!("Bearer {}", alice_token));
        let created = router.handle(create).await.unwrap();
        assert_eq!(created.status().code(), 201);
        let pool_id = body_json(&created)
            .get("id")
            .and_then(Json::as_str)
            .unwrap()
            .to_string();

        // Bob sees and accepts the invite
        let mut invites = Request::new(Method::GET, &format!("/users/{}/invites", bob_id));
        invites
            .headers_mut()
            .set("authorization", format!("Bearer {}", bob_token));
        let invites = router.handle(invites).await.unwrap();
        let listed = body_json(&invites);
        assert_eq!(listed.get("invites").and_then(Json::as_array).unwrap().len(), 1);

        let mut accept = json_req(
            Method::POST,
            &format!("/pools/{}/invites/respond", pool_id),
            &format!(r#"{{"user_id":"{}","action":"accept"}}"#, bob_id),
        );
        accept
            .headers_mut()
            .set("authorization", format!("Bearer {}", bob_token));
        let accepted = router.handle(accept).await.unwrap();
        assert_eq!(accepted.status().code(), 200);

        // Both lock picks; Bob picks the doomed contestant
        for (user_id, token, contestant) in [
            (&alice_id, &alice_token, "B"),
            (&bob_id, &bob_token, "A"),
        ] {
            let mut pick = json_req(
                Method::POST,
                &format!("/pools/{}/picks", pool_id),
                &format!(
                    r#"{{"user_id":"{}","contestant_id":"{}"}}"#,
                    user_id, contestant
                ),
            );
            pick.headers_mut()
                .set("authorization", format!("Bearer {}", token));
            let resp = router.handle(pick).await.unwrap();
            assert_eq!(resp.status().code(), 201);
        }

        // Alice advances the week; the pool completes in her favor
        let mut advance = json_req(
            Method::POST,
            &format!("/pools/{}/advance-week", pool_id),
            &format!(r#"{{"user_id":"{}"}}"#, alice_id),
        );
        advance
            .headers_mut()
            .set("authorization", format!("Bearer {}", alice_token));
        let report = router.handle(advance).await.unwrap();
        assert_eq!(report.status().code(), 200);
        let report = body_json(&report);
        assert_eq!(report.get("pool_completed").and_then(Json::as_bool), Some(true));
        assert_eq!(
            report.get("winners").and_then(Json::as_array).unwrap().len(),
            1
        );

        // The leaderboard reflects the finished pool
        let mut board = Request::new(
            Method::GET,
            &format!("/pools/{}/leaderboard?user_id={}", pool_id, bob_id),
        );
        board
            .headers_mut()
            .set("authorization", format!("Bearer {}", bob_token));
        let board = router.handle(board).await.unwrap();
        assert_eq!(board.status().code(), 200);
        let board = body_json(&board);
        assert_eq!(
            board.get("pool_status").and_then(Json::as_str),
            Some("completed")
        );
    }

    #[tokio::test]
    async fn test_cors_headers_on_responses_and_preflight() {
        let (_state, router) = app();

        let mut req = Request::new(Method::GET, "/health");
        req.headers_mut().set("origin", "http://localhost:5173");
        let resp = router.handle(req).await.unwrap();
        assert_eq!(
            resp.headers().get("access-control-allow-origin"),
            Some("http://localhost:5173")
        );

        let mut preflight = Request::new(Method::OPTIONS, "/pools");
        preflight
            .headers_mut()
            .set("origin", "http://localhost:5173");
        let resp = router.handle(preflight).await.unwrap();
        assert_eq!(resp.status().code(), 204);
        assert_eq!(
            resp.headers().get("access-control-allow-headers"),
            Some("*")
        );

        let mut evil = Request::new(Method::GET, "/health");
        evil.headers_mut().set("origin", "http://evil.com");
        let resp = router.handle(evil).await.unwrap();
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_invalid_ids_are_bad_requests() {
        let (state, router) = app();
        let (_user_id, token) = signup_and_login(&state, &router, "alice").await;

        let mut req = Request::new(
            Method::GET,
            "/pools/not-hex/leaderboard?user_id=also-not-hex",
        );
        req.headers_mut()
            .set("authorization", format!("Bearer {}", token));
        let resp = router.handle(req).await.unwrap();
        assert_eq!(resp.status().code(), 400);
        assert_eq!(
            body_json(&resp).get("detail").and_then(Json::as_str),
            Some("Invalid pool_id")
        );
    }
}
