//! # HTTP surface
//!
//! `router` assembles the axum application: system endpoints at the root and
//! the resource API under `/api/v1`. Every request gets an `x-request-id`
//! (generated when absent, echoed back), a tracing span carrying it, and a
//! metrics observation keyed by route template.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;

pub use error::ApiError;
pub use state::AppState;

use handlers::{community, governance, knowledge, system, users, warnings};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .nest("/api/v1", api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
            let request_id = req
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            info_span!("http", method = %req.method(), uri = %req.uri(), request_id)
        }))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // users
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/me", get(users::me))
        .route("/users/me/password", put(users::change_password))
        // governance
        .route("/governance/", post(governance::create))
        .route("/governance/me", get(governance::list_mine))
        .route("/governance/all", get(governance::list_all))
        .route(
            "/governance/{id}",
            get(governance::get).put(governance::update).delete(governance::delete),
        )
        // knowledge
        .route("/knowledge/pests", post(knowledge::create_pest).get(knowledge::list_pests))
        .route(
            "/knowledge/pests/{id}",
            get(knowledge::get_pest).put(knowledge::update_pest).delete(knowledge::delete_pest),
        )
        .route("/knowledge/pests/{id}/schemes", post(knowledge::add_scheme))
        .route("/knowledge/schemes/{id}", delete(knowledge::delete_scheme))
        // community
        .route("/community/articles", post(community::create_article).get(community::list_articles))
        .route("/community/posts", post(community::create_post).get(community::list_posts))
        .route("/community/audit/pending", get(community::list_pending))
        .route("/community/audit", post(community::audit))
        .route("/community/audit/logs", get(community::audit_logs))
        // warnings
        .route("/warning/", post(warnings::publish))
        .route("/warning/active", get(warnings::list_active))
        .route("/warning/{id}", delete(warnings::delete))
}

/// Records count and latency per method, route template and status.
async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(req).await;
    state
        .metrics
        .observe(&method, &path, response.status().as_u16(), started.elapsed().as_secs_f64());
    response
}
