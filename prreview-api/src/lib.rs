//! HTTP API for prreview
//!
//! Thin axum layer over the assignment engine: request parsing, input
//! validation and the error-to-status mapping in [`error`].

pub mod error;
pub mod handlers;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use prreview_core::{
    AssignmentEngine, PullRequestStore, TeamService, TeamStore, UserService, UserStore,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiErr, ErrorCode};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AssignmentEngine>,
    pub teams: Arc<TeamService>,
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(engine: AssignmentEngine, teams: TeamService, users: UserService) -> Self {
        Self {
            engine: Arc::new(engine),
            teams: Arc::new(teams),
            users: Arc::new(users),
        }
    }

    /// Build every service on top of one store implementing all gateways
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: TeamStore + UserStore + PullRequestStore + 'static,
    {
        Self::new(
            AssignmentEngine::new(store.clone(), store.clone()),
            TeamService::new(store.clone()),
            UserService::new(store),
        )
    }
}

/// Build the application router.
///
/// Every response carries `X-Content-Type-Options: nosniff`. A panicking
/// handler yields the opaque 500 body and a request past `request_timeout`
/// yields 504, both in the usual error shape.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/team/health", get(handlers::health::health_check))
        .route("/users/health", get(handlers::health::health_check))
        .route("/pullRequest/health", get(handlers::health::health_check))
        .route("/team/add", post(handlers::team::add_team))
        .route("/team/get", get(handlers::team::get_team))
        .route("/users/setIsActive", post(handlers::user::set_is_active))
        .route("/users/getReview", get(handlers::user::get_reviews))
        .route(
            "/pullRequest/create",
            post(handlers::pull_request::create_pull_request),
        )
        .route(
            "/pullRequest/merge",
            post(handlers::pull_request::merge_pull_request),
        )
        .route(
            "/pullRequest/reassign",
            post(handlers::pull_request::reassign_reviewer),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(CatchPanicLayer::custom(error::handle_panic))
                .layer(HandleErrorLayer::new(error::handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = ?listener.local_addr().ok(), "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("server stopped");
    Ok(())
}
