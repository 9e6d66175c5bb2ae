mod error;
mod http;
mod pages;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use yoink_api::YoinkStorage;
use yoink_engine::{Publisher, Retriever};

/// Shared handler state. Both halves wrap the same storage handle.
#[derive(Clone)]
pub struct AppState {
    publisher: Arc<Publisher>,
    retriever: Arc<Retriever>,
}

impl AppState {
    pub fn new(storage: Arc<dyn YoinkStorage>) -> Self {
        Self {
            publisher: Arc::new(Publisher::new(storage.clone())),
            retriever: Arc::new(Retriever::new(storage)),
        }
    }
}

/// All routes: static pages, HAPI verb-phrase paths and the REST paths.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(pages::handle_home))
        .route("/info", get(pages::handle_info))
        .route("/quickstart", get(pages::handle_quickstart))
        // HAPI, see https://github.com/jheising/HAPI
        .route("/publish/yoink/for/{topic}", get(http::handle_publish_query))
        .route("/get/all/yoinks/from/{topic}", get(http::handle_all))
        .route("/get/latest/yoink/from/{topic}", get(http::handle_latest))
        .route("/get/last/{number}/yoinks/from/{topic}", get(http::handle_last_n))
        .route("/get/{number}/last/yoinks/from/{topic}", get(http::handle_last_n))
        .route("/get/latest/{number}/yoinks/from/{topic}", get(http::handle_last_n))
        .route("/get/{number}/latest/yoinks/from/{topic}", get(http::handle_last_n))
        // REST
        .route(
            "/yoink/{topic}",
            get(http::handle_latest).post(http::handle_publish_form),
        )
        .route("/yoinks/{topic}", get(http::handle_all))
        .route("/yoinks/{topic}/{number}", get(http::handle_last_n))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Bind `0.0.0.0:{port}` and serve until `shutdown` fires.
pub async fn run(
    port: u16,
    state: AppState,
    request_timeout: Duration,
    shutdown: CancellationToken,
) -> Result<(), String> {
    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))?;
    tracing::info!(port, "api server listening");

    serve(listener, router(state, request_timeout), shutdown).await
}

/// Serve `app` on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), String> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))
}
