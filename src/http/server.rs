//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the downstream placeholder handler
//! - Wire up middleware (gatekeeper, request ID, tracing, timeout)
//! - Bind server to listener
//! - Run the rate limiter sweeper alongside the server

use axum::{
    extract::Extension,
    http::{HeaderName, Uri},
    middleware,
    response::IntoResponse,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatekeeperConfig;
use crate::gatekeeper::Gatekeeper;
use crate::http::middleware::gatekeeper_middleware;
use crate::lifecycle::Shutdown;
use crate::locale::{RegistryError, ResolvedLocale};
use crate::security::LoginRateLimiter;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// How long background tasks get to stop after the server has drained.
const BACKGROUND_GRACE: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gatekeeper: Arc<Gatekeeper>,
    /// Shared with the credential login handler; the gatekeeper never calls it.
    pub login_limiter: Arc<LoginRateLimiter>,
}

/// HTTP server for the gatekeeper.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: GatekeeperConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatekeeperConfig) -> Result<Self, RegistryError> {
        let state = AppState {
            gatekeeper: Arc::new(Gatekeeper::from_config(&config)?),
            login_limiter: Arc::new(LoginRateLimiter::from_config(&config.rate_limit)),
        };
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatekeeperConfig, state: AppState) -> Router {
        Router::new()
            .fallback(page_handler)
            .layer(middleware::from_fn_with_state(state, gatekeeper_middleware))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The fully layered router, for driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let background = Shutdown::new();
        let sweeper = tokio::spawn(run_sweeper(
            self.state.login_limiter.clone(),
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs.max(1)),
            background.subscribe(),
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        background.trigger_and_join(sweeper, BACKGROUND_GRACE).await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Periodically drop expired rate limit records.
async fn run_sweeper(
    limiter: Arc<LoginRateLimiter>,
    interval: Duration,
    mut stop: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = limiter.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "Swept expired rate limit records");
                }
            }
            _ = stop.recv() => break,
        }
    }
}

/// Stand-in for the page router: reports what the gatekeeper decided.
async fn page_handler(uri: Uri, locale: Option<Extension<ResolvedLocale>>) -> impl IntoResponse {
    let (code, source) = match locale {
        Some(Extension(resolved)) => (
            Some(resolved.code.to_string()),
            Some(resolved.source.as_str()),
        ),
        None => (None, None),
    };
    Json(serde_json::json!({
        "path": uri.path(),
        "locale": code,
        "locale_source": source,
    }))
}
