//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the demo handler
//! - Wire up middleware (tracing, request timeout)
//! - Bind server to listener in the background
//! - Cancel the run if the listener cannot be bound
//! - Stop gracefully when drained

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::lifecycle::{CancelHandle, LifecycleContext, ShutdownContext, ShutdownError, Shutdownable};

/// Application state injected into handlers.
#[derive(Clone)]
struct AppState {
    lifecycle: LifecycleContext,
    work: Duration,
}

/// Demo web server registered as a shutdown capability.
pub struct WebServer {
    stop: CancellationToken,
    task: Option<JoinHandle<Result<(), std::io::Error>>>,
}

impl WebServer {
    /// Bind `config.bind_address` and serve in the background.
    ///
    /// A bind failure is logged and cancels the run through `cancel`.
    pub fn start(config: &ServerConfig, lifecycle: &LifecycleContext, cancel: CancelHandle) -> Self {
        let stop = CancellationToken::new();
        let router = build_router(config, lifecycle);
        let bind_address = config.bind_address.clone();
        let token = stop.clone();

        let task = tokio::spawn(async move {
            let listener = match TcpListener::bind(&bind_address).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(address = %bind_address, error = %e, "Web server failed to bind");
                    cancel.cancel_with(format!("web server failed to bind {bind_address}: {e}"));
                    return Ok(());
                }
            };
            serve(listener, router, token).await
        });

        Self {
            stop,
            task: Some(task),
        }
    }

    /// Serve on an already bound listener.
    pub fn serve(listener: TcpListener, config: &ServerConfig, lifecycle: &LifecycleContext) -> Self {
        let stop = CancellationToken::new();
        let router = build_router(config, lifecycle);
        let task = tokio::spawn(serve(listener, router, stop.clone()));
        Self {
            stop,
            task: Some(task),
        }
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
fn build_router(config: &ServerConfig, lifecycle: &LifecycleContext) -> Router {
    let state = AppState {
        lifecycle: lifecycle.clone(),
        work: Duration::from_secs(config.request_work_secs),
    };
    Router::new()
        .route("/", any(work_handler))
        .route("/{*path}", any(work_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

async fn serve(
    listener: TcpListener,
    router: Router,
    stop: CancellationToken,
) -> Result<(), std::io::Error> {
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(address = %addr, "Web server listening on http://{}/", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { stop.cancelled().await })
        .await?;

    tracing::info!(address = %addr, "Web server stopped");
    Ok(())
}

/// Simulates a long-running request that gives up when the application shuts down.
async fn work_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    tracing::info!(path = %path, "New web request");

    tokio::select! {
        _ = state.lifecycle.cancelled() => {
            tracing::info!(path = %path, "Request interrupted by server shutdown");
            (StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down").into_response()
        }
        _ = tokio::time::sleep(state.work) => {
            tracing::info!(path = %path, "Request work finished");
            Html(format!(
                "<div>After {} seconds!</div><div>{}</div>",
                state.work.as_secs(),
                path
            ))
            .into_response()
        }
    }
}

#[async_trait]
impl Shutdownable for WebServer {
    async fn shutdown(&mut self, ctx: &ShutdownContext) -> Result<(), ShutdownError> {
        tracing::info!("Web server stopping");
        self.stop.cancel();
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        ctx.join(task).await?.map_err(ShutdownError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ShutdownCoordinator;

    fn config(work_secs: u64) -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            request_work_secs: work_secs,
            request_timeout_secs: 30,
        }
    }

    #[tokio::test]
    async fn test_bind_failure_cancels_run() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut cfg = config(1);
        cfg.bind_address = occupied.local_addr().unwrap().to_string();

        let lifecycle = LifecycleContext::new();
        let server = WebServer::start(&cfg, &lifecycle, lifecycle.cancel_handle());

        tokio::time::timeout(Duration::from_secs(2), lifecycle.cancelled())
            .await
            .expect("bind failure should cancel the run");
        assert!(lifecycle.cause().unwrap().contains("failed to bind"));

        let mut caps: Vec<Box<dyn Shutdownable>> = vec![Box::new(server)];
        let outcome = ShutdownCoordinator::new(Duration::from_secs(1))
            .drain(&mut caps)
            .await;
        assert!(outcome.is_success());
        assert_eq!(outcome.records()[0].name, "WebServer");
    }

    #[tokio::test]
    async fn test_idle_server_stops_cleanly() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let lifecycle = LifecycleContext::new();
        let mut server = WebServer::serve(listener, &config(1), &lifecycle);

        let ctx = ShutdownContext::new(Duration::from_secs(2));
        assert!(server.shutdown(&ctx).await.is_ok());
        assert!(server.shutdown(&ctx).await.is_ok());
    }
}
