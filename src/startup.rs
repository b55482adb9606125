//! Application startup and lifecycle management.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::handlers;
use crate::middleware::auth_middleware;
use crate::services::auth::{JwksVerifier, TokenVerifier};
use crate::services::providers::{
    CompletionProvider, EmailProvider, MockCompletionProvider, MockEmailProvider, OpenAiProvider,
    SendGridProvider,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state. External collaborators are injected behind
/// traits; no handler-local state escapes a single request.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub completion_provider: Arc<dyn CompletionProvider>,
    pub email_provider: Arc<dyn EmailProvider>,
    pub token_verifier: Arc<dyn TokenVerifier>,
}

/// Build the service router: both API routes sit behind the auth guard,
/// health stays open for probes.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api", post(handlers::summary::consultation_summary))
        .route("/send-email", post(handlers::email::send_email))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration: construct
    /// providers (mock fallback when disabled), fetch the JWKS, and bind the
    /// listener (port 0 = random port for testing).
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let completion_provider: Arc<dyn CompletionProvider> = if config.completion.enabled {
            match OpenAiProvider::new(config.completion.clone()) {
                Ok(provider) => {
                    tracing::info!(model = %config.completion.model, "Completion provider initialized");
                    Arc::new(provider)
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize completion provider: {}. Using mock.", e);
                    Arc::new(MockCompletionProvider::default())
                }
            }
        } else {
            tracing::info!("Completion provider disabled, using mock");
            Arc::new(MockCompletionProvider::default())
        };

        let email_provider: Arc<dyn EmailProvider> = if config.email.enabled {
            tracing::info!("SendGrid email provider initialized");
            Arc::new(SendGridProvider::new(config.email.clone()))
        } else {
            tracing::info!("SendGrid provider disabled, using mock email provider");
            Arc::new(MockEmailProvider::new(false))
        };

        let token_verifier: Arc<dyn TokenVerifier> =
            Arc::new(JwksVerifier::fetch(&config.auth.jwks_url).await.map_err(
                |e| {
                    tracing::error!("Failed to initialize token verifier: {}", e);
                    AppError::ConfigError(e)
                },
            )?);

        let state = AppState {
            config: config.clone(),
            completion_provider,
            email_provider,
            token_verifier,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("HealthLetter service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
