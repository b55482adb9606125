use healthletter_service::config::{AppConfig, AuthConfig, CompletionConfig, EmailConfig};
use healthletter_service::services::auth::StaticTokenVerifier;
use healthletter_service::services::providers::{
    CompletionProvider, EmailProvider, MockCompletionProvider, MockEmailProvider,
};
use healthletter_service::startup::{router, AppState};
use std::sync::Arc;

/// Bearer token the test verifier accepts.
pub const TEST_TOKEN: &str = "test-bearer-token";

pub struct TestApp {
    pub address: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(
            Arc::new(MockCompletionProvider::default()),
            Arc::new(MockEmailProvider::new(false)),
        )
        .await
    }

    pub async fn spawn_with(
        completion_provider: Arc<dyn CompletionProvider>,
        email_provider: Arc<dyn EmailProvider>,
    ) -> Self {
        let state = AppState {
            config: test_config(),
            completion_provider,
            email_provider,
            token_verifier: Arc::new(StaticTokenVerifier::new(TEST_TOKEN, "user_test_1")),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().expect("No local addr").port();

        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
        }
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        auth: AuthConfig {
            jwks_url: "http://127.0.0.1:0/.well-known/jwks.json".to_string(),
        },
        completion: CompletionConfig {
            api_key: "test-key".to_string(),
            model: "gpt-5-nano".to_string(),
            base_url: "http://127.0.0.1:0/v1".to_string(),
            enabled: false, // Use mock
        },
        email: EmailConfig {
            sendgrid_api_key: "test-key".to_string(),
            from_email: "no-reply@yourclinic.com".to_string(),
            enabled: false, // Use mock
        },
    }
}
