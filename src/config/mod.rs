use crate::error::AppError;
use std::env;

/// Default sender when FROM_EMAIL is not configured.
const DEFAULT_FROM_EMAIL: &str = "no-reply@yourclinic.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub auth: AuthConfig,
    pub completion: CompletionConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// URL of the identity provider's JSON Web Key Set. Bearer tokens on
    /// every protected route are verified against these keys.
    pub jwks_url: String,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub sendgrid_api_key: String,
    pub from_email: String,
    pub enabled: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AppConfig {
            port: get_env("PORT", Some("8000"), is_prod)?.parse().unwrap_or(8000),
            auth: AuthConfig {
                jwks_url: get_env("JWKS_URL", None, is_prod)?,
            },
            completion: CompletionConfig {
                api_key: get_env("OPENAI_API_KEY", Some(""), is_prod)?,
                model: get_env("OPENAI_MODEL", Some("gpt-5-nano"), is_prod)?,
                base_url: get_env(
                    "OPENAI_BASE_URL",
                    Some("https://api.openai.com/v1"),
                    is_prod,
                )?,
                enabled: env::var("OPENAI_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
            email: EmailConfig {
                sendgrid_api_key: get_env("SENDGRID_API_KEY", Some(""), is_prod)?,
                from_email: get_env("FROM_EMAIL", Some(DEFAULT_FROM_EMAIL), is_prod)?,
                enabled: env::var("SENDGRID_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
