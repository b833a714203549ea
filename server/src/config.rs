/// Configuration management for the LinkUp server
///
/// Configuration is loaded from environment variables with development
/// defaults. Production deployments must set explicit values for the
/// guarded settings (CORS origins).
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Identity verification (external auth provider)
    pub auth: AuthConfig,
    /// Media upload collaborator
    pub media: MediaConfig,
    /// SMTP settings for outgoing mail
    pub email: EmailConfig,
    /// Deferred-task collaborator (workflow engine)
    pub scheduler: SchedulerConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Auth provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token verification endpoint of the identity provider
    pub verify_url: String,
}

/// Media uploader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Upload endpoint of the media CDN collaborator
    pub upload_url: String,
    /// Maximum accepted image size in bytes
    pub max_image_bytes: usize,
    /// Maximum accepted video size in bytes
    pub max_video_bytes: usize,
}

/// SMTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host; empty means no-op mode (log only)
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// From address for all outgoing mail
    pub smtp_from: String,
    pub use_starttls: bool,
}

/// Workflow engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Enqueue endpoint of the workflow engine; empty means no-op mode
    pub url: String,
}

const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:5173".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/linkup".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            auth: AuthConfig {
                verify_url: std::env::var("AUTH_VERIFY_URL")
                    .unwrap_or_else(|_| "http://localhost:9100/v1/verify".to_string()),
            },
            media: MediaConfig {
                upload_url: std::env::var("MEDIA_UPLOAD_URL")
                    .unwrap_or_else(|_| "http://localhost:9200/upload".to_string()),
                max_image_bytes: std::env::var("MEDIA_MAX_IMAGE_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
                max_video_bytes: std::env::var("MEDIA_MAX_VIDEO_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_VIDEO_BYTES),
            },
            email: EmailConfig {
                smtp_host: std::env::var("SMTP_HOST").unwrap_or_default(),
                smtp_port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(587),
                smtp_username: std::env::var("SMTP_USERNAME").ok(),
                smtp_password: std::env::var("SMTP_PASSWORD").ok(),
                smtp_from: std::env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "LinkUp <no-reply@linkup.dev>".to_string()),
                use_starttls: std::env::var("SMTP_STARTTLS")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(true),
            },
            scheduler: SchedulerConfig {
                url: std::env::var("SCHEDULER_URL").unwrap_or_default(),
            },
        })
    }

    /// Origins allowed for cross-origin calls
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors
            .allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_parsing() {
        let config = Config {
            app: AppConfig {
                env: "development".into(),
                host: "0.0.0.0".into(),
                port: 8080,
            },
            cors: CorsConfig {
                allowed_origins: "http://localhost:5173 , https://app.linkup.dev,".into(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/linkup".into(),
                max_connections: 10,
            },
            auth: AuthConfig {
                verify_url: String::new(),
            },
            media: MediaConfig {
                upload_url: String::new(),
                max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
                max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
            },
            email: EmailConfig {
                smtp_host: String::new(),
                smtp_port: 587,
                smtp_username: None,
                smtp_password: None,
                smtp_from: "LinkUp <no-reply@linkup.dev>".into(),
                use_starttls: true,
            },
            scheduler: SchedulerConfig { url: String::new() },
        };

        assert_eq!(
            config.allowed_origins(),
            vec![
                "http://localhost:5173".to_string(),
                "https://app.linkup.dev".to_string()
            ]
        );
    }
}
