use crate::clients::{AuthVerifier, EmailSender, MediaUploader, TaskScheduler};
use crate::config::Config;
use crate::realtime::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state handed to every handler.
///
/// The collaborators live behind trait objects so tests and alternative
/// providers can swap them without touching call sites.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub auth: Arc<dyn AuthVerifier>,
    pub media: Arc<dyn MediaUploader>,
    pub email: Arc<dyn EmailSender>,
    pub scheduler: Arc<dyn TaskScheduler>,
    pub live: ConnectionManager,
}
