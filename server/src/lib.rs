/// LinkUp server library
///
/// REST backend for the LinkUp social platform: follow/connection graph,
/// posts and stories, direct messages, notification fan-out, and live
/// delivery over server-sent events. Identity, media storage, email and
/// deferred execution are consumed as external collaborators.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: typed records for users, content, messages, notifications
/// - `services`: business rules per component
/// - `db`: repository layer over PostgreSQL
/// - `clients`: external collaborator seams and implementations
/// - `realtime`: live-delivery registry and event payloads
/// - `jobs`: deferred-task handlers
/// - `middleware`: bearer-token authentication
/// - `error`: error taxonomy and HTTP mapping
/// - `config`: configuration management
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
