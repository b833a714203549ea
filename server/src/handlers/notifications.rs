/// Notification endpoints
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::services::NotificationService;
use crate::state::AppState;

pub async fn list(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let notifications = NotificationService::new(state.pool.clone()).list(user.0).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

pub async fn unread_count(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let count = NotificationService::new(state.pool.clone())
        .unread_count(user.0)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

/// Accepts a single id or a list; only the caller's own records flip.
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

pub async fn mark_read(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<MarkReadRequest>,
) -> Result<HttpResponse> {
    let mut ids = req.ids.clone();
    if let Some(id) = req.id {
        ids.push(id);
    }
    if ids.is_empty() {
        return Err(AppError::InvalidOperation(
            "notification id required".to_string(),
        ));
    }

    let updated = NotificationService::new(state.pool.clone())
        .mark_read(user.0, &ids)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "updated": updated,
    })))
}
