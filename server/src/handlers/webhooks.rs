/// Identity provider relay
///
/// The workflow engine forwards the provider's user lifecycle events here.
/// Handlers are idempotent; re-delivery of any event is harmless.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::StatusResponse;
use crate::clients::ExternalIdentity;
use crate::error::Result;
use crate::services::IdentityService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IdentityEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: ExternalIdentity,
}

pub async fn identity(
    state: web::Data<AppState>,
    event: web::Json<IdentityEvent>,
) -> Result<HttpResponse> {
    let service = IdentityService::new(state.pool.clone());

    match event.event_type.as_str() {
        "user.created" => {
            service.resolve_or_create(&event.data).await?;
        }
        "user.updated" => {
            service.apply_update(&event.data).await?;
        }
        "user.deleted" => {
            service.remove(&event.data.id).await?;
        }
        other => {
            warn!(event_type = other, "ignoring unknown identity event");
            return Ok(HttpResponse::Ok().json(json!({ "success": true, "ignored": true })));
        }
    }

    Ok(HttpResponse::Ok().json(StatusResponse::ok("processed")))
}
