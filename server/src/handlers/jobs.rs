/// Workflow engine callback
///
/// The engine invokes this endpoint when a deferred task's time comes.
/// Each task re-validates current state, so duplicate deliveries and
/// stale payloads degrade to no-ops.
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::jobs::TaskKind;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

pub async fn dispatch(
    state: web::Data<AppState>,
    req: web::Json<DispatchRequest>,
) -> Result<HttpResponse> {
    let kind = TaskKind::try_from(req.kind.as_str())?;
    let result = crate::jobs::dispatch(&state, kind, req.payload.clone()).await?;

    Ok(HttpResponse::Ok().json(result))
}
