/// Direct-message endpoints
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::read_form;
use crate::clients::media::validate_upload;
use crate::clients::MediaKind;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::services::{MessageService, NotificationService};
use crate::state::AppState;

fn message_service(state: &AppState) -> MessageService {
    MessageService::new(
        state.pool.clone(),
        NotificationService::new(state.pool.clone()),
        state.live.clone(),
    )
}

/// Send a message: `to_user_id`, optional `text`, optional `image` file.
pub async fn send(
    state: web::Data<AppState>,
    user: AuthUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload).await?;

    let to_user_id = form
        .field("to_user_id")
        .ok_or_else(|| AppError::InvalidOperation("to_user_id is required".to_string()))?
        .parse::<Uuid>()
        .map_err(|_| AppError::InvalidOperation("invalid user id".to_string()))?;

    let media_url = match form.file("image") {
        Some(file) => {
            let kind = validate_upload(&file, &state.config.media)?;
            if kind != MediaKind::Image {
                return Err(AppError::InvalidOperation(
                    "only images can be attached to messages".to_string(),
                ));
            }
            Some(state.media.upload(file).await?)
        }
        None => None,
    };

    let message = message_service(&state)
        .send_message(user.0, to_user_id, form.field("text"), media_url)
        .await?;

    Ok(HttpResponse::Created().json(message))
}

/// The full thread with one peer; fetching marks their messages seen.
pub async fn thread(
    state: web::Data<AppState>,
    user: AuthUser,
    peer_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let messages = message_service(&state).fetch_thread(user.0, *peer_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// Latest message per correspondent for the inbox overview.
pub async fn recent(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let threads = message_service(&state).recent_threads(user.0).await?;
    Ok(HttpResponse::Ok().json(threads))
}
