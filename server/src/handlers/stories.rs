/// Story endpoints: create, feed, view
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::read_form;
use crate::clients::media::validate_upload;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::{FeedService, StoryService};
use crate::state::AppState;

/// Create (replace) the caller's story: one media file, or text on a
/// background.
pub async fn create(
    state: web::Data<AppState>,
    user: AuthUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload).await?;

    let media = match form.file("media") {
        Some(file) => {
            // The kind drives media_type, so classify before uploading.
            let kind = validate_upload(&file, &state.config.media)?;
            let url = state.media.upload(file).await?;
            Some((url, kind))
        }
        None => None,
    };

    let story = StoryService::new(state.pool.clone(), state.scheduler.clone())
        .create_story(user.0, media, form.field("text"), form.field("background"))
        .await?;

    Ok(HttpResponse::Created().json(story))
}

pub async fn feed(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let stories = FeedService::new(state.pool.clone())
        .assemble_story_feed(user.0)
        .await?;

    Ok(HttpResponse::Ok().json(stories))
}

pub async fn view(
    state: web::Data<AppState>,
    user: AuthUser,
    story_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let story = StoryService::new(state.pool.clone(), state.scheduler.clone())
        .view_story(user.0, *story_id)
        .await?;

    Ok(HttpResponse::Ok().json(story))
}
