/// Post endpoints: creation, feed, likes, comments, saves
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{read_form, StatusResponse};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::{FeedService, NotificationService, PostService};
use crate::state::AppState;

fn post_service(state: &AppState) -> PostService {
    PostService::new(
        state.pool.clone(),
        NotificationService::new(state.pool.clone()),
        state.live.clone(),
    )
}

/// Create a post from a multipart form: `content` plus any number of
/// media files. Each file is handed to the CDN collaborator; only the
/// returned handles are stored.
pub async fn add_post(
    state: web::Data<AppState>,
    user: AuthUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload).await?;

    let mut media_urls = Vec::new();
    for (_, file) in form.files.drain(..) {
        media_urls.push(state.media.upload(file).await?);
    }

    let post = post_service(&state)
        .create_post(user.0, form.field("content"), media_urls)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

pub async fn feed(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let posts = FeedService::new(state.pool.clone()).assemble_feed(user.0).await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[derive(Debug, Deserialize)]
pub struct PostIdRequest {
    pub post_id: Uuid,
}

pub async fn like(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<PostIdRequest>,
) -> Result<HttpResponse> {
    let like_state = post_service(&state).toggle_like(user.0, req.post_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "liked": like_state.liked,
        "like_count": like_state.like_count,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub post_id: Uuid,
    pub message: String,
}

pub async fn comment(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let comment = post_service(&state)
        .add_comment(user.0, req.post_id, &req.message)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

pub async fn save(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<PostIdRequest>,
) -> Result<HttpResponse> {
    let saved = post_service(&state).toggle_save(user.0, req.post_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "saved": saved,
    })))
}

pub async fn saved(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let posts = post_service(&state).saved_posts(user.0).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn user_posts(
    state: web::Data<AppState>,
    user: AuthUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let posts = post_service(&state).posts_of(user.0, &username).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn comments(
    state: web::Data<AppState>,
    _user: AuthUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = post_service(&state).comments(*post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn likers(
    state: web::Data<AppState>,
    _user: AuthUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let likers = post_service(&state).likers(*post_id).await?;
    Ok(HttpResponse::Ok().json(likers))
}

pub async fn get_post(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = post_service(&state).get_post(user.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    post_service(&state).delete_post(user.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::ok("post deleted")))
}
