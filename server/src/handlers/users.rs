/// User profile and relationship-graph endpoints
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::{read_form, StatusResponse};
use crate::db::{is_unique_violation, user_repo};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::services::{ConnectionOutcome, GraphService, NotificationService};
use crate::state::AppState;

fn graph_service(state: &AppState) -> GraphService {
    GraphService::new(
        state.pool.clone(),
        NotificationService::new(state.pool.clone()),
        state.email.clone(),
        state.scheduler.clone(),
    )
}

/// The resolved caller, as created/synced from the identity provider.
pub async fn me(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let user = user_repo::find_by_id(&state.pool, user.0)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(user))
}

/// Edit profile fields; images go through the media collaborator first.
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload).await?;

    let username = form.field("username");
    if let Some(username) = username.as_deref() {
        let current = user_repo::find_by_id(&state.pool, user.0)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        if current.username.as_deref() != Some(username)
            && user_repo::username_exists(&state.pool, username).await?
        {
            return Err(AppError::InvalidOperation(
                "username already exists".to_string(),
            ));
        }
    }

    let mut profile_picture = None;
    if let Some(file) = form.file("profile_picture") {
        profile_picture = Some(state.media.upload(file).await?);
    }
    let mut cover_photo = None;
    if let Some(file) = form.file("cover_photo") {
        cover_photo = Some(state.media.upload(file).await?);
    }

    let full_name = form.field("full_name");
    let bio = form.field("bio");
    let location = form.field("location");

    let updated = user_repo::update_profile(
        &state.pool,
        user.0,
        full_name.as_deref(),
        username.as_deref(),
        bio.as_deref(),
        location.as_deref(),
        profile_picture.as_deref(),
        cover_photo.as_deref(),
    )
    .await
    .map_err(|err| {
        // The pre-check can race with another writer.
        if is_unique_violation(&err) {
            AppError::Conflict("username already exists".to_string())
        } else {
            err.into()
        }
    })?;

    Ok(HttpResponse::Ok().json(updated))
}

pub async fn profile(
    state: web::Data<AppState>,
    _user: AuthUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = user_repo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
}

pub async fn search(
    state: web::Data<AppState>,
    _user: AuthUser,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let keyword = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::InvalidOperation("keyword is required".to_string()))?;

    let users = user_repo::search(&state.pool, keyword).await?;
    Ok(HttpResponse::Ok().json(users))
}

pub async fn discover(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let users = user_repo::discover(&state.pool, user.0).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub id: Uuid,
}

pub async fn follow(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<TargetRequest>,
) -> Result<HttpResponse> {
    let followed = graph_service(&state).follow(user.0, req.id).await?;
    let message = if followed {
        "followed successfully"
    } else {
        "already following"
    };

    Ok(HttpResponse::Ok().json(StatusResponse::ok(message)))
}

pub async fn unfollow(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<TargetRequest>,
) -> Result<HttpResponse> {
    let removed = graph_service(&state).unfollow(user.0, req.id).await?;
    let message = if removed {
        "unfollowed successfully"
    } else {
        "you were not following this user"
    };

    Ok(HttpResponse::Ok().json(StatusResponse::ok(message)))
}

pub async fn connect(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<TargetRequest>,
) -> Result<HttpResponse> {
    let outcome = graph_service(&state).request_connection(user.0, req.id).await?;
    let message = match outcome {
        ConnectionOutcome::Requested => "connection request sent",
        ConnectionOutcome::AlreadyPending => "connection request already pending",
    };

    Ok(HttpResponse::Ok().json(StatusResponse::ok(message)))
}

pub async fn accept(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<TargetRequest>,
) -> Result<HttpResponse> {
    graph_service(&state).accept_connection(user.0, req.id).await?;

    Ok(HttpResponse::Ok().json(StatusResponse::ok("connection request accepted")))
}

pub async fn connections(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let relationships = graph_service(&state).relationships(user.0).await?;
    Ok(HttpResponse::Ok().json(relationships))
}
