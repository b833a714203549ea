/// HTTP request handlers
///
/// Thin layer over the services: each handler extracts the caller, parses
/// the request shape, delegates, and picks a response shape. Routes under
/// `/api` require authentication; webhook and job callbacks do not.
pub mod events;
pub mod jobs;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod stories;
pub mod users;
pub mod webhooks;

use actix_multipart::Multipart;
use actix_web::web;
use futures_util::TryStreamExt;
use serde::Serialize;
use std::collections::HashMap;

use crate::clients::UploadFile;
use crate::error::{AppError, Result};
use crate::middleware::AuthMiddleware;

/// Envelope for mutation responses.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// A parsed multipart form: text fields plus uploaded files keyed by
/// field name.
pub(crate) struct FormData {
    pub fields: HashMap<String, String>,
    pub files: Vec<(String, UploadFile)>,
}

impl FormData {
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Take the first file uploaded under the given field name.
    pub fn file(&mut self, name: &str) -> Option<UploadFile> {
        let index = self.files.iter().position(|(n, _)| n == name)?;
        Some(self.files.remove(index).1)
    }
}

/// Content type inferred from the upload's filename extension.
pub(crate) fn content_type_for(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") | Some("avi") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// Buffer a multipart payload into memory. Uploads are size-capped again
/// by the media validator before they leave the process.
pub(crate) async fn read_form(mut payload: Multipart) -> Result<FormData> {
    let mut fields = HashMap::new();
    let mut files = Vec::new();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::InvalidOperation(format!("invalid multipart payload: {e}")))?
    {
        // Fields without a content disposition carry neither a name nor a
        // file; nothing to keep from them.
        let (name, filename) = match field.content_disposition() {
            Some(disposition) => (
                disposition.get_name().unwrap_or_default().to_string(),
                disposition.get_filename().map(str::to_string),
            ),
            None => (String::new(), None),
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::InvalidOperation(format!("failed to read upload: {e}")))?
        {
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(filename) => {
                let content_type = content_type_for(&filename).to_string();
                files.push((
                    name,
                    UploadFile {
                        filename,
                        content_type,
                        bytes,
                    },
                ));
            }
            None => {
                fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    Ok(FormData { fields, files })
}

/// Route table. `/health`, `/webhooks` and `/jobs` stay outside the auth
/// wrapper; everything under `/api` requires a verified caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(AuthMiddleware)
            .service(
                web::scope("/user")
                    .route("/me", web::get().to(users::me))
                    .route("/update", web::post().to(users::update_profile))
                    .route("/profile/{username}", web::get().to(users::profile))
                    .route("/search", web::get().to(users::search))
                    .route("/discover", web::get().to(users::discover))
                    .route("/follow", web::post().to(users::follow))
                    .route("/unfollow", web::post().to(users::unfollow))
                    .route("/connect", web::post().to(users::connect))
                    .route("/accept", web::post().to(users::accept))
                    .route("/connections", web::get().to(users::connections)),
            )
            .service(
                web::scope("/post")
                    .route("/add", web::post().to(posts::add_post))
                    .route("/feed", web::get().to(posts::feed))
                    .route("/like", web::post().to(posts::like))
                    .route("/comment", web::post().to(posts::comment))
                    .route("/save", web::post().to(posts::save))
                    .route("/saved", web::get().to(posts::saved))
                    .route("/user/{username}", web::get().to(posts::user_posts))
                    .route("/{id}/comments", web::get().to(posts::comments))
                    .route("/{id}/likes", web::get().to(posts::likers))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            .service(
                web::scope("/story")
                    .route("/create", web::post().to(stories::create))
                    .route("/feed", web::get().to(stories::feed))
                    .route("/view/{id}", web::post().to(stories::view)),
            )
            .service(
                web::scope("/message")
                    .route("/send", web::post().to(messages::send))
                    .route("/recent", web::get().to(messages::recent))
                    .route("/{user_id}", web::get().to(messages::thread)),
            )
            .service(
                web::scope("/notifications")
                    .route("", web::get().to(notifications::list))
                    .route("/unread-count", web::get().to(notifications::unread_count))
                    .route("/read", web::post().to(notifications::mark_read)),
            )
            .service(web::scope("/sse").route("/stream", web::get().to(events::stream))),
    )
    .service(web::scope("/webhooks").route("/identity", web::post().to(webhooks::identity)))
    .service(web::scope("/jobs").route("/dispatch", web::post().to(jobs::dispatch)));
}

#[cfg(test)]
mod tests {
    use super::content_type_for;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for("beach.JPG"), "image/jpeg");
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
