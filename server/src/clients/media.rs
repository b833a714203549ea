use crate::config::MediaConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// A file received from a client, held in memory until handed to the CDN.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Server-side re-validation of upload limits. Clients enforce the same
/// rules but are not trusted to.
pub fn validate_upload(file: &UploadFile, config: &MediaConfig) -> Result<MediaKind> {
    if file.bytes.is_empty() {
        return Err(AppError::InvalidOperation("uploaded file is empty".into()));
    }

    if file.content_type.starts_with("image/") {
        if file.bytes.len() > config.max_image_bytes {
            return Err(AppError::InvalidOperation(format!(
                "image exceeds the {} MB limit",
                config.max_image_bytes / (1024 * 1024)
            )));
        }
        Ok(MediaKind::Image)
    } else if file.content_type.starts_with("video/") {
        if file.bytes.len() > config.max_video_bytes {
            return Err(AppError::InvalidOperation(format!(
                "video exceeds the {} MB limit",
                config.max_video_bytes / (1024 * 1024)
            )));
        }
        Ok(MediaKind::Video)
    } else {
        Err(AppError::InvalidOperation(format!(
            "unsupported media type '{}'",
            file.content_type
        )))
    }
}

/// Turns a local file into a durable, publicly-addressable URL.
/// The core stores only the returned handle.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<String>;
}

/// Uploader backed by the media CDN's HTTP upload endpoint.
pub struct RemoteMediaUploader {
    http: reqwest::Client,
    upload_url: String,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

impl RemoteMediaUploader {
    pub fn new(upload_url: impl Into<String>, config: MediaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: upload_url.into(),
            config,
        }
    }
}

#[async_trait]
impl MediaUploader for RemoteMediaUploader {
    async fn upload(&self, file: UploadFile) -> Result<String> {
        validate_upload(&file, &self.config)?;

        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|e| AppError::InvalidOperation(format!("bad media type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("media upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "media upload rejected with status {}",
                response.status()
            )));
        }

        let body = response
            .json::<UploadResponse>()
            .await
            .map_err(|e| AppError::Internal(format!("malformed upload response: {e}")))?;

        Ok(body.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MediaConfig {
        MediaConfig {
            upload_url: String::new(),
            max_image_bytes: 5 * 1024 * 1024,
            max_video_bytes: 50 * 1024 * 1024,
        }
    }

    fn file(content_type: &str, len: usize) -> UploadFile {
        UploadFile {
            filename: "clip".into(),
            content_type: content_type.into(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn test_image_size_limit() {
        assert_eq!(
            validate_upload(&file("image/png", 1024), &config()).unwrap(),
            MediaKind::Image
        );
        assert!(validate_upload(&file("image/png", 5 * 1024 * 1024 + 1), &config()).is_err());
    }

    #[test]
    fn test_video_size_limit() {
        assert_eq!(
            validate_upload(&file("video/mp4", 1024), &config()).unwrap(),
            MediaKind::Video
        );
        assert!(validate_upload(&file("video/mp4", 50 * 1024 * 1024 + 1), &config()).is_err());
    }

    #[test]
    fn test_rejects_unknown_types_and_empty_files() {
        assert!(validate_upload(&file("application/pdf", 10), &config()).is_err());
        assert!(validate_upload(&file("image/png", 0), &config()).is_err());
    }
}
