/// External collaborators the core consumes
///
/// Each seam is a trait with one production implementation: token
/// verification against the identity provider, media upload to the CDN,
/// SMTP mail, and deferred-task enqueueing against the workflow engine.
/// The core never implements these concerns itself.
pub mod auth;
pub mod email;
pub mod media;
pub mod scheduler;

pub use auth::{AuthVerifier, ExternalIdentity, RemoteAuthVerifier};
pub use email::{EmailSender, SmtpEmailSender};
pub use media::{MediaKind, MediaUploader, RemoteMediaUploader, UploadFile};
pub use scheduler::{HttpTaskScheduler, TaskScheduler};
