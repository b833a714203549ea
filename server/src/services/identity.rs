use rand::Rng;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::clients::ExternalIdentity;
use crate::db::{is_unique_violation, user_repo};
use crate::error::{AppError, Result};
use crate::models::User;

/// Maps externally-verified identities to internal user records.
#[derive(Clone)]
pub struct IdentityService {
    pool: PgPool,
}

const HANDLE_ATTEMPTS: u32 = 5;

/// Base for a generated handle: provider handle, then email local part,
/// then a prefix of the external id.
pub fn handle_base(identity: &ExternalIdentity) -> String {
    if let Some(username) = identity.username.as_deref().filter(|u| !u.is_empty()) {
        return sanitize_handle(username);
    }
    if let Some(local) = identity
        .email
        .as_deref()
        .and_then(|e| e.split('@').next())
        .filter(|l| !l.is_empty())
    {
        return sanitize_handle(local);
    }
    format!(
        "user_{}",
        identity.id.chars().take(8).collect::<String>().to_lowercase()
    )
}

fn sanitize_handle(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}

/// Collision fallback: `<base>_<random>`.
pub fn handle_with_suffix(base: &str) -> String {
    format!("{}_{}", base, rand::thread_rng().gen_range(1000..10000))
}

impl IdentityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent upsert keyed by the external id. A first authenticated
    /// request and a provider `user.created` event both land here.
    pub async fn resolve_or_create(&self, identity: &ExternalIdentity) -> Result<User> {
        if let Some(user) = user_repo::find_by_external_id(&self.pool, &identity.id).await? {
            return Ok(user);
        }

        let full_name = identity
            .full_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Unnamed User".to_string());
        let picture = identity.picture.clone().unwrap_or_default();
        let base = handle_base(identity);

        let mut username = base.clone();
        for _ in 0..HANDLE_ATTEMPTS {
            if user_repo::username_exists(&self.pool, &username).await? {
                username = handle_with_suffix(&base);
                continue;
            }

            match user_repo::insert_user(
                &self.pool,
                &identity.id,
                identity.email.as_deref(),
                &full_name,
                &username,
                &picture,
            )
            .await
            {
                Ok(user) => {
                    info!(user_id = %user.id, username = %username, "created user from identity event");
                    return Ok(user);
                }
                Err(err) if is_unique_violation(&err) => {
                    // Either the handle raced, or the same identity was
                    // inserted concurrently. Re-check before retrying.
                    if let Some(user) =
                        user_repo::find_by_external_id(&self.pool, &identity.id).await?
                    {
                        return Ok(user);
                    }
                    username = handle_with_suffix(&base);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::Conflict(
            "could not allocate a unique handle".to_string(),
        ))
    }

    /// Last-write-wins patch from a provider update event. Events may
    /// arrive out of order, so an unknown user falls back to create.
    pub async fn apply_update(&self, identity: &ExternalIdentity) -> Result<User> {
        let updated = match user_repo::sync_identity(
            &self.pool,
            &identity.id,
            identity.email.as_deref(),
            identity.full_name.as_deref(),
            identity.username.as_deref(),
            identity.picture.as_deref(),
        )
        .await
        {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => {
                // The provider handle is taken here; keep the current one.
                warn!(external_id = %identity.id, "handle from update event already taken, keeping existing");
                user_repo::sync_identity(
                    &self.pool,
                    &identity.id,
                    identity.email.as_deref(),
                    identity.full_name.as_deref(),
                    None,
                    identity.picture.as_deref(),
                )
                .await?
            }
            Err(err) => return Err(err.into()),
        };

        match updated {
            Some(user) => Ok(user),
            None => self.resolve_or_create(identity).await,
        }
    }

    /// Delete the user record. Owned content is left in place; the store
    /// never cleans up posts or messages of a removed user.
    pub async fn remove(&self, external_id: &str) -> Result<bool> {
        let removed = user_repo::delete_by_external_id(&self.pool, external_id).await?;
        if removed {
            info!(%external_id, "removed user after identity deletion event");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(username: Option<&str>, email: Option<&str>) -> ExternalIdentity {
        ExternalIdentity {
            id: "ext_ABC12345XYZ".to_string(),
            email: email.map(String::from),
            full_name: None,
            username: username.map(String::from),
            picture: None,
        }
    }

    #[test]
    fn test_handle_prefers_provider_username() {
        assert_eq!(handle_base(&identity(Some("Jane.Doe"), Some("jd@x.io"))), "jane_doe");
    }

    #[test]
    fn test_handle_from_email_local_part() {
        assert_eq!(handle_base(&identity(None, Some("jane+doe@x.io"))), "jane_doe");
    }

    #[test]
    fn test_handle_from_external_id_prefix() {
        assert_eq!(handle_base(&identity(None, None)), "user_ext_abc1");
    }

    #[test]
    fn test_handle_suffix_keeps_base() {
        let suffixed = handle_with_suffix("jane_doe");
        assert!(suffixed.starts_with("jane_doe_"));
        let suffix = &suffixed["jane_doe_".len()..];
        let n: u32 = suffix.parse().expect("numeric suffix");
        assert!((1000..10000).contains(&n));
    }
}
