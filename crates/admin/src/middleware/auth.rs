//! Authentication extractors for admin.
//!
//! The admin identity is written to the session by the login flow; these
//! extractors only read it.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a logged-in admin of any role.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAdminAuth(admin): RequireAdminAuth) -> String {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        set_sentry_user(&admin);
        Ok(Self(admin))
    }
}

/// Extractor that requires an admin allowed to change orders.
///
/// Viewers are rejected with 403.
pub struct RequireOrderManager(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireOrderManager
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        set_sentry_user(&admin);

        if !admin.role.can_manage_orders() {
            return Err(AppError::Forbidden(
                "Your role cannot modify orders".to_string(),
            ));
        }

        Ok(Self(admin))
    }
}

async fn current_admin(parts: &Parts) -> Result<CurrentAdmin, AppError> {
    // Set by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;

    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
