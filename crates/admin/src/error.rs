//! Unified error handling for admin.
//!
//! Every error response is JSON: `{ "error": "...", "details": [...] }`, where
//! `details` only appears when a bulk action was blocked by specific orders.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::CurrentAdmin;
use crate::orders::{BulkStateOffender, OrderError};

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order lifecycle operation failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<BulkStateOffender>>,
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Order(OrderError::Store(_))
        )
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Order(OrderError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Order(OrderError::Store(_)) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Order(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn into_body(self) -> ErrorBody {
        // Don't expose internal error details to clients
        if self.is_server_error() {
            return ErrorBody {
                error: "Internal server error".to_string(),
                details: None,
            };
        }

        match self {
            Self::Order(OrderError::InvalidBulkState { message, offenders }) => ErrorBody {
                error: message,
                details: Some(offenders),
            },
            Self::BadRequest(msg) => ErrorBody {
                error: msg,
                details: None,
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the logged-in admin.
pub fn set_sentry_user(admin: &CurrentAdmin) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin.id.to_string()),
            username: Some(admin.name.clone()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use linen_loft_core::{OrderId, OrderStatus, PaymentStatus};

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(OrderError::NotFound(OrderId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(
                OrderError::InvalidTransition {
                    from: OrderStatus::Pending,
                    to: OrderStatus::Shipped,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::EmptySelection.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(OrderError::Store(RepositoryError::NotFound).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_bulk_state_details() {
        let err = AppError::from(OrderError::InvalidBulkState {
            message: "Some orders cannot be cancelled".to_string(),
            offenders: vec![BulkStateOffender {
                order_number: "LL-1002".to_string(),
                status: OrderStatus::Delivered,
                payment_status: PaymentStatus::Paid,
            }],
        });

        let json = body_json(err.into_response()).await;
        assert_eq!(json["error"], "Some orders cannot be cancelled");
        assert_eq!(json["details"][0]["orderNumber"], "LL-1002");
        assert_eq!(json["details"][0]["status"], "DELIVERED");
    }

    #[tokio::test]
    async fn test_store_failure_hides_details() {
        let err = AppError::from(OrderError::Store(RepositoryError::DataCorruption(
            "status column is null".to_string(),
        )));
        let json = body_json(err.into_response()).await;
        assert_eq!(json["error"], "Internal server error");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_transition_message() {
        let err = AppError::from(OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Delivered,
        });
        let json = body_json(err.into_response()).await;
        assert_eq!(json["error"], "Cannot transition from PENDING to DELIVERED");
    }
}
