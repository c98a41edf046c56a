use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::error;

/// Error taxonomy surfaced by the API. Every variant renders as the standard
/// envelope; database and internal detail is logged server-side only.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Malformed JSON request or missing body")]
    MalformedBody(#[from] JsonRejection),

    #[error("Validation Failed: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Resource not found")]
    NotFound,

    #[error("Database error: Possible duplicate entry or constraint violation.")]
    Conflict(#[source] sqlx::Error),

    #[error("An unexpected error occurred")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // Every constraint kind (unique, foreign-key, not-null, check) is an
        // integrity violation; only errors with no constraint kind are 500s.
        match &err {
            sqlx::Error::Database(db)
                if !matches!(db.kind(), sqlx::error::ErrorKind::Other) =>
            {
                Self::Conflict(err)
            }
            _ => Self::Internal(err.into()),
        }
    }
}

/// `{ timestamp, status, error, message }` — the shape every failure takes,
/// including the 401s produced outside handler code.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    let body = ErrorBody {
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Unknown").to_string(),
        message: message.to_string(),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MalformedBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match &self {
            Self::Conflict(e) => error!(error = %e, "database constraint violation"),
            Self::Internal(e) => error!(error = %e, "unexpected error"),
            _ => {}
        }
        error_response(status, &self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Validation("Vendor name is required".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_message_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("secret detail"));
        assert_eq!(err.to_string(), "An unexpected error occurred");
    }

    #[test]
    fn non_database_sqlx_errors_map_to_internal() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[derive(Debug)]
    struct FakeDbError(sqlx::error::ErrorKind);

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "constraint violated")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.0 {
                sqlx::error::ErrorKind::UniqueViolation => {
                    sqlx::error::ErrorKind::UniqueViolation
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    sqlx::error::ErrorKind::ForeignKeyViolation
                }
                sqlx::error::ErrorKind::NotNullViolation => {
                    sqlx::error::ErrorKind::NotNullViolation
                }
                sqlx::error::ErrorKind::CheckViolation => sqlx::error::ErrorKind::CheckViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    fn database_error(kind: sqlx::error::ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError(kind)))
    }

    #[test]
    fn every_constraint_kind_maps_to_conflict() {
        use sqlx::error::ErrorKind;
        for kind in [
            ErrorKind::UniqueViolation,
            ErrorKind::ForeignKeyViolation,
            ErrorKind::NotNullViolation,
            ErrorKind::CheckViolation,
        ] {
            let err: ApiError = database_error(kind).into();
            assert!(matches!(err, ApiError::Conflict(_)));
            assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn unclassified_database_errors_map_to_internal() {
        let err: ApiError = database_error(sqlx::error::ErrorKind::Other).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
