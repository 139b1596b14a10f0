//! Mapping of core errors onto HTTP responses.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use matchgrid_core::{
    BackendError, FrontendError, MmfError, QueryError, StoreError, SyncError,
};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match &e {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<FrontendError> for ApiError {
    fn from(e: FrontendError) -> Self {
        match e {
            FrontendError::InvalidArgument(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            FrontendError::Store(e) => e.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::InvalidArgument(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            QueryError::Store(e) => e.into(),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        let status = match &e {
            SyncError::WindowClosed(_) => StatusCode::PRECONDITION_FAILED,
            SyncError::ShuttingDown | SyncError::WindowAborted(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<MmfError> for ApiError {
    fn from(e: MmfError) -> Self {
        match e {
            MmfError::InvalidArgument(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            MmfError::Internal(msg) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::InvalidArgument(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            BackendError::NotFound(id) => {
                Self::new(StatusCode::NOT_FOUND, format!("ticket not found: {}", id))
            }
            BackendError::Mmf(e) => e.into(),
            BackendError::Sync(e) => e.into(),
            BackendError::Store(e) => e.into(),
        }
    }
}
