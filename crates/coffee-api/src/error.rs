//! 통합 API 에러 응답 타입.
//!
//! 핸들러의 모든 실패는 [`ApiError`]로 모여 한 곳에서 HTTP 응답으로 변환됩니다.
//!
//! | 상황 | 상태 | 본문 |
//! |---|---|---|
//! | 인증/권한 실패 | 400/401/403 | `{"success": false, "error": <code>, "message": <설명>}` |
//! | 없는 자원, 조회 실패 | 404 | `{"success": false, "error": 404, "message": "resource not found"}` |
//! | 쓰기 실패, 잘못된 입력 | 422 | `{"success": false, "error": 422, "message": "unprocessable"}` |
//!
//! 내부 원인은 로그로만 남기고 응답에는 드러내지 않습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use coffee_core::StoreError;

use crate::auth::AuthError;

/// 404/422 응답 본문.
///
/// # 예시
///
/// ```json
/// {"success": false, "error": 404, "message": "resource not found"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// 항상 false
    pub success: bool,
    /// HTTP 상태 코드
    pub error: u16,
    /// 고정 메시지
    pub message: String,
}

impl ErrorBody {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            success: false,
            error: status.as_u16(),
            message: message.to_string(),
        }
    }
}

/// 인증 실패 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthErrorBody {
    /// 항상 false
    pub success: bool,
    /// 에러 코드 (예: "missing_header", "unauthorized")
    pub error: String,
    /// 설명
    pub message: String,
}

/// API 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 인증/권한 실패 (자체 상태 코드 유지)
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// 자원 없음 또는 조회 실패
    #[error("resource not found")]
    NotFound,
    /// 처리할 수 없는 요청 (원인은 로그용)
    #[error("unprocessable: {0}")]
    Unprocessable(String),
}

impl ApiError {
    /// 조회 작업 실패 변환. 모든 원인이 404가 됩니다.
    pub fn read_failure(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(_) => {}
            _ => error!(error = %err, "음료 조회 실패"),
        }
        ApiError::NotFound
    }

    /// 쓰기 작업 실패 변환. 없는 자원은 404, 나머지는 422가 됩니다.
    pub fn write_failure(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::Conflict(_) => {
                warn!(error = %err, "음료 쓰기 거부");
                ApiError::Unprocessable(err.to_string())
            }
            StoreError::Corrupt(_) | StoreError::Database(_) => {
                error!(error = %err, "음료 쓰기 실패");
                ApiError::Unprocessable(err.to_string())
            }
        }
    }

    /// 잘못된 입력.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(reason = %reason, "잘못된 요청 본문");
        ApiError::Unprocessable(reason)
    }

    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => e.status(),
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => e.into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new(StatusCode::NOT_FOUND, "resource not found")),
            )
                .into_response(),
            ApiError::Unprocessable(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorBody::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "unprocessable",
                )),
            )
                .into_response(),
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
