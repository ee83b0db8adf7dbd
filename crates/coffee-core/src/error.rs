//! 영속성 계층 에러 타입.
//!
//! 음료 저장소 구현체가 반환하는 에러를 정의합니다.
//! HTTP 상태 코드로의 변환은 API 계층에서 한 곳에서만 수행합니다.

use thiserror::Error;

/// 음료 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 해당 ID의 음료가 없음
    #[error("음료를 찾을 수 없음: {0}")]
    NotFound(i64),

    /// 고유 제약 조건 위반 (중복 제목 등)
    #[error("충돌: {0}")]
    Conflict(String),

    /// 저장된 데이터를 해석할 수 없음
    #[error("손상된 레코드: {0}")]
    Corrupt(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),
}

/// 저장소 작업을 위한 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}
