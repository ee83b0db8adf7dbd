//! 커피숍 음료 메뉴 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 음료 CRUD API
//! - 외부 발급 Bearer 토큰 검증과 작업별 권한 확인
//! - SQLite 저장소
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 토큰 검증 및 권한 확인
//! - [`repository`]: SQLite 음료 저장소
//! - [`error`]: API 에러와 응답 변환
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서
//! - [`server`]: 전체 라우터 조립

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use auth::{AuthError, Authorized, Claims, JwksCache, TokenVerifier, VerifierConfig};
pub use error::{ApiError, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::*;
pub use server::create_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
