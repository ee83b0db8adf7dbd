//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/drinks`, `/drinks-detail`, `/drinks/{id}` - 음료 CRUD
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/metrics` - Prometheus 메트릭
//! - `/api-docs/openapi.json` - OpenAPI 문서
//!
//! 매칭되지 않는 경로는 404 JSON 본문을 반환합니다.

pub mod drinks;
pub mod health;

pub use drinks::{
    drinks_router, CreateDrinkRequest, DeleteDrinkResponse, DrinksLongResponse,
    DrinksShortResponse, UpdateDrinkRequest,
};
pub use health::{
    health_router, ComponentHealth, ComponentState, ComponentStatus, HealthResponse, Readiness,
};

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(drinks_router())
        .nest("/health", health_router())
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(not_found)
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => ApiError::NotFound.into_response(),
    }
}

/// OpenAPI JSON 스펙.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
