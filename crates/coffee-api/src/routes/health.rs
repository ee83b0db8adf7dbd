//! liveness / readiness probe.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// 서비스 전체 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Healthy,
    /// 요청은 받을 수 있지만 일부 기능이 첫 요청 때 지연될 수 있음
    Degraded,
    Unhealthy,
}

impl Readiness {
    fn status_code(self) -> StatusCode {
        match self {
            Readiness::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            Readiness::Healthy | Readiness::Degraded => StatusCode::OK,
        }
    }
}

/// 컴포넌트 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Up,
    Down,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub status: ComponentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn new(status: ComponentState, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub database: ComponentStatus,
    pub signing_keys: ComponentStatus,
}

/// readiness 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: Readiness,
    pub version: String,
    pub uptime_secs: i64,
    /// RFC 3339
    pub timestamp: String,
    pub components: ComponentHealth,
}

/// 저장소 상태와 캐시된 키 수로 전체 상태를 결정합니다.
///
/// 키가 비어 있어도 요청 시 다시 조회하므로 degraded로만 봅니다.
fn readiness(store_up: bool, key_count: usize) -> Readiness {
    match (store_up, key_count) {
        (false, _) => Readiness::Unhealthy,
        (true, 0) => Readiness::Degraded,
        (true, _) => Readiness::Healthy,
    }
}

/// 프로세스 생존 확인.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "서버 응답 가능", body = String))
)]
pub async fn health_check() -> &'static str {
    "OK"
}

/// 저장소와 서명 키 캐시 상태 확인.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "healthy 또는 degraded", body = HealthResponse),
        (status = 503, description = "저장소 연결 불가", body = HealthResponse)
    )
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let store_up = state.is_store_healthy().await;
    let key_count = state.signing_key_count().await;
    let overall = readiness(store_up, key_count);

    let database = if store_up {
        ComponentStatus {
            status: ComponentState::Up,
            message: None,
        }
    } else {
        ComponentStatus::new(ComponentState::Down, "ping 실패")
    };

    let signing_keys = match key_count {
        0 => ComponentStatus::new(ComponentState::Down, "캐시된 서명 키 없음"),
        n => ComponentStatus::new(ComponentState::Up, format!("{} keys cached", n)),
    };

    let body = HealthResponse {
        status: overall,
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: ComponentHealth {
            database,
            signing_keys,
        },
    };

    (overall.status_code(), Json(body))
}

/// `/health` 아래에 nest되는 라우터.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
