//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `main`에서 명시적으로 만들어지며 Arc로 래핑되어
//! 여러 요청 간에 공유됩니다. 전역 싱글톤은 없습니다.

use std::sync::Arc;

use coffee_core::DrinkStore;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::auth::{HasVerifier, TokenVerifier};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 음료 저장소
    pub store: Arc<dyn DrinkStore>,

    /// Bearer 토큰 검증기 (서명 키 캐시 포함)
    pub verifier: Arc<TokenVerifier>,

    /// Prometheus 렌더링 핸들 (설치된 경우에만)
    pub metrics: Option<PrometheusHandle>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(store: Arc<dyn DrinkStore>, verifier: Arc<TokenVerifier>) -> Self {
        Self {
            store,
            verifier,
            metrics: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Prometheus 핸들 설정.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 저장소 연결 상태.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.ping().await
    }

    /// 캐시된 서명 키 수.
    pub async fn signing_key_count(&self) -> usize {
        self.verifier.keys().key_count().await
    }
}

impl HasVerifier for AppState {
    fn token_verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 메모리 SQLite 저장소와 고정 JWKS 검증기를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub async fn create_test_state() -> AppState {
    use crate::repository::SqliteDrinkStore;
    use crate::test_support::test_verifier;

    let store = SqliteDrinkStore::in_memory()
        .await
        .expect("Failed to create in-memory store for test");

    AppState::new(Arc::new(store), Arc::new(test_verifier()))
}
