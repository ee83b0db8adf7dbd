//! Prometheus 메트릭.
//!
//! | 이름 | 종류 | 라벨 |
//! |---|---|---|
//! | `http_requests_total` | counter | method, path |
//! | `http_responses_total` | counter | method, path, status |
//! | `http_request_duration_seconds` | histogram | method, path |
//! | `auth_rejections_total` | counter | code |
//! | `jwks_refresh_total` | counter | outcome |

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// 전역 레코더를 설치합니다. 프로세스당 한 번만 호출할 수 있습니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".into()),
            DURATION_BUCKETS,
        )?
        .install_recorder()
}

/// 한 HTTP 요청의 라벨 묶음.
#[derive(Debug, Clone)]
pub struct HttpLabels {
    method: String,
    path: String,
}

impl HttpLabels {
    /// `path`는 라우트 템플릿이거나 이미 정규화된 경로여야 합니다.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 요청 수신 기록.
    pub fn record_request(&self) {
        counter!(
            "http_requests_total",
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .increment(1);
    }

    /// 응답 상태와 처리 시간 기록.
    pub fn record_response(&self, status: u16, elapsed: Duration) {
        counter!(
            "http_responses_total",
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .record(elapsed.as_secs_f64());
    }
}

/// 인가 거부 (`code`는 `AuthError::code()`).
pub fn record_auth_rejection(code: &'static str) {
    counter!("auth_rejections_total", "code" => code).increment(1);
}

/// JWKS 조회 결과 (`success` | `failure`).
pub fn record_jwks_refresh(outcome: &'static str) {
    counter!("jwks_refresh_total", "outcome" => outcome).increment(1);
}

/// 매칭되는 라우트가 없을 때 쓰는 경로 라벨.
///
/// 숫자 세그먼트를 `{id}`로 바꿔 라벨 카디널리티를 제한합니다.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .map(|segment| match segment.parse::<u64>() {
            Ok(_) => "{id}",
            Err(_) => segment,
        })
        .collect();
    segments.join("/")
}
