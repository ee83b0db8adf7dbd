//! 요청별 메트릭 기록.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics::{normalize_path, HttpLabels};

fn labels_for(request: &Request) -> HttpLabels {
    // 라우트 템플릿(`/drinks/{id}`)이 있으면 그대로 사용
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(request.uri().path()),
    };
    HttpLabels::new(request.method().as_str(), path)
}

/// `axum::middleware::from_fn`용 메트릭 미들웨어.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let labels = labels_for(&request);
    labels.record_request();

    let started = Instant::now();
    let response = next.run(request).await;
    labels.record_response(response.status().as_u16(), started.elapsed());

    response
}
