//! 커피숍 API 서버.
//!
//! 설정을 읽고 저장소, 서명 키 캐시, 토큰 검증기를 준비한 뒤
//! Axum 서버를 시작합니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use coffee_api::auth::{JwksCache, TokenVerifier, VerifierConfig};
use coffee_api::metrics::setup_metrics_recorder;
use coffee_api::openapi::ApiDoc;
use coffee_api::repository::{connect, SqliteDrinkStore};
use coffee_api::server::create_router;
use coffee_api::state::AppState;
use coffee_core::{init_logging, AppConfig, LogConfig};

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그가 있으면 스펙을 stdout으로 출력하고 `true`를 반환합니다.
fn handle_export_openapi() -> anyhow::Result<bool> {
    use utoipa::OpenApi as _;

    if !std::env::args().any(|arg| arg == "--export-openapi") {
        return Ok(false);
    }

    let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
    println!("{}", json);
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    if handle_export_openapi()? {
        return Ok(());
    }

    let config = AppConfig::load_default().context("설정 로드 실패")?;

    init_logging(LogConfig::from(&config.logging))?;

    info!("Starting Coffee Shop API server...");

    let metrics_handle = setup_metrics_recorder().context("Prometheus 레코더 설치 실패")?;
    info!("Prometheus metrics recorder initialized");

    // 저장소 준비
    let pool = connect(&config.database)
        .await
        .with_context(|| format!("데이터베이스 연결 실패: {}", config.database.url))?;
    let store = SqliteDrinkStore::new(pool);
    store.migrate().await.context("스키마 생성 실패")?;

    if config.database.reset_on_start {
        warn!("database.reset_on_start 설정됨: 모든 음료를 지우고 기본 음료로 초기화");
        store.reset().await.context("데이터베이스 초기화 실패")?;
    }

    // 서명 키 캐시 준비
    let jwks_url = config.auth.jwks_url();
    let jwks = Arc::new(
        JwksCache::remote(
            jwks_url.clone(),
            Duration::from_secs(config.auth.jwks_timeout_secs),
        )?
        .with_min_refresh_interval(Duration::from_secs(config.auth.jwks_min_refresh_secs)),
    );

    // 시작 시 미리 가져오기 (실패해도 첫 요청에서 다시 시도)
    match jwks.refresh().await {
        Ok(count) => info!(url = %jwks_url, keys = count, "서명 키 로드 완료"),
        Err(e) => warn!(url = %jwks_url, error = %e, "서명 키 사전 로드 실패, 요청 시 재시도"),
    }

    let verifier_config = VerifierConfig::from_auth_config(&config.auth)?;
    info!(
        audience = %verifier_config.audience,
        issuer = %verifier_config.issuer,
        algorithms = ?verifier_config.algorithms,
        "토큰 검증기 설정"
    );
    let verifier = TokenVerifier::new(Arc::clone(&jwks), &verifier_config);

    // 전역 종료 토큰 (백그라운드 태스크에 종료 전파)
    let shutdown_token = CancellationToken::new();

    let refresh_handle = (config.auth.jwks_refresh_secs > 0).then(|| {
        jwks.spawn_refresh_task(
            Duration::from_secs(config.auth.jwks_refresh_secs),
            shutdown_token.clone(),
        )
    });

    let state = Arc::new(
        AppState::new(Arc::new(store), Arc::new(verifier)).with_metrics(metrics_handle),
    );
    info!(version = %state.version, "Application state initialized");

    let app = create_router(state, &config.server);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("소켓 바인딩 실패: {}", addr))?;

    info!(%addr, "API server listening");
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    if let Some(handle) = refresh_handle {
        if tokio::time::timeout(Duration::from_secs(5), handle).await.is_err() {
            warn!("JWKS 갱신 작업 종료 대기 시간 초과");
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
