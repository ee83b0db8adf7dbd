//! 서명 키(JWKS) 캐시.
//!
//! 토큰 발급 기관이 공개하는 JWK Set을 `kid` 기준으로 보관합니다.
//!
//! - 조회는 `RwLock` 읽기 잠금만 사용하므로 서로 막지 않습니다.
//! - 캐시에 없는 `kid`가 들어오면 한 번만 재조회합니다 (single-flight).
//! - 재조회 사이에는 최소 간격(cooldown)을 두어 알 수 없는 `kid`로 인한
//!   요청 폭주를 막습니다. 실패한 시도도 간격에 포함됩니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{jwk::JwkSet, DecodingKey};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::metrics::record_jwks_refresh;

/// kid 미스로 인한 재조회 기본 최소 간격.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// JWKS 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwksError {
    /// 키 집합 요청 실패
    #[error("JWKS 조회 실패: {0}")]
    Fetch(String),
    /// 응답이 JWK Set 형식이 아님
    #[error("JWKS 파싱 실패: {0}")]
    Parse(String),
    /// 해당 kid의 키 없음
    #[error("kid '{0}'에 해당하는 키 없음")]
    KeyNotFound(String),
}

/// 키 집합 출처.
enum JwksSource {
    /// HTTP로 조회하는 원격 JWK Set
    Remote { client: reqwest::Client, url: String },
    /// 생성 시 주어진 고정 JWK Set
    Static(JwkSet),
}

#[derive(Default)]
struct RefreshState {
    last_attempt: Option<Instant>,
    last_error: Option<JwksError>,
}

/// `kid → DecodingKey` 캐시.
pub struct JwksCache {
    source: JwksSource,
    keys: RwLock<HashMap<String, Arc<DecodingKey>>>,
    refresh: Mutex<RefreshState>,
    min_refresh_interval: Duration,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            JwksSource::Remote { url, .. } => url.as_str(),
            JwksSource::Static(_) => "static",
        };
        f.debug_struct("JwksCache")
            .field("source", &source)
            .field("min_refresh_interval", &self.min_refresh_interval)
            .finish_non_exhaustive()
    }
}

impl JwksCache {
    /// 원격 JWK Set URL을 사용하는 캐시 생성.
    ///
    /// 생성만 하고 조회는 하지 않습니다. 시작 시 [`refresh`](Self::refresh)로 미리 채웁니다.
    pub fn remote(url: impl Into<String>, timeout: Duration) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JwksError::Fetch(e.to_string()))?;

        Ok(Self::with_source(JwksSource::Remote {
            client,
            url: url.into(),
        }))
    }

    /// 고정 JWK Set으로 캐시 생성 (키는 즉시 적재).
    pub fn from_jwk_set(set: JwkSet) -> Self {
        let keys = decode_keys(&set);
        let cache = Self::with_source(JwksSource::Static(set));
        Self {
            keys: RwLock::new(keys),
            ..cache
        }
    }

    /// JSON 텍스트로 된 JWK Set으로 고정 캐시 생성.
    pub fn from_json(json: &str) -> Result<Self, JwksError> {
        let set: JwkSet =
            serde_json::from_str(json).map_err(|e| JwksError::Parse(e.to_string()))?;
        Ok(Self::from_jwk_set(set))
    }

    fn with_source(source: JwksSource) -> Self {
        Self {
            source,
            keys: RwLock::new(HashMap::new()),
            refresh: Mutex::new(RefreshState::default()),
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
        }
    }

    /// kid 미스 재조회 최소 간격 설정.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// 현재 보관 중인 키 수.
    pub async fn key_count(&self) -> usize {
        self.keys.read().await.len()
    }

    /// kid에 해당하는 키 조회.
    ///
    /// 캐시에 없으면 cooldown이 지난 경우에 한해 키 집합을 다시 가져옵니다.
    pub async fn key_for(&self, kid: &str) -> Result<Arc<DecodingKey>, JwksError> {
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(Arc::clone(key));
        }

        let mut state = self.refresh.lock().await;

        // 잠금을 기다리는 동안 다른 요청이 이미 갱신했을 수 있음
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(Arc::clone(key));
        }

        let cooling_down = state
            .last_attempt
            .is_some_and(|at| at.elapsed() < self.min_refresh_interval);
        if cooling_down {
            debug!(kid, "JWKS 재조회 대기 중, 캐시 미스 처리");
            return Err(match &state.last_error {
                Some(error) => error.clone(),
                None => JwksError::KeyNotFound(kid.to_string()),
            });
        }

        debug!(kid, "알 수 없는 kid, JWKS 재조회");
        self.refresh_locked(&mut state).await?;

        self.keys
            .read()
            .await
            .get(kid)
            .cloned()
            .ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    /// cooldown과 무관하게 키 집합을 다시 가져옵니다.
    ///
    /// 성공하면 적재된 키 수를 반환합니다. 실패하면 기존 키는 유지됩니다.
    pub async fn refresh(&self) -> Result<usize, JwksError> {
        let mut state = self.refresh.lock().await;
        self.refresh_locked(&mut state).await
    }

    async fn refresh_locked(&self, state: &mut RefreshState) -> Result<usize, JwksError> {
        state.last_attempt = Some(Instant::now());

        match self.fetch().await {
            Ok(set) => {
                let keys = decode_keys(&set);
                let count = keys.len();
                *self.keys.write().await = keys;
                state.last_error = None;
                record_jwks_refresh("success");
                debug!(keys = count, "JWKS 갱신 완료");
                Ok(count)
            }
            Err(e) => {
                state.last_error = Some(e.clone());
                record_jwks_refresh("failure");
                warn!(error = %e, "JWKS 갱신 실패");
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        match &self.source {
            JwksSource::Static(set) => Ok(set.clone()),
            JwksSource::Remote { client, url } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map_err(|e| JwksError::Fetch(e.to_string()))?
                    .bytes()
                    .await
                    .map_err(|e| JwksError::Fetch(e.to_string()))?;

                serde_json::from_slice(&body).map_err(|e| JwksError::Parse(e.to_string()))
            }
        }
    }

    /// 주기적으로 키 집합을 갱신하는 백그라운드 작업 시작.
    ///
    /// `shutdown_token`이 취소되면 종료합니다. 첫 갱신은 `interval` 후에 실행됩니다.
    pub fn spawn_refresh_task(
        self: &Arc<Self>,
        interval: Duration,
        shutdown_token: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);

        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "JWKS 갱신 작업 시작");

            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // 첫 tick은 즉시 완료되므로 건너뜀

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // 실패는 refresh 내부에서 기록됨
                        let _ = cache.refresh().await;
                    }
                    _ = shutdown_token.cancelled() => {
                        info!("JWKS 갱신 작업: 종료 시그널 수신");
                        break;
                    }
                }
            }
        })
    }
}

/// JWK Set을 `kid → DecodingKey` 맵으로 변환.
///
/// kid가 없거나 지원하지 않는 키는 건너뜁니다.
fn decode_keys(set: &JwkSet) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys = HashMap::with_capacity(set.keys.len());

    for jwk in &set.keys {
        let Some(kid) = jwk.common.key_id.clone() else {
            warn!("kid 없는 JWK 건너뜀");
            continue;
        };

        match DecodingKey::from_jwk(jwk) {
            Ok(key) => {
                keys.insert(kid, Arc::new(key));
            }
            Err(e) => warn!(kid = %kid, error = %e, "지원하지 않는 JWK 건너뜀"),
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    const JWKS: &str = include_str!("../../tests/fixtures/jwks.json");
    const JWKS_ROTATED: &str = include_str!("../../tests/fixtures/jwks-rotated.json");
    const KID: &str = "coffee-test-key";

    fn remote(server: &mockito::Server, cooldown: Duration) -> JwksCache {
        JwksCache::remote(format!("{}/.well-known/jwks.json", server.url()), Duration::from_secs(5))
            .unwrap()
            .with_min_refresh_interval(cooldown)
    }

    #[tokio::test]
    async fn test_static_cache_loads_immediately() {
        let cache = JwksCache::from_json(JWKS).unwrap();
        assert_eq!(cache.key_count().await, 1);
        assert!(cache.key_for(KID).await.is_ok());
    }

    #[tokio::test]
    async fn test_skips_keys_without_kid() {
        let json = r#"{"keys": [{"kty": "oct", "k": "c2VjcmV0"}]}"#;
        let cache = JwksCache::from_json(json).unwrap();
        assert_eq!(cache.key_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        assert!(matches!(
            JwksCache::from_json("not json"),
            Err(JwksError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_header("content-type", "application/json")
            .with_body(JWKS)
            .expect(1)
            .create_async()
            .await;

        let cache = remote(&server, DEFAULT_MIN_REFRESH_INTERVAL);
        assert_eq!(cache.key_count().await, 0);
        assert_eq!(cache.refresh().await.unwrap(), 1);
        assert!(cache.key_for(KID).await.is_ok());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_miss_triggers_refresh_and_picks_up_rotation() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/.well-known/jwks.json")
            .with_body(JWKS)
            .create_async()
            .await;

        let cache = remote(&server, Duration::ZERO);
        assert!(cache.key_for(KID).await.is_ok());
        assert!(matches!(
            cache.key_for("rotated-key").await,
            Err(JwksError::KeyNotFound(_))
        ));

        first.remove_async().await;
        server
            .mock("GET", "/.well-known/jwks.json")
            .with_body(JWKS_ROTATED)
            .create_async()
            .await;

        assert!(cache.key_for("rotated-key").await.is_ok());
        assert_eq!(cache.key_count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_body(JWKS)
            .expect(1)
            .create_async()
            .await;

        let cache = Arc::new(remote(&server, Duration::ZERO));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move { cache.key_for(KID).await.is_ok() });
        }

        while let Some(found) = tasks.join_next().await {
            assert!(found.unwrap());
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_cooldown_limits_unknown_kid_fetches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_body(JWKS)
            .expect(1)
            .create_async()
            .await;

        let cache = remote(&server, Duration::from_secs(60));
        for _ in 0..5 {
            assert_eq!(
                cache.key_for("unknown").await.err(),
                Some(JwksError::KeyNotFound("unknown".to_string()))
            );
        }
        // 이미 받은 키는 cooldown과 무관하게 조회됨
        assert!(cache.key_for(KID).await.is_ok());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_fetch_counts_toward_cooldown() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let cache = remote(&server, Duration::from_secs(60));
        assert!(matches!(cache.key_for(KID).await, Err(JwksError::Fetch(_))));
        assert!(matches!(cache.key_for(KID).await, Err(JwksError::Fetch(_))));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_existing_keys() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/.well-known/jwks.json")
            .with_body(JWKS)
            .create_async()
            .await;

        let cache = remote(&server, Duration::ZERO);
        cache.refresh().await.unwrap();

        ok.remove_async().await;
        server
            .mock("GET", "/.well-known/jwks.json")
            .with_body("{\"not\": \"a key set\"}")
            .create_async()
            .await;

        assert!(matches!(cache.refresh().await, Err(JwksError::Parse(_))));
        assert_eq!(cache.key_count().await, 1);
        assert!(cache.key_for(KID).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_task_stops_on_cancel() {
        let cache = Arc::new(JwksCache::from_json(JWKS).unwrap());
        let token = CancellationToken::new();
        let handle = cache.spawn_refresh_task(Duration::from_millis(10), token.clone());

        tokio::time::sleep(Duration::from_millis(30)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("refresh task should stop")
            .unwrap();
    }
}
