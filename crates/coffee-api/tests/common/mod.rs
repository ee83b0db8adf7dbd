//! 통합 테스트 공용 도우미.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use coffee_api::auth::{JwksCache, TokenVerifier, VerifierConfig};
use coffee_api::repository::SqliteDrinkStore;
use coffee_api::{create_router, AppState};
use coffee_core::{Drink, DrinkPatch, DrinkStore, NewDrink, ServerConfig, StoreResult};

pub const KID: &str = "coffee-test-key";
pub const AUDIENCE: &str = "coffee";
pub const ISSUER: &str = "https://coffee-test.auth0.com/";

pub const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const JWKS_ROTATED: &str = include_str!("../fixtures/jwks-rotated.json");
pub const TRUSTED_PEM: &str = include_str!("../fixtures/trusted.pem");
pub const ROGUE_PEM: &str = include_str!("../fixtures/rogue.pem");

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 검증을 통과하는 클레임.
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "iss": ISSUER,
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "iat": now(),
        "exp": now() + 3600,
        "permissions": permissions,
    })
}

pub fn sign_with(claims: &Value, kid: Option<&str>, pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

pub fn sign(claims: &Value) -> String {
    sign_with(claims, Some(KID), TRUSTED_PEM)
}

pub fn token_with(permissions: &[&str]) -> String {
    sign(&claims(permissions))
}

/// 저장소 호출 횟수를 세는 래퍼.
pub struct RecordingStore {
    inner: SqliteDrinkStore,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DrinkStore for RecordingStore {
    async fn list(&self) -> StoreResult<Vec<Drink>> {
        self.record();
        self.inner.list().await
    }

    async fn get(&self, id: i64) -> StoreResult<Drink> {
        self.record();
        self.inner.get(id).await
    }

    async fn create(&self, drink: NewDrink) -> StoreResult<Drink> {
        self.record();
        self.inner.create(drink).await
    }

    async fn update(&self, id: i64, patch: DrinkPatch) -> StoreResult<Drink> {
        self.record();
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> StoreResult<i64> {
        self.record();
        self.inner.delete(id).await
    }

    async fn ping(&self) -> bool {
        self.inner.ping().await
    }
}

/// 테스트 앱: 전체 라우터와 저장소 관찰 핸들.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<RecordingStore>,
    pub keys: Arc<JwksCache>,
}

impl TestApp {
    /// 고정 JWKS와 메모리 저장소로 앱 생성.
    pub async fn new() -> Self {
        Self::with_keys(Arc::new(JwksCache::from_json(JWKS).unwrap())).await
    }

    /// 주어진 키 캐시로 앱 생성.
    pub async fn with_keys(keys: Arc<JwksCache>) -> Self {
        let inner = SqliteDrinkStore::in_memory().await.unwrap();
        inner.reset().await.unwrap();
        let store = Arc::new(RecordingStore {
            inner,
            calls: AtomicUsize::new(0),
        });

        let verifier = TokenVerifier::new(Arc::clone(&keys), &VerifierConfig::new(AUDIENCE, ISSUER));
        let state = Arc::new(AppState::new(store.clone(), Arc::new(verifier)));
        let router = create_router(state, &ServerConfig::default());

        Self {
            router,
            store,
            keys,
        }
    }

    /// 요청을 보내고 상태 코드와 JSON 본문을 반환.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

/// 인증 에러 본문 검증.
pub fn assert_auth_error(status: StatusCode, body: &Value, expected_status: u16, code: &str) {
    assert_eq!(status.as_u16(), expected_status, "body: {}", body);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], code);
    assert!(body["message"].is_string());
}
