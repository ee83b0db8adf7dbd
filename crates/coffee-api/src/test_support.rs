//! 테스트용 서명 키와 토큰 발급 도우미.

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use crate::auth::{JwksCache, TokenVerifier, VerifierConfig};

pub const TEST_KID: &str = "coffee-test-key";
pub const TEST_AUDIENCE: &str = "coffee";
pub const TEST_ISSUER: &str = "https://coffee-test.auth0.com/";

pub const TEST_JWKS: &str = include_str!("../tests/fixtures/jwks.json");
pub const TRUSTED_KEY_PEM: &str = include_str!("../tests/fixtures/trusted.pem");
pub const ROGUE_KEY_PEM: &str = include_str!("../tests/fixtures/rogue.pem");

/// 현재 Unix 시각 (초).
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 고정 JWKS를 사용하는 검증기.
pub fn test_verifier() -> TokenVerifier {
    // 고정 fixture는 항상 파싱 가능
    let keys = JwksCache::from_json(TEST_JWKS).expect("fixture JWKS");
    TokenVerifier::new(
        Arc::new(keys),
        &VerifierConfig::new(TEST_AUDIENCE, TEST_ISSUER),
    )
}

/// 검증을 통과하는 클레임 (권한 목록 포함).
pub fn valid_claims(permissions: &[&str]) -> Value {
    json!({
        "iss": TEST_ISSUER,
        "sub": "auth0|barista",
        "aud": TEST_AUDIENCE,
        "iat": now(),
        "exp": now() + 3600,
        "permissions": permissions,
    })
}

/// 신뢰 키로 서명.
pub fn sign(claims: &Value) -> String {
    sign_with(claims, Some(TEST_KID), TRUSTED_KEY_PEM)
}

/// 지정한 kid와 PEM 키로 RS256 서명.
pub fn sign_with(claims: &Value, kid: Option<&str>, pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture RSA key");
    encode(&header, claims, &key).expect("token signing")
}
