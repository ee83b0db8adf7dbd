//! 토큰 서명 및 클레임 검증.

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};

use coffee_core::AuthConfig;

use super::claims::Claims;
use super::error::{reason, AuthError};
use super::jwks::{JwksCache, JwksError};

/// 검증 설정 에러.
#[derive(Debug, thiserror::Error)]
pub enum VerifierConfigError {
    #[error("지원하지 않는 서명 알고리즘: {0}")]
    UnsupportedAlgorithm(String),
    #[error("허용 알고리즘이 비어 있습니다")]
    NoAlgorithms,
}

/// 토큰 검증 설정.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// 기대하는 audience
    pub audience: String,
    /// 기대하는 issuer
    pub issuer: String,
    /// 허용 서명 알고리즘
    pub algorithms: Vec<Algorithm>,
    /// exp 허용 오차 (초)
    pub leeway_secs: u64,
}

impl VerifierConfig {
    /// RS256, 오차 0초 기본값으로 생성.
    pub fn new(audience: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            issuer: issuer.into(),
            algorithms: vec![Algorithm::RS256],
            leeway_secs: 0,
        }
    }

    /// 애플리케이션 설정에서 생성.
    pub fn from_auth_config(config: &AuthConfig) -> Result<Self, VerifierConfigError> {
        let algorithms = config
            .algorithms
            .iter()
            .map(|name| {
                name.trim()
                    .parse::<Algorithm>()
                    .map_err(|_| VerifierConfigError::UnsupportedAlgorithm(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(config.audience.clone(), config.issuer())
            .with_algorithms(algorithms)
            .map(|verifier| verifier.with_leeway(config.leeway_secs))
    }

    /// 허용 알고리즘 설정.
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Result<Self, VerifierConfigError> {
        if algorithms.is_empty() {
            return Err(VerifierConfigError::NoAlgorithms);
        }
        self.algorithms = algorithms;
        Ok(self)
    }

    /// exp 허용 오차 설정.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithms[0]);
        validation.algorithms = self.algorithms.clone();
        validation.leeway = self.leeway_secs;
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation
    }
}

/// Bearer 토큰 검증기.
///
/// 서명 키는 [`JwksCache`]에서 `kid`로 찾습니다. 검증은 요청마다 독립적이며
/// 키 캐시 외의 공유 상태는 없습니다.
#[derive(Debug)]
pub struct TokenVerifier {
    keys: Arc<JwksCache>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<JwksCache>, config: &VerifierConfig) -> Self {
        Self {
            keys,
            validation: config.validation(),
        }
    }

    /// 서명 키 캐시.
    pub fn keys(&self) -> &Arc<JwksCache> {
        &self.keys
    }

    /// 토큰의 서명, 만료, audience, issuer를 검증하고 클레임을 반환합니다.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header =
            decode_header(token).map_err(|_| AuthError::InvalidHeader(reason::UNPARSEABLE_TOKEN))?;

        let kid = header
            .kid
            .ok_or(AuthError::InvalidHeader(reason::MALFORMED))?;

        let key = self.keys.key_for(&kid).await.map_err(|e| match e {
            JwksError::KeyNotFound(_) => AuthError::InvalidHeader(reason::NO_MATCHING_KEY),
            JwksError::Fetch(_) | JwksError::Parse(_) => {
                AuthError::InvalidHeader(reason::KEYS_UNAVAILABLE)
            }
        })?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
            _ => AuthError::InvalidHeader(reason::UNPARSEABLE_TOKEN),
        })?;

        Ok(data.claims)
    }
}
