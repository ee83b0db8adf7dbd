//! 설정 관리.
//!
//! 기본값 → TOML 파일 (선택) → `COFFEE_` 접두사 환경 변수 순으로 덮어씁니다.
//!
//! ```text
//! COFFEE_SERVER__PORT=8080
//! COFFEE_AUTH__DOMAIN=my-tenant.auth0.com
//! COFFEE_AUTH__AUDIENCE=coffee
//! COFFEE_AUTH__ALGORITHMS=RS256,RS384
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::LogFormat;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 토큰 검증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// CORS 허용 origin 목록 (비어 있으면 모두 허용)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 연결 URL (예: "sqlite://database.db", "sqlite::memory:")
    pub url: String,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 시작 시 테이블을 지우고 기본 음료로 다시 채울지 여부
    pub reset_on_start: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://database.db".to_string(),
            max_connections: 5,
            reset_on_start: false,
        }
    }
}

/// 토큰 검증 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 토큰 발급 기관 도메인 (예: "my-tenant.auth0.com")
    pub domain: String,
    /// 기대하는 audience
    pub audience: String,
    /// 기대하는 issuer. 없으면 `https://{domain}/`
    pub issuer: Option<String>,
    /// JWKS URL. 없으면 `https://{domain}/.well-known/jwks.json`
    pub jwks_url: Option<String>,
    /// 허용 서명 알고리즘
    pub algorithms: Vec<String>,
    /// exp 검증 허용 오차 (초)
    pub leeway_secs: u64,
    /// JWKS 주기적 갱신 간격 (초, 0이면 비활성)
    pub jwks_refresh_secs: u64,
    /// kid 미스로 인한 재조회 최소 간격 (초)
    pub jwks_min_refresh_secs: u64,
    /// JWKS 요청 타임아웃 (초)
    pub jwks_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: "thedevscott.auth0.com".to_string(),
            audience: "localhost:5000".to_string(),
            issuer: None,
            jwks_url: None,
            algorithms: vec!["RS256".to_string()],
            leeway_secs: 0,
            jwks_refresh_secs: 3600,
            jwks_min_refresh_secs: 30,
            jwks_timeout_secs: 10,
        }
    }
}

impl AuthConfig {
    /// 기대하는 issuer 값.
    pub fn issuer(&self) -> String {
        self.issuer
            .clone()
            .unwrap_or_else(|| format!("https://{}/", self.domain))
    }

    /// 서명 키를 조회할 JWKS URL.
    pub fn jwks_url(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", self.domain))
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터 (RUST_LOG가 있으면 그쪽이 우선)
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "coffee_api=info,coffee_core=info,tower_http=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        Self::from_sources(config::File::from(path.as_ref()).required(false), None)
    }

    /// 기본 경로(`COFFEE_CONFIG` 또는 `config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var("COFFEE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    fn from_sources<S>(
        file: S,
        env_override: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let env = config::Environment::with_prefix("COFFEE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("auth.algorithms")
            .with_list_parse_key("server.cors_origins")
            .source(env_override);

        let config = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// 필수 값 검증.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.audience.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.audience must not be empty".to_string(),
            ));
        }
        let needs_domain = self.auth.issuer.is_none() || self.auth.jwks_url.is_none();
        if needs_domain && self.auth.domain.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.domain is required unless both auth.issuer and auth.jwks_url are set"
                    .to_string(),
            ));
        }
        if self.auth.algorithms.is_empty() {
            return Err(config::ConfigError::Message(
                "auth.algorithms must list at least one algorithm".to_string(),
            ));
        }
        Ok(())
    }
}
