//! 인증/권한 에러.
//!
//! 모든 인증 실패는 HTTP 상태 코드, 짧은 에러 코드, 설명 메시지 세 가지를 가지며
//! 응답 경계까지 그대로 전달됩니다. 404/422로 뭉개지지 않습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// 헤더 형식 오류 설명 메시지.
pub mod reason {
    pub const MALFORMED: &str = "Authorization malformed.";
    pub const MUST_START_WITH_BEARER: &str = "Authorization header must start with \"Bearer\".";
    pub const TOKEN_NOT_FOUND: &str = "Token not found.";
    pub const MUST_BE_BEARER_TOKEN: &str = "Authorization header must be bearer token.";
    pub const UNPARSEABLE_TOKEN: &str = "Unable to parse authentication token.";
    pub const NO_MATCHING_KEY: &str = "Unable to find the appropriate key.";
    pub const KEYS_UNAVAILABLE: &str = "Unable to fetch signing keys.";
}

/// 인증/권한 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Authorization 헤더 없음
    #[error("Authorization header is expected.")]
    MissingHeader,
    /// 헤더 또는 토큰 구조/서명 오류
    #[error("{0}")]
    InvalidHeader(&'static str),
    /// 서명은 유효하지만 만료됨
    #[error("Token expired.")]
    TokenExpired,
    /// audience/issuer 불일치
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    /// 클레임에 permissions 항목 자체가 없음
    #[error("Permissions not included in JWT.")]
    PermissionsMissing,
    /// permissions에 필요한 권한이 없음
    #[error("Permission not found.")]
    Unauthorized,
}

impl AuthError {
    /// 응답 HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// 짧은 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::InvalidHeader(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::Unauthorized => "unauthorized",
        }
    }

    /// 사람이 읽을 수 있는 설명.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.code(),
            "message": self.description(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_table() {
        let cases = [
            (AuthError::MissingHeader, 401, "missing_header"),
            (AuthError::InvalidHeader(reason::MALFORMED), 401, "invalid_header"),
            (AuthError::TokenExpired, 401, "token_expired"),
            (AuthError::InvalidClaims, 401, "invalid_claims"),
            (AuthError::PermissionsMissing, 400, "invalid_claims"),
            (AuthError::Unauthorized, 403, "unauthorized"),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status().as_u16(), status, "{:?}", error);
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_invalid_header_carries_reason() {
        let error = AuthError::InvalidHeader(reason::TOKEN_NOT_FOUND);
        assert_eq!(error.description(), "Token not found.");
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let response = AuthError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": "unauthorized",
                "message": "Permission not found."
            })
        );
    }
}
