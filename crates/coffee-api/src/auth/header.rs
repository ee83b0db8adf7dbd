//! Authorization 헤더에서 Bearer 토큰 추출.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::error::{reason, AuthError};

/// `Authorization: Bearer <token>` 헤더에서 토큰을 꺼냅니다.
///
/// 스킴 이름은 대소문자를 구분하며 정확히 두 부분이어야 합니다.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidHeader(reason::MALFORMED))?;

    let mut parts = value.split_whitespace();

    // 공백만 있는 헤더는 없는 것과 같게 취급
    let scheme = parts.next().ok_or(AuthError::MissingHeader)?;
    if scheme != "Bearer" {
        return Err(AuthError::InvalidHeader(reason::MUST_START_WITH_BEARER));
    }

    let token = parts
        .next()
        .ok_or(AuthError::InvalidHeader(reason::TOKEN_NOT_FOUND))?;

    if parts.next().is_some() {
        return Err(AuthError::InvalidHeader(reason::MUST_BE_BEARER_TOKEN));
    }

    Ok(token)
}
