//! 권한 검사와 요청 인가 추출기.
//!
//! 인가는 다음 순서로 진행되며 첫 실패에서 멈춥니다:
//!
//! ```text
//! Unauthenticated → TokenExtracted → ClaimsVerified → PermissionChecked → Authorized
//! ```
//!
//! 실패 시 도달한 단계와 에러 코드를 debug 레벨로 남기고
//! `auth_rejections_total` 메트릭을 증가시킵니다.

use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use super::claims::Claims;
use super::error::AuthError;
use super::header::extract_bearer_token;
use super::permissions::PermissionScope;
use super::verifier::TokenVerifier;
use crate::metrics::record_auth_rejection;

/// 인가 진행 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Unauthenticated,
    TokenExtracted,
    ClaimsVerified,
    PermissionChecked,
    Authorized,
}

impl AuthStage {
    /// 다음 단계. `Authorized`는 마지막 단계입니다.
    pub fn next(self) -> Self {
        match self {
            AuthStage::Unauthenticated => AuthStage::TokenExtracted,
            AuthStage::TokenExtracted => AuthStage::ClaimsVerified,
            AuthStage::ClaimsVerified => AuthStage::PermissionChecked,
            AuthStage::PermissionChecked | AuthStage::Authorized => AuthStage::Authorized,
        }
    }
}

/// 클레임에 필요한 권한이 있는지 확인.
///
/// `permissions` 클레임 자체가 없으면 400, 권한이 없으면 403입니다.
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    if claims.permissions.is_none() {
        return Err(AuthError::PermissionsMissing);
    }

    if claims.has_permission(required) {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}

/// 헤더 추출, 토큰 검증, 권한 확인을 차례로 수행합니다.
pub async fn authorize(
    verifier: &TokenVerifier,
    headers: &HeaderMap,
    required: &'static str,
) -> Result<Claims, AuthError> {
    let mut stage = AuthStage::Unauthenticated;

    let token = extract_bearer_token(headers).map_err(|e| rejected(stage, required, e))?;
    stage = stage.next();

    let claims = verifier
        .verify(token)
        .await
        .map_err(|e| rejected(stage, required, e))?;
    stage = stage.next();

    check_permission(required, &claims).map_err(|e| rejected(stage, required, e))?;
    stage = stage.next();
    debug_assert_eq!(stage, AuthStage::PermissionChecked);

    debug!(
        stage = ?stage.next(),
        permission = required,
        sub = claims.sub.as_deref().unwrap_or("-"),
        "요청 인가됨"
    );
    Ok(claims)
}

fn rejected(stage: AuthStage, required: &'static str, error: AuthError) -> AuthError {
    debug!(
        stage = ?stage,
        permission = required,
        code = error.code(),
        reason = %error,
        "요청 인가 거부"
    );
    record_auth_rejection(error.code());
    error
}

/// 토큰 검증기를 제공하는 애플리케이션 상태.
pub trait HasVerifier {
    fn token_verifier(&self) -> &TokenVerifier;
}

impl<T: HasVerifier + ?Sized> HasVerifier for Arc<T> {
    fn token_verifier(&self) -> &TokenVerifier {
        (**self).token_verifier()
    }
}

/// 권한 `P`를 요구하는 인가 추출기.
///
/// 본문 추출이나 저장소 호출보다 먼저 실행되므로, 거부된 요청은
/// 핸들러에 도달하지 않습니다.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn create_drink(
///     auth: Authorized<PostDrinks>,
///     Json(body): Json<CreateDrinkRequest>,
/// ) -> impl IntoResponse {
///     tracing::info!(sub = ?auth.claims.sub, "음료 생성");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authorized<P: PermissionScope> {
    /// 검증된 클레임
    pub claims: Claims,
    _scope: PhantomData<P>,
}

impl<P: PermissionScope> Authorized<P> {
    fn new(claims: Claims) -> Self {
        Self {
            claims,
            _scope: PhantomData,
        }
    }

    /// 검증된 클레임 반환.
    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: HasVerifier + Send + Sync,
    P: PermissionScope,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = authorize(state.token_verifier(), &parts.headers, P::PERMISSION).await?;
        Ok(Self::new(claims))
    }
}
