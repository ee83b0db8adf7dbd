//! 인증 및 권한 부여.
//!
//! 외부 인증 기관(Auth0)이 발급한 RS256 Bearer 토큰을 검증하고,
//! 토큰의 `permissions` 클레임으로 작업별 권한을 확인합니다.
//!
//! # 구성 요소
//!
//! - [`extract_bearer_token`]: Authorization 헤더 파싱
//! - [`JwksCache`]: 서명 키 캐시 (kid 미스 시 single-flight 재조회)
//! - [`TokenVerifier`]: 서명/만료/audience/issuer 검증
//! - [`check_permission`], [`authorize`]: 권한 확인과 전체 인가 흐름
//! - [`Authorized`]: 권한별 Axum 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn drinks_detail(
//!     auth: Authorized<GetDrinksDetail>,
//!     State(state): State<Arc<AppState>>,
//! ) -> impl IntoResponse {
//!     // auth.claims에 검증된 클레임이 들어 있음
//! }
//! ```

mod claims;
mod error;
mod guard;
mod header;
mod jwks;
mod permissions;
mod verifier;

pub use claims::{Audience, Claims};
pub use error::{reason, AuthError};
pub use guard::{authorize, check_permission, AuthStage, Authorized, HasVerifier};
pub use header::extract_bearer_token;
pub use jwks::{JwksCache, JwksError, DEFAULT_MIN_REFRESH_INTERVAL};
pub use permissions::{DeleteDrinks, GetDrinksDetail, PatchDrinks, PermissionScope, PostDrinks};
pub use verifier::{TokenVerifier, VerifierConfig, VerifierConfigError};
