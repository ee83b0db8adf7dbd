//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! 스펙은 `/api-docs/openapi.json` 경로와 `coffee-api --export-openapi`로 제공됩니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use coffee_core::{DrinkLong, DrinkShort, Ingredient, IngredientShort};

use crate::error::{AuthErrorBody, ErrorBody};
use crate::routes::{
    ComponentHealth, ComponentState, ComponentStatus, CreateDrinkRequest, DeleteDrinkResponse,
    DrinksLongResponse, DrinksShortResponse, HealthResponse, Readiness, UpdateDrinkRequest,
};

/// Coffee Shop API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coffee Shop API",
        description = r#"
# 커피숍 음료 메뉴 REST API

음료 메뉴 조회는 공개되어 있으며, 상세 레시피 조회와 메뉴 변경은
Auth0가 발급한 Bearer 토큰의 `permissions` 클레임으로 권한을 확인합니다.

| 권한 | 작업 |
|---|---|
| `get:drinks-detail` | 레시피 전체 조회 |
| `post:drinks` | 음료 생성 |
| `patch:drinks` | 음료 수정 |
| `delete:drinks` | 음료 삭제 |
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "drinks", description = "음료 - 메뉴 조회 및 관리"),
        (name = "health", description = "헬스 체크 - 서버 상태 확인")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            // ===== Drinks =====
            Ingredient,
            IngredientShort,
            DrinkShort,
            DrinkLong,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            DrinksShortResponse,
            DrinksLongResponse,
            DeleteDrinkResponse,

            // ===== Errors =====
            ErrorBody,
            AuthErrorBody,

            // ===== Health =====
            HealthResponse,
            Readiness,
            ComponentHealth,
            ComponentStatus,
            ComponentState,
        )
    ),
    paths(
        crate::routes::drinks::list_drinks,
        crate::routes::drinks::drinks_detail,
        crate::routes::drinks::create_drink,
        crate::routes::drinks::update_drink,
        crate::routes::drinks::delete_drink,
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
    )
)]
pub struct ApiDoc;

/// Bearer 토큰 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
