//! 음료 CRUD endpoint.
//!
//! - `GET /drinks`: 공개, short 표현
//! - `GET /drinks-detail`: `get:drinks-detail` 권한, long 표현
//! - `POST /drinks`: `post:drinks` 권한
//! - `PATCH /drinks/{id}`: `patch:drinks` 권한
//! - `DELETE /drinks/{id}`: `delete:drinks` 권한
//!
//! 인가 추출기가 먼저 실행되므로 거부된 요청은 본문 파싱이나
//! 저장소 호출에 도달하지 않습니다.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use coffee_core::{DrinkLong, DrinkPatch, DrinkShort, Ingredient, NewDrink, Recipe};

use crate::auth::{Authorized, DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks};
use crate::error::{ApiError, ApiResult, AuthErrorBody, ErrorBody};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 음료 생성 요청.
///
/// `recipe`는 재료 배열 또는 재료 객체 하나를 받습니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDrinkRequest {
    /// 음료 제목 (고유)
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    /// 레시피
    #[schema(value_type = Vec<Ingredient>)]
    #[validate(custom(function = "validate_recipe"))]
    pub recipe: Recipe,
}

/// 음료 수정 요청. 빠진 필드는 기존 값을 유지합니다.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDrinkRequest {
    /// 새 제목
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,
    /// 새 레시피
    #[serde(default)]
    #[schema(value_type = Option<Vec<Ingredient>>)]
    #[validate(custom(function = "validate_recipe"))]
    pub recipe: Option<Recipe>,
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("empty_title"));
    }
    Ok(())
}

fn validate_recipe(recipe: &Recipe) -> Result<(), ValidationError> {
    if recipe.is_empty() {
        return Err(ValidationError::new("empty_recipe"));
    }
    if recipe
        .ingredients()
        .iter()
        .any(|item| item.name.trim().is_empty() || item.color.trim().is_empty())
    {
        return Err(ValidationError::new("incomplete_ingredient"));
    }
    Ok(())
}

impl From<CreateDrinkRequest> for NewDrink {
    fn from(request: CreateDrinkRequest) -> Self {
        NewDrink::new(request.title, request.recipe)
    }
}

impl From<UpdateDrinkRequest> for DrinkPatch {
    fn from(request: UpdateDrinkRequest) -> Self {
        DrinkPatch {
            title: request.title,
            recipe: request.recipe,
        }
    }
}

/// 공개 음료 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksShortResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

/// 상세 음료 목록 응답 (생성/수정 결과도 같은 형식).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksLongResponse {
    pub success: bool,
    pub drinks: Vec<DrinkLong>,
}

impl DrinksLongResponse {
    fn new(drinks: Vec<DrinkLong>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// 음료 삭제 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    /// 삭제된 음료 ID
    pub delete: i64,
}

fn parse_body<T: Validate>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    let Json(request) = body.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    request
        .validate()
        .map_err(|errors| ApiError::invalid_input(errors.to_string()))?;
    Ok(request)
}

fn parse_id(id: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    id.map(|Path(id)| id).map_err(|_| ApiError::NotFound)
}

// ==================== 핸들러 ====================

/// 음료 목록 (short 표현).
#[utoipa::path(
    get,
    path = "/drinks",
    tag = "drinks",
    responses(
        (status = 200, description = "음료 목록", body = DrinksShortResponse),
        (status = 404, description = "조회 실패", body = ErrorBody)
    )
)]
pub async fn list_drinks(State(state): State<Arc<AppState>>) -> ApiResult<Json<DrinksShortResponse>> {
    let drinks = state.store.list().await.map_err(ApiError::read_failure)?;

    Ok(Json(DrinksShortResponse {
        success: true,
        drinks: drinks.iter().map(|drink| drink.short()).collect(),
    }))
}

/// 음료 상세 목록 (long 표현).
#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = "drinks",
    security(("bearer_auth" = ["get:drinks-detail"])),
    responses(
        (status = 200, description = "레시피 전체를 포함한 음료 목록", body = DrinksLongResponse),
        (status = 401, description = "인증 실패", body = AuthErrorBody),
        (status = 403, description = "권한 없음", body = AuthErrorBody),
        (status = 404, description = "조회 실패", body = ErrorBody)
    )
)]
pub async fn drinks_detail(
    _auth: Authorized<GetDrinksDetail>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DrinksLongResponse>> {
    let drinks = state.store.list().await.map_err(ApiError::read_failure)?;

    Ok(Json(DrinksLongResponse::new(
        drinks.iter().map(|drink| drink.long()).collect(),
    )))
}

/// 음료 생성.
#[utoipa::path(
    post,
    path = "/drinks",
    tag = "drinks",
    request_body = CreateDrinkRequest,
    security(("bearer_auth" = ["post:drinks"])),
    responses(
        (status = 200, description = "생성된 음료", body = DrinksLongResponse),
        (status = 401, description = "인증 실패", body = AuthErrorBody),
        (status = 403, description = "권한 없음", body = AuthErrorBody),
        (status = 422, description = "잘못된 입력 또는 중복 제목", body = ErrorBody)
    )
)]
pub async fn create_drink(
    auth: Authorized<PostDrinks>,
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> ApiResult<Json<DrinksLongResponse>> {
    let request = parse_body(body)?;

    let drink = state
        .store
        .create(request.into())
        .await
        .map_err(ApiError::write_failure)?;

    info!(id = drink.id, title = %drink.title, sub = ?auth.claims.sub, "음료 생성");
    Ok(Json(DrinksLongResponse::new(vec![drink.long()])))
}

/// 음료 수정.
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    tag = "drinks",
    params(("id" = i64, Path, description = "음료 ID")),
    request_body = UpdateDrinkRequest,
    security(("bearer_auth" = ["patch:drinks"])),
    responses(
        (status = 200, description = "수정된 음료", body = DrinksLongResponse),
        (status = 401, description = "인증 실패", body = AuthErrorBody),
        (status = 403, description = "권한 없음", body = AuthErrorBody),
        (status = 404, description = "음료 없음", body = ErrorBody),
        (status = 422, description = "잘못된 입력 또는 중복 제목", body = ErrorBody)
    )
)]
pub async fn update_drink(
    auth: Authorized<PatchDrinks>,
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> ApiResult<Json<DrinksLongResponse>> {
    let id = parse_id(id)?;
    let request = parse_body(body)?;

    let drink = state
        .store
        .update(id, request.into())
        .await
        .map_err(ApiError::write_failure)?;

    info!(id, sub = ?auth.claims.sub, "음료 수정");
    Ok(Json(DrinksLongResponse::new(vec![drink.long()])))
}

/// 음료 삭제.
#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    tag = "drinks",
    params(("id" = i64, Path, description = "음료 ID")),
    security(("bearer_auth" = ["delete:drinks"])),
    responses(
        (status = 200, description = "삭제된 음료 ID", body = DeleteDrinkResponse),
        (status = 401, description = "인증 실패", body = AuthErrorBody),
        (status = 403, description = "권한 없음", body = AuthErrorBody),
        (status = 404, description = "음료 없음", body = ErrorBody)
    )
)]
pub async fn delete_drink(
    auth: Authorized<DeleteDrinks>,
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<DeleteDrinkResponse>> {
    let id = parse_id(id)?;

    let deleted = state
        .store
        .delete(id)
        .await
        .map_err(ApiError::write_failure)?;

    info!(id = deleted, sub = ?auth.claims.sub, "음료 삭제");
    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: deleted,
    }))
}

/// 음료 라우터 생성.
pub fn drinks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks-detail", get(drinks_detail))
        .route("/drinks/{id}", patch(update_drink).delete(delete_drink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use crate::test_support::{sign, valid_claims};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(create_test_state().await);
        (drinks_router().with_state(Arc::clone(&state)), state)
    }

    fn request(method: Method, uri: &str, permissions: Option<&[&str]>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(permissions) = permissions {
            let token = sign(&valid_claims(permissions));
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[test]
    fn test_validate_create_request() {
        let ok: CreateDrinkRequest = serde_json::from_value(json!({
            "title": "latte",
            "recipe": [{"name": "milk", "color": "white", "parts": 3}]
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let blank: CreateDrinkRequest = serde_json::from_value(json!({
            "title": "  ",
            "recipe": [{"name": "milk", "color": "white", "parts": 3}]
        }))
        .unwrap();
        assert!(blank.validate().is_err());

        let empty_recipe: CreateDrinkRequest =
            serde_json::from_value(json!({"title": "air", "recipe": []})).unwrap();
        assert!(empty_recipe.validate().is_err());
    }

    #[test]
    fn test_validate_update_request() {
        assert!(UpdateDrinkRequest::default().validate().is_ok());

        let blank = UpdateDrinkRequest {
            title: Some(String::new()),
            recipe: None,
        };
        assert!(blank.validate().is_err());
    }

    #[tokio::test]
    async fn test_public_list_uses_short_form() {
        let (app, state) = app().await;
        state
            .store
            .create(NewDrink::new(
                "mocha",
                Recipe::new(vec![Ingredient::new("chocolate", "brown", 1)]),
            ))
            .await
            .unwrap();

        let (status, body) = send(&app, request(Method::GET, "/drinks", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "drinks": [{"id": 1, "title": "mocha", "recipe": [{"color": "brown", "parts": 1}]}]
            })
        );
    }

    #[tokio::test]
    async fn test_create_then_detail() {
        let (app, _state) = app().await;
        let payload = json!({
            "title": "latte",
            "recipe": {"name": "milk", "color": "white", "parts": 3}
        });

        let (status, body) = send(
            &app,
            request(Method::POST, "/drinks", Some(&["post:drinks"]), Some(payload)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["drinks"][0]["recipe"][0]["name"], "milk");

        let (status, body) = send(
            &app,
            request(Method::GET, "/drinks-detail", Some(&["get:drinks-detail"]), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["drinks"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_patch_and_delete_missing_are_not_found() {
        let (app, _state) = app().await;

        let (status, body) = send(
            &app,
            request(
                Method::PATCH,
                "/drinks/99",
                Some(&["patch:drinks"]),
                Some(json!({"title": "ghost"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "resource not found");

        let (status, _) = send(
            &app,
            request(Method::DELETE, "/drinks/99", Some(&["delete:drinks"]), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_integer_id_is_not_found() {
        let (app, _state) = app().await;
        let (status, _) = send(
            &app,
            request(Method::DELETE, "/drinks/abc", Some(&["delete:drinks"]), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_is_unprocessable() {
        let (app, _state) = app().await;
        let token = sign(&valid_claims(&["post:drinks"]));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/drinks")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({"success": false, "error": 422, "message": "unprocessable"})
        );
    }
}
