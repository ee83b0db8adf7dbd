//! 음료 저장소 추상화.
//!
//! API 계층은 이 trait만 알고 있으며, 실제 저장 매체(SQLite 등)는
//! 애플리케이션 시작 시 주입됩니다.

use async_trait::async_trait;

use super::{Drink, DrinkPatch, NewDrink};
use crate::error::StoreResult;

/// 음료 저장소 trait.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct SqliteDrinkStore {
///     pool: SqlitePool,
/// }
///
/// #[async_trait]
/// impl DrinkStore for SqliteDrinkStore {
///     async fn list(&self) -> StoreResult<Vec<Drink>> {
///         // SELECT ...
///     }
///
///     // ... 나머지 메서드 구현
/// }
/// ```
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// 모든 음료 조회 (ID 순).
    async fn list(&self) -> StoreResult<Vec<Drink>>;

    /// ID로 음료 조회.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: 해당 ID가 없음
    async fn get(&self, id: i64) -> StoreResult<Drink>;

    /// 음료 생성.
    ///
    /// # Errors
    ///
    /// - `StoreError::Conflict`: 같은 제목의 음료가 이미 존재
    async fn create(&self, drink: NewDrink) -> StoreResult<Drink>;

    /// 음료 부분 수정.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: 해당 ID가 없음
    /// - `StoreError::Conflict`: 변경할 제목이 다른 음료와 중복
    async fn update(&self, id: i64, patch: DrinkPatch) -> StoreResult<Drink>;

    /// 음료 삭제 후 삭제된 ID 반환.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: 해당 ID가 없음
    async fn delete(&self, id: i64) -> StoreResult<i64>;

    /// 저장소 연결 상태 확인.
    async fn ping(&self) -> bool;
}
