//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리합니다.
//! 핸들러는 `coffee_core::DrinkStore` trait만 사용합니다.

pub mod drinks;

pub use drinks::{connect, SqliteDrinkStore};
