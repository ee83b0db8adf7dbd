//! 도메인 모델 및 영속성 추상화.

pub mod drink;
pub mod store;

pub use drink::*;
pub use store::*;
