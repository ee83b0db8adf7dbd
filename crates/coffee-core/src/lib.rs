//! # Coffee Core
//!
//! 커피숍 API의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 API 서버 전반에서 사용되는 기본 타입을 제공합니다:
//! - 음료(Drink) 및 레시피 타입과 공개/상세 표현
//! - 영속성 계층 추상화 ([`DrinkStore`])
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
