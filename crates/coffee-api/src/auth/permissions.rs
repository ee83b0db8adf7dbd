//! 보호된 작업별 권한 정의.
//!
//! 각 작업은 토큰의 `permissions` 클레임에 있어야 하는 권한 문자열 하나를
//! 요구합니다. 역할 계층이나 상속은 없습니다.

/// 작업 하나에 필요한 권한을 나타내는 타입.
///
/// [`Authorized`](super::Authorized) 추출기의 타입 파라미터로 사용합니다.
pub trait PermissionScope: Send + Sync + 'static {
    /// 토큰에 있어야 하는 권한 문자열
    const PERMISSION: &'static str;
}

/// 음료 상세(레시피 전체) 조회
#[derive(Debug, Clone, Copy)]
pub struct GetDrinksDetail;

impl PermissionScope for GetDrinksDetail {
    const PERMISSION: &'static str = "get:drinks-detail";
}

/// 음료 생성
#[derive(Debug, Clone, Copy)]
pub struct PostDrinks;

impl PermissionScope for PostDrinks {
    const PERMISSION: &'static str = "post:drinks";
}

/// 음료 수정
#[derive(Debug, Clone, Copy)]
pub struct PatchDrinks;

impl PermissionScope for PatchDrinks {
    const PERMISSION: &'static str = "patch:drinks";
}

/// 음료 삭제
#[derive(Debug, Clone, Copy)]
pub struct DeleteDrinks;

impl PermissionScope for DeleteDrinks {
    const PERMISSION: &'static str = "delete:drinks";
}
