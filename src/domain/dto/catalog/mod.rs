//! 카탈로그 요청 DTO
//!
//! 수정 요청은 모든 필드가 선택 사항이지만, 적어도 하나는 값이 있어야 합니다.

pub mod brand;
pub mod category;
pub mod product;
pub mod query;

pub use brand::{CreateBrandRequest, UpdateBrandRequest};
pub use category::{CreateCategoryRequest, UpdateCategoryRequest};
pub use product::CreateProductRequest;
pub use query::FindAllQuery;

use validator::ValidationError;

/// 수정 요청이 비어 있으면 실패시킵니다.
pub(crate) fn require_any_field(present: &[bool]) -> Result<(), ValidationError> {
    if !present.iter().any(|flag| *flag) {
        return Err(ValidationError::new("empty_update")
            .with_message("All Update Fields Are Empty".into()));
    }
    Ok(())
}
