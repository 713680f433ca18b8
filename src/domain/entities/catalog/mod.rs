//! Catalog Entity Module
//!
//! 브랜드, 카테고리, 상품 엔티티를 정의합니다.
//! 세 엔티티 모두 보관(freeze)/복원(restore)을 지원하며, 이름이 바뀌면 슬러그가 다시 계산됩니다.

pub mod brand;
pub mod category;
pub mod product;

pub use brand::Brand;
pub use category::Category;
pub use product::Product;

use crate::repositories::hooks::{HookPipeline, SlugHook, SoftDeleteHook, TimestampsHook};

/// 카탈로그 엔티티가 공유하는 훅 순서: 소프트 삭제 → 슬러그 → 타임스탬프
pub(crate) fn catalog_hooks() -> HookPipeline {
    HookPipeline::new()
        .with(SoftDeleteHook)
        .with(SlugHook::new("name", "slug"))
        .with(TimestampsHook)
}
