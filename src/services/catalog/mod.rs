//! # 카탈로그 서비스
//!
//! 브랜드, 카테고리, 상품의 비즈니스 규칙을 담당합니다.
//!
//! - 이름 중복은 생성 전에 보관된 문서까지 포함해 미리 확인합니다.
//! - 이미지는 [`AssetStorage`](crate::services::storage::AssetStorage)에 먼저 올리고,
//!   문서 생성/수정이 실패하면 올린 파일을 지웁니다.
//! - 영구 삭제는 보관된 문서에만 허용되며, 삭제 후 이미지도 지웁니다.
//!
//! 리포지토리가 돌려준 `None`은 여기서 [`AppError::NotFound`]로 바뀝니다.

pub mod brand_service;
pub mod category_service;
pub mod product_service;

pub use brand_service::BrandService;
pub use category_service::CategoryService;
pub use product_service::ProductService;

use mongodb::bson::{Document, doc, oid::ObjectId};

use crate::errors::AppError;
use crate::repositories::hooks::{FREEZED_AT, PARANOID_FLAG};

/// `archive`가 참이면 보관된 문서만 보도록 필터를 바꿉니다.
pub(crate) fn scope_archive(mut filter: Document, archive: bool) -> Document {
    if archive {
        filter.insert(PARANOID_FLAG, false);
        filter.insert(FREEZED_AT, doc! { "$exists": true });
    }
    filter
}

/// 보관된 문서 하나를 가리키는 필터
pub(crate) fn archived_by_id(id: ObjectId) -> Document {
    scope_archive(doc! { "_id": id }, true)
}

/// 이름 중복 에러. 보관된 문서와 겹치면 따로 알려줍니다.
pub(crate) fn duplicated(model: &str, archived: bool) -> AppError {
    if archived {
        AppError::ConflictError(format!("Duplicated With Archived {}", model))
    } else {
        AppError::ConflictError(format!("Duplicated {}", model))
    }
}

pub(crate) fn not_found(model: &str) -> AppError {
    AppError::NotFound(format!("Fail To Find Matching {} Instance", model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_archive() {
        let id = ObjectId::new();

        assert_eq!(scope_archive(doc! { "_id": id }, false), doc! { "_id": id });
        assert_eq!(
            archived_by_id(id),
            doc! { "_id": id, "paranoId": false, "freezedAt": { "$exists": true } }
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(duplicated("Brand", true).to_string(), "Conflict error: Duplicated With Archived Brand");
        assert_eq!(duplicated("Brand", false).to_string(), "Conflict error: Duplicated Brand");
        assert_eq!(not_found("Brand").to_string(), "Not found: Fail To Find Matching Brand Instance");
    }
}
