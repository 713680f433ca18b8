//! 카테고리 요청 DTO
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::require_any_field;
use crate::domain::dto::validate_object_ids;

/// 카테고리 생성 요청
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    /// 카테고리 이름 (2-25자)
    #[validate(length(min = 2, max = 25, message = "카테고리 이름은 2-25자 사이여야 합니다"))]
    pub name: String,

    /// 설명 (최대 5000자)
    #[validate(length(min = 2, max = 5000, message = "설명은 2-5000자 사이여야 합니다"))]
    pub description: Option<String>,

    /// 소속 브랜드 식별자 목록. 중복은 서비스에서 제거됩니다.
    #[validate(custom(function = "validate_object_ids"))]
    pub brands: Option<Vec<String>>,
}

/// 카테고리 수정 요청
///
/// `brands`는 기존 목록에 합쳐지고, `removeBrands`는 기존 목록에서 빠집니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_category_update"))]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 2, max = 25, message = "카테고리 이름은 2-25자 사이여야 합니다"))]
    pub name: Option<String>,

    #[validate(length(min = 2, max = 5000, message = "설명은 2-5000자 사이여야 합니다"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_object_ids"))]
    pub brands: Option<Vec<String>>,

    #[validate(custom(function = "validate_object_ids"))]
    pub remove_brands: Option<Vec<String>>,
}

impl UpdateCategoryRequest {
    /// 브랜드 목록을 제외한 일반 필드
    pub fn scalar_fields(&self) -> Document {
        let mut fields = Document::new();
        if let Some(name) = &self.name {
            fields.insert("name", name.as_str());
        }
        if let Some(description) = &self.description {
            fields.insert("description", description.as_str());
        }
        fields
    }
}

fn validate_category_update(req: &UpdateCategoryRequest) -> Result<(), ValidationError> {
    require_any_field(&[
        req.name.is_some(),
        req.description.is_some(),
        req.brands.is_some(),
        req.remove_brands.is_some(),
    ])
}
