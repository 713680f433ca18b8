//! 상품 요청 DTO
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::dto::validate_object_id;

/// 상품 생성 요청
///
/// 이미지 파일들은 본문과 별도로 전달되며, 서비스가 제한된 동시성으로 업로드합니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// 상품 이름 (2-2000자)
    #[validate(length(min = 2, max = 2000, message = "상품 이름은 2-2000자 사이여야 합니다"))]
    pub name: String,

    #[validate(length(min = 2, max = 50000, message = "설명은 2-50000자 사이여야 합니다"))]
    pub description: Option<String>,

    /// 브랜드 식별자
    #[validate(custom(function = "validate_object_id"))]
    pub brands: String,

    /// 카테고리 식별자
    #[validate(custom(function = "validate_object_id"))]
    pub category: String,

    #[validate(range(exclusive_min = 0.0, message = "정가는 0보다 커야 합니다"))]
    pub original_price: f64,

    /// 할인율 (0-100%)
    #[validate(range(min = 0.0, max = 100.0, message = "할인율은 0-100 사이여야 합니다"))]
    pub discount_price: Option<f64>,

    #[validate(range(min = 1, message = "재고는 1개 이상이어야 합니다"))]
    pub stock: i64,
}

impl CreateProductRequest {
    pub fn discount_percent(&self) -> f64 {
        self.discount_price.unwrap_or(0.0)
    }
}
