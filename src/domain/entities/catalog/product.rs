//! Product Entity

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::catalog_hooks;
use crate::domain::entities::{Brand, Category, Entity, Reference};
use crate::repositories::hooks::HookPipeline;

/// 상품 엔티티
///
/// 이름 중복은 유니크 인덱스가 아닌 서비스의 사전 검사로만 막습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 상품 이름 (2~2000자)
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub asset_folder_id: String,
    pub brands: Reference<Brand>,
    pub category: Reference<Category>,
    pub original_price: f64,
    /// 할인율 (%)
    #[serde(default)]
    pub discount_price: f64,
    pub sale_price: f64,
    #[serde(default)]
    pub sold_items: i64,
    pub stock: i64,
    pub created_by: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freezed_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
    #[serde(rename = "__v", default)]
    pub version: i64,
}

/// 할인율을 적용한 판매가: `original - original * (discount / 100)`
pub fn sale_price(original_price: f64, discount_percent: f64) -> f64 {
    original_price - original_price * (discount_percent / 100.0)
}

impl Product {
    pub fn is_archived(&self) -> bool {
        self.freezed_at.is_some()
    }
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";
    const MODEL_NAME: &'static str = "Product";

    fn hooks() -> HookPipeline {
        catalog_hooks()
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
