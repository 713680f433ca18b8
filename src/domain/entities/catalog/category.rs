//! Category Entity

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::catalog_hooks;
use crate::domain::entities::{Brand, Entity, Reference};
use crate::repositories::hooks::HookPipeline;

/// 카테고리 엔티티
///
/// 소속 브랜드 목록을 참조로 가지며, 이미지 자산은 `assetFolderId` 폴더 아래에 저장됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 카테고리 이름 (2~25자, unique)
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// 설명 (최대 5000자)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    pub asset_folder_id: String,
    #[serde(default)]
    pub brands: Vec<Reference<Brand>>,
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

impl Category {
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        asset_folder_id: impl Into<String>,
        created_by: ObjectId,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: None,
            description: None,
            image: image.into(),
            asset_folder_id: asset_folder_id.into(),
            brands: Vec::new(),
            created_by,
            updated_by: None,
            freezed_at: None,
            restored_at: None,
            created_at: None,
            updated_at: None,
            version: 0,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_brands(mut self, brands: Vec<ObjectId>) -> Self {
        self.brands = brands.into_iter().map(Reference::Id).collect();
        self
    }

    /// 참조 중인 브랜드 식별자 목록
    pub fn brand_ids(&self) -> Vec<ObjectId> {
        self.brands.iter().filter_map(Reference::id).collect()
    }

    pub fn is_archived(&self) -> bool {
        self.freezed_at.is_some()
    }
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";
    const MODEL_NAME: &'static str = "Category";

    fn hooks() -> HookPipeline {
        catalog_hooks()
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
