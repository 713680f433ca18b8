//! Brand Entity

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::catalog_hooks;
use crate::domain::entities::Entity;
use crate::repositories::hooks::HookPipeline;

/// 브랜드 엔티티
///
/// `name`은 유니크 인덱스로 보호되며, `slug`는 이름에서 자동으로 만들어집니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 브랜드 이름 (2~25자, unique)
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// 브랜드 슬로건 (2~25자)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slogan: Option<String>,
    /// 자산 저장소 키
    pub image: String,
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

impl Brand {
    pub fn new(name: impl Into<String>, image: impl Into<String>, created_by: ObjectId) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: None,
            slogan: None,
            image: image.into(),
            created_by,
            updated_by: None,
            freezed_at: None,
            restored_at: None,
            created_at: None,
            updated_at: None,
            version: 0,
        }
    }

    pub fn with_slogan(mut self, slogan: Option<String>) -> Self {
        self.slogan = slogan;
        self
    }

    /// 보관(소프트 삭제)된 상태인지 확인
    pub fn is_archived(&self) -> bool {
        self.freezed_at.is_some()
    }
}

impl Entity for Brand {
    const COLLECTION: &'static str = "brands";
    const MODEL_NAME: &'static str = "Brand";

    fn hooks() -> HookPipeline {
        catalog_hooks()
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
