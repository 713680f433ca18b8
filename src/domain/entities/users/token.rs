//! Revoked Token Entity
//!
//! 로그아웃 등으로 폐기된 토큰의 `jti`를 만료 시각까지 보관합니다.
//! 토큰 발급 자체는 외부 협력자가 담당합니다.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Entity;
use crate::repositories::hooks::{HookPipeline, TimestampsHook};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 토큰 고유 식별자 (unique)
    pub jti: String,
    pub expired_at: DateTime,
    pub created_by: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
    #[serde(rename = "__v", default)]
    pub version: i64,
}

impl Token {
    pub fn new(jti: impl Into<String>, expired_at: DateTime, created_by: ObjectId) -> Self {
        Self {
            id: None,
            jti: jti.into(),
            expired_at,
            created_by,
            created_at: None,
            updated_at: None,
            version: 0,
        }
    }
}

impl Entity for Token {
    const COLLECTION: &'static str = "tokens";
    const MODEL_NAME: &'static str = "Token";

    fn hooks() -> HookPipeline {
        HookPipeline::new().with(TimestampsHook)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
