//! One-Time Password Entity

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Entity;
use crate::repositories::hooks::{HashFieldHook, HookPipeline, TimestampsHook};

/// OTP 용도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtpType {
    ConfirmEmail,
    ResetPassword,
}

impl OtpType {
    /// 저장소에 기록되는 값
    pub fn as_str(self) -> &'static str {
        match self {
            OtpType::ConfirmEmail => "ConfirmEmail",
            OtpType::ResetPassword => "ResetPassword",
        }
    }
}

/// 일회용 코드
///
/// `code`는 저장 시 bcrypt 해시로 바뀌고, `expiredAt`에 걸린 TTL 인덱스로 만료됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Otp {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    pub expired_at: DateTime,
    #[serde(rename = "type")]
    pub otp_type: OtpType,
    pub created_by: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
    #[serde(rename = "__v", default)]
    pub version: i64,
}

impl Otp {
    pub fn new(code: impl Into<String>, expired_at: DateTime, otp_type: OtpType, created_by: ObjectId) -> Self {
        Self {
            id: None,
            code: code.into(),
            expired_at,
            otp_type,
            created_by,
            created_at: None,
            updated_at: None,
            version: 0,
        }
    }
}

impl Entity for Otp {
    const COLLECTION: &'static str = "otps";
    const MODEL_NAME: &'static str = "Otp";

    fn hooks() -> HookPipeline {
        HookPipeline::new()
            .with(HashFieldHook::new("code"))
            .with(TimestampsHook)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
