//! User Entity Implementation
//!
//! 사용자 엔티티의 핵심 구현체입니다.
//! 시스템 계정(이메일/비밀번호)과 Google 계정을 하나의 모델로 표현합니다.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::Otp;
use crate::domain::entities::Entity;
use crate::repositories::hooks::{HashFieldHook, HookPipeline, TimestampsHook};

/// 계정 제공자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "SYSTEM")]
    System,
    #[serde(rename = "GOOGLE")]
    Google,
}

/// 사용자 권한
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "user")]
    User,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "superAdmin")]
    SuperAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(rename = "male")]
    Male,
    #[serde(rename = "female")]
    Female,
}

/// 선호 언어
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "EN")]
    En,
    #[serde(rename = "AR")]
    Ar,
}

/// 사용자 엔티티
///
/// `password`는 저장 시 [`HashFieldHook`]이 bcrypt 해시로 바꿉니다.
/// `otp`는 저장되지 않는 가상 필드로, `Otp.createdBy`를 기준으로 populate됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    /// 사용자 이메일 (unique)
    pub email: String,
    /// 이메일 확인 시각. 없으면 미확인 계정
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_at: Option<DateTime>,
    /// 비밀번호 (Google 계정은 없음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub provide: Provider,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub preferred_language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_credentials_time: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing)]
    pub otp: Option<Vec<Otp>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
    #[serde(rename = "__v", default)]
    pub version: i64,
}

impl User {
    /// 새 시스템 계정 사용자 생성
    ///
    /// `username`은 "이름 성" 형태로 받아 `firstName`/`lastName`으로 나눕니다.
    pub fn new_system(username: &str, email: impl Into<String>, password: impl Into<String>) -> Self {
        let mut user = Self {
            id: None,
            first_name: String::new(),
            last_name: String::new(),
            email: email.into(),
            confirm_at: None,
            password: Some(password.into()),
            provide: Provider::System,
            role: Role::User,
            gender: Gender::Male,
            preferred_language: Language::En,
            change_credentials_time: None,
            profile_picture: None,
            otp: None,
            created_at: None,
            updated_at: None,
            version: 0,
        };
        user.set_username(username);
        user
    }

    /// 표시 이름 ("이름 성")
    pub fn username(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 공백 기준으로 앞의 두 단어를 이름과 성으로 사용합니다.
    pub fn set_username(&mut self, value: &str) {
        let mut parts = value.split(' ');
        self.first_name = parts.next().unwrap_or_default().to_string();
        self.last_name = parts.next().unwrap_or_default().to_string();
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirm_at.is_some()
    }

    /// populate된 OTP 목록 (populate하지 않았으면 빈 슬라이스)
    pub fn otps(&self) -> &[Otp] {
        self.otp.as_deref().unwrap_or_default()
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const MODEL_NAME: &'static str = "User";

    fn hooks() -> HookPipeline {
        HookPipeline::new()
            .with(HashFieldHook::new("password"))
            .with(TimestampsHook)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document, to_document};

    #[test]
    fn test_username_split() {
        let user = User::new_system("Jane Doe", "jane@example.com", "secret");

        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.last_name, "Doe");
        assert_eq!(user.username(), "Jane Doe");
    }

    #[test]
    fn test_single_word_username() {
        let user = User::new_system("Jane", "jane@example.com", "secret");

        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.last_name, "");
    }

    #[test]
    fn test_enum_wire_values() {
        let user = User::new_system("Jane Doe", "jane@example.com", "secret");
        let document = to_document(&user).unwrap();

        assert_eq!(document.get_str("provide").unwrap(), "SYSTEM");
        assert_eq!(document.get_str("role").unwrap(), "user");
        assert_eq!(document.get_str("preferredLanguage").unwrap(), "EN");
        assert!(!document.contains_key("otp"));
    }

    #[test]
    fn test_defaults_when_reading_sparse_document() {
        let user: User = from_document(doc! {
            "_id": ObjectId::new(),
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jane@example.com",
        })
        .unwrap();

        assert_eq!(user.provide, Provider::System);
        assert_eq!(user.role, Role::User);
        assert!(user.otps().is_empty());
        assert!(!user.is_confirmed());
    }
}
