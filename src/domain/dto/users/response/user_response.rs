use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::users::{Gender, Language, Provider, Role, User};

/// 사용자 응답 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub provide: Provider,
    pub role: Role,
    pub gender: Gender,
    pub preferred_language: Language,

    /// 이메일 확인 여부 (편의 필드)
    pub confirmed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username(),
            email: user.email.clone(),
            provide: user.provide,
            role: user.role,
            gender: user.gender,
            preferred_language: user.preferred_language,
            confirmed: user.is_confirmed(),
            confirm_at: user.confirm_at,
            profile_picture: user.profile_picture.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_response_hides_password() {
        let mut user = User::new_system("Jane Doe", "jane@example.com", "$2b$04$hash");
        user.id = Some(ObjectId::new());

        let response = UserResponse::from(&user);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["username"], "Jane Doe");
        assert_eq!(json["provide"], "SYSTEM");
        assert_eq!(json["confirmed"], false);
        assert!(json.get("password").is_none());
        assert_eq!(response.id, user.id.unwrap().to_hex());
    }
}
