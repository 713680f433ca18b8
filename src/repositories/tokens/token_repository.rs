use mongodb::bson::{DateTime, doc, oid::ObjectId};

use crate::db::{DocumentStore, IndexSpec};
use crate::domain::entities::Token;
use crate::errors::{AppError, AppResult};
use crate::repositories::{CreateArgs, Hydrated};

entity_repository! {
    /// 폐기 토큰 리포지토리
    ///
    /// - `jti` 유니크: 같은 토큰을 두 번 폐기하면 `DatabaseError`
    /// - `expiredAt` TTL: 원래 토큰의 만료 시각이 지나면 기록 삭제
    TokenRepository<Token> {
        name: "token",
        indexes: [IndexSpec::unique("jti"), IndexSpec::ttl("expiredAt")],
    }
}

impl<S: DocumentStore> TokenRepository<S> {
    /// 토큰을 폐기 목록에 추가합니다.
    pub async fn revoke(
        &self,
        jti: &str,
        expired_at: DateTime,
        created_by: ObjectId,
    ) -> AppResult<Hydrated<Token>> {
        self.create(CreateArgs::one(Token::new(jti, expired_at, created_by)))
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError(format!("토큰 폐기 기록 생성 실패: {}", jti)))
    }

    /// 아직 만료되지 않은 폐기 기록이 있는지 확인합니다.
    pub async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        self.exists(doc! { "jti": jti, "expiredAt": { "$gt": DateTime::now() } })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::registry::Repository;
    use crate::db::MemoryStore;

    fn in_minutes(minutes: i64) -> DateTime {
        DateTime::from_millis(DateTime::now().timestamp_millis() + minutes * 60_000)
    }

    #[tokio::test]
    async fn test_revoke_and_check() {
        let tokens = TokenRepository::new(Arc::new(MemoryStore::new()));
        tokens.init().await.unwrap();

        assert!(!tokens.is_revoked("abc").await.unwrap());

        let revoked = tokens.revoke("abc", in_minutes(10), ObjectId::new()).await.unwrap();
        assert_eq!(revoked.jti, "abc");
        assert!(tokens.is_revoked("abc").await.unwrap());

        let again = tokens.revoke("abc", in_minutes(10), ObjectId::new()).await;
        assert!(matches!(again, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_expired_record_is_not_revoked() {
        let tokens = TokenRepository::new(Arc::new(MemoryStore::new()));

        tokens.revoke("old", in_minutes(-1), ObjectId::new()).await.unwrap();

        assert!(!tokens.is_revoked("old").await.unwrap());
    }
}
