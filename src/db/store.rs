//! 문서 저장소 추상화
//!
//! 리포지토리 계층은 MongoDB 드라이버에 직접 의존하지 않고 [`DocumentStore`]
//! trait을 통해 컬렉션 단위 작업을 요청합니다. 운영 환경에서는
//! [`MongoStore`](super::mongo_store::MongoStore), 테스트와 로컬 실행에서는
//! [`MemoryStore`](super::memory::MemoryStore)를 사용합니다.
//!
//! 저장소는 전달받은 필터와 업데이트를 그대로 실행할 뿐이며, 소프트 삭제 조건이나
//! 버전 증가 같은 규칙은 모두 리포지토리가 미리 적용해서 넘깁니다.
//! 드라이버 에러는 [`AppError::DatabaseError`](crate::errors::AppError::DatabaseError)로
//! 옮겨 담아 그대로 전파합니다.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use serde::Serialize;

use crate::errors::AppResult;

/// 업데이트 명세
///
/// 연산자 문서(`$set`, `$inc` ...)로 이루어진 패치와
/// 단계별로 평가되는 집계 파이프라인 업데이트를 구분합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// `{ $set: {...}, $unset: {...}, ... }` 형태의 연산자 업데이트.
    /// 연산자가 아닌 최상위 키는 리포지토리가 `$set`으로 옮깁니다.
    Patch(Document),
    /// `[{ $set: {...} }, ...]` 형태의 파이프라인 업데이트
    Pipeline(Vec<Document>),
}

impl Default for Update {
    fn default() -> Self {
        Update::Patch(Document::new())
    }
}

impl From<Document> for Update {
    fn from(document: Document) -> Self {
        Update::Patch(document)
    }
}

impl From<Vec<Document>> for Update {
    fn from(stages: Vec<Document>) -> Self {
        Update::Pipeline(stages)
    }
}

/// 조회 옵션
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// 다건 삽입 옵션
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    /// `Some(false)`이면 중간 실패 이후의 문서도 계속 삽입합니다.
    pub ordered: Option<bool>,
}

/// 단건 업데이트 옵션
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub upsert: bool,
}

/// 조회 후 수정(findOneAndUpdate) 옵션
#[derive(Debug, Clone)]
pub struct FindAndModifyOptions {
    /// `true`면 수정 후 문서를, `false`면 수정 전 문서를 돌려줍니다.
    pub return_new: bool,
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub upsert: bool,
}

impl Default for FindAndModifyOptions {
    fn default() -> Self {
        Self {
            return_new: true,
            projection: None,
            sort: None,
            upsert: false,
        }
    }
}

/// 업데이트 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub matched_count: u64,
    pub modified_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<Bson>,
}

/// 삭제 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: u64,
}

/// 컬렉션 인덱스 정의
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub name: String,
    pub keys: Document,
    pub unique: bool,
    /// TTL 인덱스 만료 시간 (인덱싱된 날짜 필드 기준)
    pub expire_after: Option<Duration>,
}

impl IndexSpec {
    /// 단일 필드 유니크 인덱스
    pub fn unique(field: &str) -> Self {
        let mut keys = Document::new();
        keys.insert(field, 1);

        Self {
            name: format!("{}_unique", field),
            keys,
            unique: true,
            expire_after: None,
        }
    }

    /// 날짜 필드 값이 지나면 문서를 만료시키는 TTL 인덱스
    pub fn ttl(field: &str) -> Self {
        let mut keys = Document::new();
        keys.insert(field, 1);

        Self {
            name: format!("{}_ttl", field),
            keys,
            unique: false,
            expire_after: Some(Duration::ZERO),
        }
    }
}

/// 컬렉션 단위 문서 저장소
///
/// 모든 메서드는 단일 문서 원자성만 보장하며, 재시도나 타임아웃 처리는
/// 구현체(드라이버)의 설정을 따릅니다.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> AppResult<Vec<Document>>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> AppResult<Option<Document>>;

    async fn count(&self, collection: &str, filter: Document) -> AppResult<u64>;

    /// 문서를 삽입하고 실제로 저장된 문서들을 돌려줍니다.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: InsertOptions,
    ) -> AppResult<Vec<Document>>;

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
        options: UpdateOptions,
    ) -> AppResult<WriteResult>;

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
        options: FindAndModifyOptions,
    ) -> AppResult<Option<Document>>;

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
    ) -> AppResult<Option<Document>>;

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<DeleteSummary>;

    async fn create_index(&self, collection: &str, index: IndexSpec) -> AppResult<()>;
}
