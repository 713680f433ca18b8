//! MongoDB 드라이버 기반 [`DocumentStore`] 구현

use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::debug;
use mongodb::bson::Document;
use mongodb::options::{
    FindOneAndUpdateOptions, FindOneOptions, IndexOptions, InsertManyOptions, ReturnDocument,
    UpdateModifications,
};
use mongodb::{Collection, IndexModel};

use crate::db::Database;
use crate::db::store::{
    DeleteSummary, DocumentStore, FindAndModifyOptions, FindOptions, IndexSpec, InsertOptions,
    Update, UpdateOptions, WriteResult,
};
use crate::errors::{AppError, AppResult};

/// MongoDB 컬렉션에 작업을 위임하는 저장소
///
/// 드라이버 에러는 `AppError::DatabaseError`로 변환되어 그대로 올라갑니다.
#[derive(Clone)]
pub struct MongoStore {
    database: mongodb::Database,
}

impl MongoStore {
    pub fn new(database: &Database) -> Self {
        Self {
            database: database.get_database(),
        }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

/// 드라이버는 음수 제한을 단일 배치로 해석하므로 `i64` 범위를 넘는 값은 최댓값으로 자릅니다.
fn driver_limit(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl From<Update> for UpdateModifications {
    fn from(update: Update) -> Self {
        match update {
            Update::Patch(document) => UpdateModifications::Document(document),
            Update::Pipeline(stages) => UpdateModifications::Pipeline(stages),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> AppResult<Vec<Document>> {
        let find_options = mongodb::options::FindOptions::builder()
            .projection(options.projection)
            .sort(options.sort)
            .skip(options.skip)
            .limit(options.limit.map(driver_limit))
            .build();

        let cursor = self
            .collection(collection)
            .find(filter)
            .with_options(find_options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> AppResult<Option<Document>> {
        let find_options = FindOneOptions::builder()
            .projection(options.projection)
            .sort(options.sort)
            .skip(options.skip)
            .build();

        self.collection(collection)
            .find_one(filter)
            .with_options(find_options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn count(&self, collection: &str, filter: Document) -> AppResult<u64> {
        self.collection(collection)
            .count_documents(filter)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: InsertOptions,
    ) -> AppResult<Vec<Document>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let insert_options = InsertManyOptions::builder().ordered(options.ordered).build();

        let result = self
            .collection(collection)
            .insert_many(&documents)
            .with_options(insert_options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        debug!("{}: {}건 삽입", collection, result.inserted_ids.len());

        Ok(documents
            .into_iter()
            .enumerate()
            .filter(|(index, _)| result.inserted_ids.contains_key(index))
            .map(|(_, document)| document)
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
        options: UpdateOptions,
    ) -> AppResult<WriteResult> {
        let update_options = mongodb::options::UpdateOptions::builder()
            .upsert(options.upsert)
            .build();

        let result = self
            .collection(collection)
            .update_one(filter, UpdateModifications::from(update))
            .with_options(update_options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(WriteResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
        options: FindAndModifyOptions,
    ) -> AppResult<Option<Document>> {
        let return_document = if options.return_new {
            ReturnDocument::After
        } else {
            ReturnDocument::Before
        };

        let modify_options = FindOneAndUpdateOptions::builder()
            .return_document(return_document)
            .projection(options.projection)
            .sort(options.sort)
            .upsert(options.upsert)
            .build();

        self.collection(collection)
            .find_one_and_update(filter, UpdateModifications::from(update))
            .with_options(modify_options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
    ) -> AppResult<Option<Document>> {
        self.collection(collection)
            .find_one_and_delete(filter)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<DeleteSummary> {
        let result = self
            .collection(collection)
            .delete_one(filter)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(DeleteSummary {
            deleted_count: result.deleted_count,
        })
    }

    async fn create_index(&self, collection: &str, index: IndexSpec) -> AppResult<()> {
        let index_options = IndexOptions::builder()
            .name(index.name.clone())
            .unique(index.unique)
            .expire_after(index.expire_after)
            .build();

        let model = IndexModel::builder()
            .keys(index.keys)
            .options(index_options)
            .build();

        self.collection(collection)
            .create_index(model)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        debug!("{}: 인덱스 {} 준비 완료", collection, index.name);
        Ok(())
    }
}
