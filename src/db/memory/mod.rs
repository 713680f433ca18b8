//! 프로세스 내부 문서 저장소
//!
//! MongoDB 없이 리포지토리와 서비스를 실행하기 위한 [`DocumentStore`] 구현입니다.
//! 컬렉션 전체를 하나의 `RwLock`으로 보호하며, 락은 한 작업 동안만 유지되므로
//! MongoDB의 단일 문서 원자성과 같은 수준을 제공합니다.
//!
//! 필터, 업데이트 연산자, 파이프라인 `$set` 단계, 프로젝션, 정렬, 유니크 인덱스를
//! 지원합니다. TTL 인덱스는 등록만 되고 문서를 만료시키지는 않습니다.
//!
//! ```rust,ignore
//! let store = Arc::new(MemoryStore::new().with_unique_index("brands", "name"));
//! let brands = BrandRepository::new(store.clone());
//! ```

mod filter;
mod projection;
mod update;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};

use crate::db::store::{
    DeleteSummary, DocumentStore, FindAndModifyOptions, FindOptions, IndexSpec, InsertOptions,
    Update, UpdateOptions, WriteResult,
};
use crate::errors::{AppError, AppResult};

use filter::{is_operator_document, lookup, matches, values_equal};
use projection::{compare_by_sort, project};
use update::{apply_update, set_path};

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Document>>,
    indexes: HashMap<String, Vec<IndexSpec>>,
}

/// 메모리 기반 [`DocumentStore`]
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 단일 필드 유니크 인덱스를 미리 등록합니다.
    pub fn with_unique_index(mut self, collection: &str, field: &str) -> Self {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state
            .indexes
            .entry(collection.to_string())
            .or_default()
            .push(IndexSpec::unique(field));
        self
    }

    /// 컬렉션에 저장된 원본 문서들 (소프트 삭제 여부와 무관)
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.read()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// 등록된 인덱스 목록
    pub fn indexes(&self, collection: &str) -> Vec<IndexSpec> {
        self.read()
            .indexes
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn matching(
        &self,
        collection: &str,
        filter: &Document,
        sort: Option<&Document>,
    ) -> AppResult<Vec<usize>> {
        let Some(documents) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut indices = Vec::new();
        for (index, document) in documents.iter().enumerate() {
            if matches(document, filter)? {
                indices.push(index);
            }
        }

        if let Some(sort) = sort {
            indices.sort_by(|a, b| compare_by_sort(&documents[*a], &documents[*b], sort));
        }

        Ok(indices)
    }

    fn document(&self, collection: &str, index: usize) -> AppResult<Document> {
        self.collections
            .get(collection)
            .and_then(|documents| documents.get(index))
            .cloned()
            .ok_or_else(|| AppError::InternalError(format!("{}[{}] 문서가 사라졌습니다", collection, index)))
    }

    /// `_id`와 유니크 인덱스 제약을 검사합니다. `skip`은 자기 자신의 위치입니다.
    fn check_unique(&self, collection: &str, candidate: &Document, skip: Option<usize>) -> AppResult<()> {
        let Some(documents) = self.collections.get(collection) else {
            return Ok(());
        };

        let id_index = IndexSpec {
            name: "_id_".to_string(),
            keys: mongodb::bson::doc! { "_id": 1 },
            unique: true,
            expire_after: None,
        };
        let declared = self.indexes.get(collection).into_iter().flatten();

        for index in std::iter::once(&id_index).chain(declared) {
            if !index.unique {
                continue;
            }

            let key: Vec<Bson> = index
                .keys
                .keys()
                .map(|path| lookup(candidate, path).cloned().unwrap_or(Bson::Null))
                .collect();

            for (position, existing) in documents.iter().enumerate() {
                if Some(position) == skip {
                    continue;
                }
                let duplicated = index.keys.keys().zip(&key).all(|(path, value)| {
                    values_equal(lookup(existing, path).unwrap_or(&Bson::Null), value)
                });
                if duplicated {
                    return Err(AppError::DatabaseError(format!(
                        "E11000 duplicate key error collection: {} index: {} dup key: {:?}",
                        collection, index.name, key
                    )));
                }
            }
        }

        Ok(())
    }

    /// 문서 하나에 업데이트를 적용하고 (수정 전, 수정 후) 문서를 돌려줍니다.
    fn modify(&mut self, collection: &str, index: usize, update: &Update) -> AppResult<(Document, Document)> {
        let before = self.document(collection, index)?;
        let mut after = before.clone();
        apply_update(&mut after, update, false)?;

        if after.get("_id") != before.get("_id") {
            return Err(AppError::DatabaseError(
                "Performing an update on the path '_id' would modify the immutable field '_id'"
                    .to_string(),
            ));
        }
        self.check_unique(collection, &after, Some(index))?;

        if let Some(slot) = self
            .collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(index))
        {
            *slot = after.clone();
        }

        Ok((before, after))
    }

    /// 필터의 동등 조건으로 새 문서를 만들고 업데이트를 적용해 삽입합니다.
    fn upsert(&mut self, collection: &str, filter: &Document, update: &Update) -> AppResult<Document> {
        let mut document = Document::new();
        for (path, value) in filter {
            if path.starts_with('$') {
                continue;
            }
            if let Bson::Document(condition) = value {
                if is_operator_document(condition) {
                    continue;
                }
            }
            set_path(&mut document, path, value.clone())?;
        }

        apply_update(&mut document, update, true)?;
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }
        self.check_unique(collection, &document, None)?;

        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());

        Ok(document)
    }

    fn remove(&mut self, collection: &str, index: usize) -> Option<Document> {
        let documents = self.collections.get_mut(collection)?;
        (index < documents.len()).then(|| documents.remove(index))
    }
}

fn projected(document: Document, projection: Option<&Document>) -> AppResult<Document> {
    match projection {
        Some(projection) => project(&document, projection),
        None => Ok(document),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> AppResult<Vec<Document>> {
        let state = self.read();
        let indices = state.matching(collection, &filter, options.sort.as_ref())?;

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = match options.limit {
            Some(limit) if limit > 0 => limit as usize,
            _ => usize::MAX,
        };

        indices
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|index| projected(state.document(collection, index)?, options.projection.as_ref()))
            .collect()
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> AppResult<Option<Document>> {
        let options = FindOptions {
            limit: Some(1),
            ..options
        };
        let found = self.find(collection, filter, options).await?;
        Ok(found.into_iter().next())
    }

    async fn count(&self, collection: &str, filter: Document) -> AppResult<u64> {
        let state = self.read();
        Ok(state.matching(collection, &filter, None)?.len() as u64)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: InsertOptions,
    ) -> AppResult<Vec<Document>> {
        let ordered = options.ordered.unwrap_or(true);
        let mut state = self.write();
        let mut inserted = Vec::with_capacity(documents.len());
        let mut first_error = None;

        for mut document in documents {
            if !document.contains_key("_id") {
                document.insert("_id", ObjectId::new());
            }

            match state.check_unique(collection, &document, None) {
                Ok(()) => {
                    state
                        .collections
                        .entry(collection.to_string())
                        .or_default()
                        .push(document.clone());
                    inserted.push(document);
                }
                Err(error) => {
                    first_error.get_or_insert(error);
                    if ordered {
                        break;
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(inserted),
        }
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
        options: UpdateOptions,
    ) -> AppResult<WriteResult> {
        let mut state = self.write();

        match state.matching(collection, &filter, None)?.first().copied() {
            Some(index) => {
                let (before, after) = state.modify(collection, index, &update)?;
                Ok(WriteResult {
                    matched_count: 1,
                    modified_count: u64::from(before != after),
                    upserted_id: None,
                })
            }
            None if options.upsert => {
                let document = state.upsert(collection, &filter, &update)?;
                Ok(WriteResult {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: document.get("_id").cloned(),
                })
            }
            None => Ok(WriteResult::default()),
        }
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
        options: FindAndModifyOptions,
    ) -> AppResult<Option<Document>> {
        let mut state = self.write();
        let first = state
            .matching(collection, &filter, options.sort.as_ref())?
            .first()
            .copied();

        let result = match first {
            Some(index) => {
                let (before, after) = state.modify(collection, index, &update)?;
                Some(if options.return_new { after } else { before })
            }
            None if options.upsert => {
                let document = state.upsert(collection, &filter, &update)?;
                options.return_new.then_some(document)
            }
            None => None,
        };

        result
            .map(|document| projected(document, options.projection.as_ref()))
            .transpose()
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
    ) -> AppResult<Option<Document>> {
        let mut state = self.write();
        let first = state.matching(collection, &filter, None)?.first().copied();

        Ok(first.and_then(|index| state.remove(collection, index)))
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<DeleteSummary> {
        let removed = self.find_one_and_delete(collection, filter).await?;

        Ok(DeleteSummary {
            deleted_count: u64::from(removed.is_some()),
        })
    }

    async fn create_index(&self, collection: &str, index: IndexSpec) -> AppResult<()> {
        let mut state = self.write();
        let indexes = state.indexes.entry(collection.to_string()).or_default();

        match indexes.iter_mut().find(|existing| existing.name == index.name) {
            Some(existing) => *existing = index,
            None => indexes.push(index),
        }

        Ok(())
    }
}
