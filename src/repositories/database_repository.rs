//! # 범용 데이터베이스 리포지토리
//!
//! 하나의 컬렉션을 다루는 재사용 가능한 리포지토리입니다. 엔티티 타입 `E`와
//! 저장소 `S`에 대해 정적으로 디스패치되며, 엔티티별 리포지토리는 이 타입을 감싸기만 합니다.
//!
//! ## 작업별 규칙
//!
//! | 작업 | 필터 훅 | 업데이트 훅 | 저장 훅 | `__v` |
//! |------|:------:|:----------:|:------:|-------|
//! | find / findOne / findById / paginate / count | ✓ | | | |
//! | create | | | ✓ | 0으로 시작 |
//! | updateOne / findOneAndUpdate / findByIdAndUpdate | ✓ | ✓ | | +1 |
//! | save | | | ✓ | +1 (변경이 있을 때만) |
//! | findOneAndDelete / deleteOne | 표시만 제거 | | | |
//!
//! 필터의 `paranoId` 표시는 어떤 작업에서든 훅 실행 전에 제거되어 저장소로 전달되지 않습니다.
//! 버전 증가는 모든 업데이트 훅이 끝난 뒤 붙으므로 어떤 훅도 이를 빠뜨릴 수 없습니다.
//! 저장소 에러는 가공 없이 그대로 전파됩니다.

use std::marker::PhantomData;
use std::sync::Arc;

use log::debug;
use mongodb::bson::{Bson, DateTime, Document, doc, oid::ObjectId};

use crate::db::{
    DeleteSummary, DocumentStore, FindAndModifyOptions, FindOptions, InsertOptions, MongoStore,
    Update, UpdateOptions, WriteResult,
};
use crate::domain::entities::Entity;
use crate::errors::{AppError, AppResult};

use super::args::{
    CreateArgs, DeleteArgs, FindArgs, FindByIdAndUpdateArgs, FindByIdArgs, FindOneAndUpdateArgs,
    FindOneArgs, FreezeArgs, PaginateArgs, QueryOptions, RestoreArgs, UpdateArgs,
    UpdateQueryOptions,
};
use super::hooks::{
    Changes, FREEZED_AT, HookPipeline, Operation, PARANOID_FLAG, QueryContext, RESTORED_AT,
    with_operator,
};
use super::pagination::{Page, PageWindow, Paginated};
use super::populate::{PopulateOptions, populate};
use super::projection::{Hydrated, ID_KEY, Lean, Projection, VERSION_KEY, encode};

/// 컬렉션 하나에 대한 범용 리포지토리
pub struct DatabaseRepository<E: Entity, S: DocumentStore = MongoStore> {
    store: Arc<S>,
    hooks: HookPipeline,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, S: DocumentStore> Clone for DatabaseRepository<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hooks: self.hooks.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity, S: DocumentStore> DatabaseRepository<E, S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            hooks: E::hooks(),
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn collection_name(&self) -> &'static str {
        E::COLLECTION
    }

    pub fn hooks(&self) -> &HookPipeline {
        &self.hooks
    }

    // ===== 조회 =====

    pub async fn find_one<P: Projection<E>>(&self, args: FindOneArgs) -> AppResult<Option<P>> {
        let (filter, _) = self.hooks.prepare_filter(Operation::FindOne, args.filter);
        debug!("{}.findOne filter={}", E::COLLECTION, filter);

        let found = self
            .store
            .find_one(
                E::COLLECTION,
                filter,
                FindOptions {
                    projection: args.select,
                    sort: args.options.sort,
                    skip: args.options.skip,
                    limit: None,
                },
            )
            .await?;

        self.finish_one(found, &args.options.populate).await
    }

    pub async fn find_by_id<P: Projection<E>>(&self, args: FindByIdArgs) -> AppResult<Option<P>> {
        self.find_one(FindOneArgs {
            filter: doc! { ID_KEY: args.id },
            select: args.select,
            options: args.options,
        })
        .await
    }

    /// 조건에 맞는 모든 문서. 없으면 빈 벡터를 돌려줍니다.
    pub async fn find<P: Projection<E>>(&self, args: FindArgs) -> AppResult<Vec<P>> {
        let (filter, _) = self.hooks.prepare_filter(Operation::Find, args.filter);
        self.find_prepared(filter, args.select, args.options).await
    }

    /// 페이지 단위 조회
    ///
    /// [`Page::All`]이면 모든 문서를 개수 정보 없이 돌려줍니다. 그 외에는 보정된
    /// 페이지/크기로 건너뛰기와 제한을 적용하고, 같은 필터로 전체 개수를 셉니다.
    pub async fn paginate<P: Projection<E>>(&self, args: PaginateArgs) -> AppResult<Paginated<P>> {
        let PaginateArgs {
            filter,
            select,
            mut options,
            page,
            size,
        } = args;

        let (filter, _) = self.hooks.prepare_filter(Operation::Find, filter);

        let Page::Number(page) = page else {
            let result = self.find_prepared(filter, select, options).await?;
            return Ok(Paginated::all(result));
        };

        let window = PageWindow::new(page, size);
        options.skip = Some(window.skip());
        options.limit = Some(window.size());

        let docs_count = self.store.count(E::COLLECTION, filter.clone()).await?;
        let result = self.find_prepared(filter, select, options).await?;

        Ok(Paginated::page(window, docs_count, result))
    }

    pub async fn count(&self, filter: Document) -> AppResult<u64> {
        let (filter, _) = self.hooks.prepare_filter(Operation::Count, filter);
        debug!("{}.countDocuments filter={}", E::COLLECTION, filter);

        self.store.count(E::COLLECTION, filter).await
    }

    pub async fn exists(&self, filter: Document) -> AppResult<bool> {
        let found: Option<Lean> = self
            .find_one(FindOneArgs::new(filter).select(doc! { ID_KEY: 1 }))
            .await?;
        Ok(found.is_some())
    }

    // ===== 생성 =====

    /// 문서를 일괄 삽입합니다.
    ///
    /// 문서마다 저장 훅을 실행하고 `_id`(없을 때)와 `__v = 0`을 지정합니다.
    /// `createdBy`는 호출자가 채워야 합니다.
    pub async fn create(&self, args: CreateArgs<E>) -> AppResult<Vec<Hydrated<E>>> {
        if args.data.is_empty() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::with_capacity(args.data.len());
        for entity in &args.data {
            let mut document = encode(entity)?;
            let changes = Changes::new_document(&document);
            self.hooks.apply_save(&mut document, &changes)?;

            if !matches!(document.get(ID_KEY), Some(Bson::ObjectId(_))) {
                let mut with_id = doc! { ID_KEY: ObjectId::new() };
                for (key, value) in document {
                    with_id.insert(key, value);
                }
                document = with_id;
            }
            document.insert(VERSION_KEY, 0_i32);
            documents.push(document);
        }

        debug!("{}.insertMany count={}", E::COLLECTION, documents.len());
        let inserted = self
            .store
            .insert_many(
                E::COLLECTION,
                documents,
                InsertOptions {
                    ordered: args.options.ordered,
                },
            )
            .await?;

        inserted.into_iter().map(Hydrated::from_document).collect()
    }

    // ===== 수정 =====

    pub async fn update_one(&self, args: UpdateArgs) -> AppResult<WriteResult> {
        let (filter, context) = self.hooks.prepare_filter(Operation::UpdateOne, args.filter);
        let update = self.prepare_update(&context, args.update)?;
        debug!("{}.updateOne filter={} update={:?}", E::COLLECTION, filter, update);

        self.store
            .update_one(
                E::COLLECTION,
                filter,
                update,
                UpdateOptions {
                    upsert: args.options.upsert,
                },
            )
            .await
    }

    pub async fn find_one_and_update<P: Projection<E>>(
        &self,
        args: FindOneAndUpdateArgs,
    ) -> AppResult<Option<P>> {
        self.modify_one(args.filter, args.update, args.options).await
    }

    pub async fn find_by_id_and_update<P: Projection<E>>(
        &self,
        args: FindByIdAndUpdateArgs,
    ) -> AppResult<Option<P>> {
        self.modify_one(
            doc! { ID_KEY: args.id },
            args.update.unwrap_or_default(),
            args.options,
        )
        .await
    }

    /// 로드 이후 바뀐 필드만 기록합니다.
    ///
    /// 변경이 없거나 문서가 사라졌으면 `false`를 돌려주고 버전은 그대로입니다.
    /// 성공하면 인스턴스를 저장된 값과 새 버전으로 갱신합니다.
    pub async fn save(&self, instance: &mut Hydrated<E>) -> AppResult<bool> {
        let id = instance.id().ok_or_else(|| {
            AppError::BadRequestError(format!("{} 문서에 _id가 없습니다", E::MODEL_NAME))
        })?;

        let mut current = instance.to_document()?;
        let changes = Changes::between(instance.snapshot(), &current).ignoring(&[ID_KEY, VERSION_KEY]);
        if changes.is_empty() {
            return Ok(false);
        }

        self.hooks.apply_save(&mut current, &changes)?;
        let changes = Changes::between(instance.snapshot(), &current).ignoring(&[ID_KEY, VERSION_KEY]);

        let mut set = Document::new();
        let mut unset = Document::new();
        for path in changes.paths() {
            match current.get(path) {
                Some(value) => {
                    set.insert(path, value.clone());
                }
                None => {
                    unset.insert(path, "");
                }
            }
        }

        let mut patch = Document::new();
        if !set.is_empty() {
            patch.insert("$set", set);
        }
        if !unset.is_empty() {
            patch.insert("$unset", unset);
        }
        let update = bump_version(Update::Patch(patch));
        debug!("{}.save _id={} update={:?}", E::COLLECTION, id, update);

        let result = self
            .store
            .update_one(E::COLLECTION, doc! { ID_KEY: id }, update, UpdateOptions::default())
            .await?;
        if result.matched_count == 0 {
            return Ok(false);
        }

        current.insert(VERSION_KEY, instance.version() + 1);
        instance.refresh(current)?;
        Ok(true)
    }

    // ===== 보관 / 복원 =====

    /// 활성 문서를 보관합니다. 수정 전 문서를 돌려주며, 대상이 없으면 `None`.
    pub async fn freeze<P: Projection<E>>(&self, args: FreezeArgs) -> AppResult<Option<P>> {
        let update = doc! {
            "$set": { FREEZED_AT: DateTime::now(), "updatedBy": args.updated_by },
            "$unset": { RESTORED_AT: 1 },
        };

        self.modify_one(args.filter, update.into(), UpdateQueryOptions::previous())
            .await
    }

    /// 보관된 문서를 복원합니다. 수정 전 문서를 돌려주며, 대상이 없으면 `None`.
    pub async fn restore<P: Projection<E>>(&self, args: RestoreArgs) -> AppResult<Option<P>> {
        let mut filter = args.filter;
        filter.insert(PARANOID_FLAG, false);
        filter.insert(FREEZED_AT, doc! { "$exists": true });

        let update = doc! {
            "$set": { RESTORED_AT: DateTime::now(), "updatedBy": args.updated_by },
            "$unset": { FREEZED_AT: 1 },
        };

        self.modify_one(filter, update.into(), UpdateQueryOptions::previous())
            .await
    }

    // ===== 삭제 =====

    /// 문서를 물리적으로 삭제하고 삭제된 문서를 돌려줍니다. 연관 문서는 건드리지 않습니다.
    pub async fn find_one_and_delete<P: Projection<E>>(&self, args: DeleteArgs) -> AppResult<Option<P>> {
        let (filter, _) = self.hooks.prepare_filter(Operation::FindOneAndDelete, args.filter);
        debug!("{}.findOneAndDelete filter={}", E::COLLECTION, filter);

        let removed = self.store.find_one_and_delete(E::COLLECTION, filter).await?;
        removed.map(P::project).transpose()
    }

    pub async fn delete_one(&self, args: DeleteArgs) -> AppResult<DeleteSummary> {
        let (filter, _) = self.hooks.prepare_filter(Operation::DeleteOne, args.filter);
        debug!("{}.deleteOne filter={}", E::COLLECTION, filter);

        self.store.delete_one(E::COLLECTION, filter).await
    }

    // ===== 내부 =====

    async fn find_prepared<P: Projection<E>>(
        &self,
        filter: Document,
        select: Option<Document>,
        options: QueryOptions,
    ) -> AppResult<Vec<P>> {
        debug!("{}.find filter={}", E::COLLECTION, filter);

        let mut documents = self
            .store
            .find(
                E::COLLECTION,
                filter,
                FindOptions {
                    projection: select,
                    sort: options.sort,
                    skip: options.skip,
                    limit: options.limit,
                },
            )
            .await?;

        populate(self.store.as_ref(), &mut documents, &options.populate).await?;
        documents.into_iter().map(P::project).collect()
    }

    async fn modify_one<P: Projection<E>>(
        &self,
        filter: Document,
        update: Update,
        options: UpdateQueryOptions,
    ) -> AppResult<Option<P>> {
        let (filter, context) = self.hooks.prepare_filter(Operation::FindOneAndUpdate, filter);
        let update = self.prepare_update(&context, update)?;
        debug!("{}.findOneAndUpdate filter={} update={:?}", E::COLLECTION, filter, update);

        let found = self
            .store
            .find_one_and_update(
                E::COLLECTION,
                filter,
                update,
                FindAndModifyOptions {
                    return_new: options.new,
                    projection: options.select,
                    sort: options.sort,
                    upsert: options.upsert,
                },
            )
            .await?;

        self.finish_one(found, &options.populate).await
    }

    async fn finish_one<P: Projection<E>>(
        &self,
        found: Option<Document>,
        populate_options: &[PopulateOptions],
    ) -> AppResult<Option<P>> {
        let Some(document) = found else {
            return Ok(None);
        };

        let mut documents = vec![document];
        populate(self.store.as_ref(), &mut documents, populate_options).await?;
        documents.pop().map(P::project).transpose()
    }

    fn prepare_update(&self, context: &QueryContext, update: Update) -> AppResult<Update> {
        let mut update = normalize_update(update);
        self.hooks.apply_update(context, &mut update)?;
        Ok(bump_version(update))
    }
}

/// 연산자가 아닌 최상위 키는 `$set`으로 옮기고, 호출자가 지정한 `__v`는 버립니다.
fn normalize_update(update: Update) -> Update {
    match update {
        Update::Patch(patch) => Update::Patch(normalize_patch(patch)),
        Update::Pipeline(stages) => {
            Update::Pipeline(stages.into_iter().filter_map(strip_version_stage).collect())
        }
    }
}

fn normalize_patch(patch: Document) -> Document {
    let mut normalized = Document::new();
    let mut loose = Document::new();

    for (key, value) in patch {
        if key == VERSION_KEY {
            continue;
        }
        if !key.starts_with('$') {
            loose.insert(key, value);
            continue;
        }

        match value {
            Bson::Document(mut fields) => {
                fields.remove(VERSION_KEY);
                if !fields.is_empty() {
                    normalized.insert(key, fields);
                }
            }
            other => {
                normalized.insert(key, other);
            }
        }
    }

    if !loose.is_empty() {
        with_operator(&mut normalized, "$set", |set| {
            for (key, value) in loose {
                set.insert(key, value);
            }
        });
    }
    normalized
}

fn strip_version_stage(stage: Document) -> Option<Document> {
    let mut stripped = Document::new();

    for (operator, value) in stage {
        let value = match value {
            Bson::Document(mut fields) => {
                fields.remove(VERSION_KEY);
                if fields.is_empty() {
                    continue;
                }
                Bson::Document(fields)
            }
            Bson::String(field) if field == VERSION_KEY => continue,
            Bson::Array(fields) => Bson::Array(
                fields
                    .into_iter()
                    .filter(|field| field.as_str() != Some(VERSION_KEY))
                    .collect(),
            ),
            other => other,
        };
        stripped.insert(operator, value);
    }

    (!stripped.is_empty()).then_some(stripped)
}

/// 버전 증가를 붙입니다. 패치는 `$inc`, 파이프라인은 마지막 `$set` 단계입니다.
fn bump_version(update: Update) -> Update {
    match update {
        Update::Patch(mut patch) => {
            with_operator(&mut patch, "$inc", |inc| {
                inc.insert(VERSION_KEY, 1_i32);
            });
            Update::Patch(patch)
        }
        Update::Pipeline(mut stages) => {
            stages.push(doc! {
                "$set": { VERSION_KEY: { "$add": [{ "$ifNull": ["$__v", 0] }, 1] } }
            });
            Update::Pipeline(stages)
        }
    }
}
