//! # 문서 훅 파이프라인
//!
//! 엔티티마다 선언된 훅들을 리포지토리가 작업 종류에 맞춰 명시적으로 호출합니다.
//!
//! | 시점 | 호출 | 대상 작업 |
//! |------|------|-----------|
//! | 필터 준비 | [`DocumentHook::on_query`] | find, findOne, count, updateOne, findOneAndUpdate, 삭제 |
//! | 업데이트 준비 | [`DocumentHook::on_update`] | updateOne, findOneAndUpdate, findByIdAndUpdate |
//! | 문서 저장 | [`DocumentHook::on_save`] | create, save |
//!
//! 버전(`__v`) 증가는 훅이 아니라 리포지토리가 모든 훅 실행 뒤에 붙입니다.
//!
//! ```rust,ignore
//! fn hooks() -> HookPipeline {
//!     HookPipeline::new()
//!         .with(SoftDeleteHook)
//!         .with(SlugHook::new("name", "slug"))
//!         .with(TimestampsHook)
//! }
//! ```

pub mod hashing;
pub mod slug;
pub mod soft_delete;
pub mod timestamps;

pub use hashing::{HashFieldHook, compare_hash};
pub use slug::SlugHook;
pub use soft_delete::{FREEZED_AT, PARANOID_FLAG, RESTORED_AT, SoftDeleteHook, take_paranoid_flag};
pub use timestamps::TimestampsHook;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use mongodb::bson::{Bson, Document};

use crate::db::Update;
use crate::errors::AppResult;

/// 리포지토리 작업 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Find,
    FindOne,
    Count,
    UpdateOne,
    FindOneAndUpdate,
    FindOneAndDelete,
    DeleteOne,
}

impl Operation {
    pub fn is_update(self) -> bool {
        matches!(self, Operation::UpdateOne | Operation::FindOneAndUpdate)
    }

    pub fn is_delete(self) -> bool {
        matches!(self, Operation::FindOneAndDelete | Operation::DeleteOne)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Find => "find",
            Operation::FindOne => "findOne",
            Operation::Count => "countDocuments",
            Operation::UpdateOne => "updateOne",
            Operation::FindOneAndUpdate => "findOneAndUpdate",
            Operation::FindOneAndDelete => "findOneAndDelete",
            Operation::DeleteOne => "deleteOne",
        }
    }
}

/// 훅에 전달되는 작업 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
    pub operation: Operation,
    /// `false`면 호출자가 `paranoId: false`로 보관 문서 숨김을 해제한 것입니다.
    pub paranoid: bool,
}

impl QueryContext {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            paranoid: true,
        }
    }
}

/// 저장 시점에 변경된 최상위 필드 목록
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    paths: BTreeSet<String>,
    is_new: bool,
}

impl Changes {
    /// 새로 만들어지는 문서: 모든 필드가 변경된 것으로 봅니다.
    pub fn new_document(document: &Document) -> Self {
        Self {
            paths: document.keys().cloned().collect(),
            is_new: true,
        }
    }

    /// 두 문서 상태를 비교해 추가, 변경, 삭제된 필드를 모읍니다.
    pub fn between(before: &Document, after: &Document) -> Self {
        let mut paths: BTreeSet<String> = after
            .iter()
            .filter(|(key, value)| before.get(key.as_str()) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect();
        paths.extend(
            before
                .keys()
                .filter(|key| !after.contains_key(key.as_str()))
                .cloned(),
        );

        Self {
            paths,
            is_new: false,
        }
    }

    /// 지정한 필드를 변경 목록에서 뺍니다.
    pub fn ignoring(mut self, keys: &[&str]) -> Self {
        for key in keys {
            self.paths.remove(*key);
        }
        self
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_modified(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// 엔티티 수준 훅
pub trait DocumentHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_query(&self, _context: &QueryContext, _filter: &mut Document) {}

    fn on_update(&self, _context: &QueryContext, _update: &mut Update) -> AppResult<()> {
        Ok(())
    }

    fn on_save(&self, _document: &mut Document, _changes: &Changes) -> AppResult<()> {
        Ok(())
    }
}

/// 순서가 있는 훅 목록
#[derive(Clone, Default)]
pub struct HookPipeline {
    hooks: Vec<Arc<dyn DocumentHook>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<H: DocumentHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.iter().any(|hook| hook.name() == name)
    }

    /// `paranoId` 표시를 떼어낸 뒤 조회 훅을 실행합니다.
    ///
    /// 저장소에 전달되는 모든 필터는 이 함수를 거칩니다.
    pub fn prepare_filter(&self, operation: Operation, mut filter: Document) -> (Document, QueryContext) {
        let context = QueryContext {
            operation,
            paranoid: take_paranoid_flag(&mut filter),
        };
        self.apply_query(&context, &mut filter);
        (filter, context)
    }

    pub fn apply_query(&self, context: &QueryContext, filter: &mut Document) {
        for hook in &self.hooks {
            hook.on_query(context, filter);
        }
    }

    pub fn apply_update(&self, context: &QueryContext, update: &mut Update) -> AppResult<()> {
        for hook in &self.hooks {
            hook.on_update(context, update)?;
        }
        Ok(())
    }

    pub fn apply_save(&self, document: &mut Document, changes: &Changes) -> AppResult<()> {
        for hook in &self.hooks {
            hook.on_save(document, changes)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HookPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// 패치의 연산자 문서(`$set` 등)를 꺼내 수정한 뒤 다시 넣습니다.
///
/// 연산자 값이 문서가 아니면 손대지 않습니다. 수정 결과가 비면 연산자를 제거합니다.
pub(crate) fn with_operator(patch: &mut Document, operator: &str, edit: impl FnOnce(&mut Document)) {
    let mut fields = match patch.remove(operator) {
        Some(Bson::Document(fields)) => fields,
        Some(other) => {
            patch.insert(operator, other);
            return;
        }
        None => Document::new(),
    };

    edit(&mut fields);

    if !fields.is_empty() {
        patch.insert(operator, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    struct Marker;

    impl DocumentHook for Marker {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn on_query(&self, _context: &QueryContext, filter: &mut Document) {
            filter.insert("marked", true);
        }
    }

    #[test]
    fn test_changes_between() {
        let before = doc! { "name": "a", "slogan": "x", "image": "i" };
        let after = doc! { "name": "b", "image": "i", "slug": "b" };

        let changes = Changes::between(&before, &after);

        assert!(changes.is_modified("name"));
        assert!(changes.is_modified("slogan"));
        assert!(changes.is_modified("slug"));
        assert!(!changes.is_modified("image"));
        assert!(!changes.is_new());
    }

    #[test]
    fn test_changes_ignoring() {
        let changes = Changes::between(&doc! { "__v": 0 }, &doc! { "__v": 1 }).ignoring(&["__v"]);

        assert!(changes.is_empty());
    }

    #[test]
    fn test_pipeline_runs_hooks_in_order() {
        let pipeline = HookPipeline::new().with(Marker).with(SoftDeleteHook);
        let mut filter = doc! {};

        pipeline.apply_query(&QueryContext::new(Operation::Find), &mut filter);

        assert_eq!(pipeline.names(), vec!["marker", "soft-delete"]);
        assert_eq!(
            filter,
            doc! { "marked": true, "freezedAt": { "$exists": false } }
        );
    }

    #[test]
    fn test_prepare_filter_consumes_marker() {
        let pipeline = HookPipeline::new().with(SoftDeleteHook);

        let (filter, context) =
            pipeline.prepare_filter(Operation::Find, doc! { "paranoId": false, "name": "a" });
        assert!(!context.paranoid);
        assert_eq!(filter, doc! { "name": "a" });

        let (filter, context) =
            pipeline.prepare_filter(Operation::DeleteOne, doc! { "paranoId": true });
        assert!(context.paranoid);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_with_operator_merges_and_drops_empty() {
        let mut patch = doc! { "$set": { "name": "a" } };
        with_operator(&mut patch, "$set", |set| {
            set.insert("slug", "a");
        });
        with_operator(&mut patch, "$unset", |_| {});

        assert_eq!(patch, doc! { "$set": { "name": "a", "slug": "a" } });
    }
}
