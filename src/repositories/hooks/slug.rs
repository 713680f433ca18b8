//! 이름 → 슬러그 훅

use mongodb::bson::Document;

use super::{Changes, DocumentHook, QueryContext, with_operator};
use crate::db::Update;
use crate::errors::AppResult;
use crate::utils::slug::slugify;

/// `source` 필드가 바뀌면 `target` 필드에 슬러그를 기록합니다.
///
/// 파이프라인 업데이트는 식의 결과를 미리 알 수 없으므로 건너뜁니다.
pub struct SlugHook {
    source: &'static str,
    target: &'static str,
}

impl SlugHook {
    pub fn new(source: &'static str, target: &'static str) -> Self {
        Self { source, target }
    }
}

impl DocumentHook for SlugHook {
    fn name(&self) -> &'static str {
        "slug"
    }

    fn on_update(&self, context: &QueryContext, update: &mut Update) -> AppResult<()> {
        if !context.operation.is_update() {
            return Ok(());
        }
        let Update::Patch(patch) = update else {
            return Ok(());
        };

        let slug = patch
            .get_document("$set")
            .ok()
            .and_then(|set| set.get_str(self.source).ok())
            .map(slugify);

        if let Some(slug) = slug {
            with_operator(patch, "$set", |set| {
                set.insert(self.target, slug);
            });
        }

        Ok(())
    }

    fn on_save(&self, document: &mut Document, changes: &Changes) -> AppResult<()> {
        if !changes.is_modified(self.source) {
            return Ok(());
        }

        if let Ok(source) = document.get_str(self.source) {
            let slug = slugify(source);
            document.insert(self.target, slug);
        }

        Ok(())
    }
}
