//! `createdAt` / `updatedAt` 관리 훅

use mongodb::bson::{DateTime, Document, doc};

use super::{Changes, DocumentHook, QueryContext, with_operator};
use crate::db::Update;
use crate::errors::AppResult;

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

pub struct TimestampsHook;

impl DocumentHook for TimestampsHook {
    fn name(&self) -> &'static str {
        "timestamps"
    }

    fn on_update(&self, context: &QueryContext, update: &mut Update) -> AppResult<()> {
        if !context.operation.is_update() {
            return Ok(());
        }

        // upsert로 삽입될 때는 createdAt도 채웁니다.
        match update {
            Update::Patch(patch) => {
                let now = DateTime::now();
                let mut sets_created_at = false;
                with_operator(patch, "$set", |set| {
                    sets_created_at = set.contains_key(CREATED_AT);
                    if !set.contains_key(UPDATED_AT) {
                        set.insert(UPDATED_AT, now);
                    }
                });
                if !sets_created_at {
                    with_operator(patch, "$setOnInsert", |on_insert| {
                        if !on_insert.contains_key(CREATED_AT) {
                            on_insert.insert(CREATED_AT, now);
                        }
                    });
                }
            }
            Update::Pipeline(stages) => {
                stages.push(doc! {
                    "$set": {
                        UPDATED_AT: "$$NOW",
                        CREATED_AT: { "$ifNull": ["$createdAt", "$$NOW"] },
                    }
                });
            }
        }

        Ok(())
    }

    fn on_save(&self, document: &mut Document, changes: &Changes) -> AppResult<()> {
        let now = DateTime::now();

        if changes.is_new() && !document.contains_key(CREATED_AT) {
            document.insert(CREATED_AT, now);
        }
        document.insert(UPDATED_AT, now);

        Ok(())
    }
}
