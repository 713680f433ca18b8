//! 소프트 삭제(보관) 필터 재작성
//!
//! 보관된 문서는 `freezedAt`이 설정된 문서입니다. 조회/카운트/업데이트 필터에
//! `freezedAt: {$exists: false}`를 더해 기본적으로 숨기고, 호출자가 필터에
//! `paranoId: false`를 넣으면 그대로 둡니다. 삭제 작업에는 조건을 더하지 않습니다.

use log::debug;
use mongodb::bson::{Bson, Document, doc};

use super::{DocumentHook, QueryContext};

/// 보관 숨김 해제 표시 키. 저장소로는 절대 전달되지 않습니다.
pub const PARANOID_FLAG: &str = "paranoId";
pub const FREEZED_AT: &str = "freezedAt";
pub const RESTORED_AT: &str = "restoredAt";

const LOGICAL_OPERATORS: [&str; 3] = ["$and", "$or", "$nor"];

/// 필터에서 `paranoId` 표시를 제거하고 숨김 적용 여부를 돌려줍니다.
///
/// 값이 정확히 `false`일 때만 숨김을 해제합니다. 숨김 해제는 최상위 표시만
/// 보지만, `$and`/`$or`/`$nor` 절 안의 표시도 모두 지웁니다.
pub fn take_paranoid_flag(filter: &mut Document) -> bool {
    let paranoid = !matches!(filter.remove(PARANOID_FLAG), Some(Bson::Boolean(false)));
    strip_nested_flags(filter);
    paranoid
}

fn strip_nested_flags(filter: &mut Document) {
    for operator in LOGICAL_OPERATORS {
        if let Some(Bson::Array(clauses)) = filter.get_mut(operator) {
            for clause in clauses.iter_mut() {
                if let Bson::Document(clause) = clause {
                    clause.remove(PARANOID_FLAG);
                    strip_nested_flags(clause);
                }
            }
        }
    }
}

pub struct SoftDeleteHook;

impl DocumentHook for SoftDeleteHook {
    fn name(&self) -> &'static str {
        "soft-delete"
    }

    fn on_query(&self, context: &QueryContext, filter: &mut Document) {
        if !context.paranoid || context.operation.is_delete() {
            return;
        }

        let active = doc! { "$exists": false };
        if filter.contains_key(FREEZED_AT) {
            // 호출자의 freezedAt 조건을 덮어쓰지 않고 함께 만족시킵니다.
            let original = std::mem::take(filter);
            *filter = doc! { "$and": [original, { FREEZED_AT: active }] };
        } else {
            filter.insert(FREEZED_AT, active);
        }

        debug!("{} 필터에 보관 제외 조건 추가", context.operation.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::hooks::Operation;

    fn run(operation: Operation, paranoid: bool, mut filter: Document) -> Document {
        let context = QueryContext {
            operation,
            paranoid,
        };
        SoftDeleteHook.on_query(&context, &mut filter);
        filter
    }

    #[test]
    fn test_take_paranoid_flag() {
        let mut filter = doc! { "name": "a", "paranoId": false };
        assert!(!take_paranoid_flag(&mut filter));
        assert_eq!(filter, doc! { "name": "a" });

        let mut filter = doc! { "paranoId": true };
        assert!(take_paranoid_flag(&mut filter));
        assert!(filter.is_empty());

        let mut filter = doc! { "paranoId": "false" };
        assert!(take_paranoid_flag(&mut filter));
        assert!(filter.is_empty());

        let mut filter = doc! {};
        assert!(take_paranoid_flag(&mut filter));
    }

    #[test]
    fn test_take_paranoid_flag_strips_logical_clauses() {
        let mut filter = doc! {
            "$and": [
                { "paranoId": false },
                { "$or": [{ "name": "Acme", "paranoId": true }, { "slug": "acme" }] },
            ],
            "$nor": [{ "paranoId": false, "image": "x" }],
        };

        assert!(take_paranoid_flag(&mut filter));
        assert_eq!(
            filter,
            doc! {
                "$and": [{}, { "$or": [{ "name": "Acme" }, { "slug": "acme" }] }],
                "$nor": [{ "image": "x" }],
            }
        );
    }

    #[test]
    fn test_injects_active_predicate() {
        let filter = run(Operation::Find, true, doc! { "name": "a" });

        assert_eq!(filter, doc! { "name": "a", "freezedAt": { "$exists": false } });
    }

    #[test]
    fn test_combines_with_caller_constraint() {
        let filter = run(
            Operation::FindOneAndUpdate,
            true,
            doc! { "freezedAt": { "$exists": true } },
        );

        assert_eq!(
            filter,
            doc! { "$and": [
                { "freezedAt": { "$exists": true } },
                { "freezedAt": { "$exists": false } },
            ] }
        );
    }

    #[test]
    fn test_bypass_leaves_filter_untouched() {
        let filter = run(Operation::FindOne, false, doc! { "name": "a" });

        assert_eq!(filter, doc! { "name": "a" });
    }

    #[test]
    fn test_delete_operations_are_not_rewritten() {
        let filter = run(Operation::DeleteOne, true, doc! { "name": "a" });
        assert_eq!(filter, doc! { "name": "a" });

        let filter = run(Operation::FindOneAndDelete, true, doc! {});
        assert!(filter.is_empty());
    }
}
