//! 프로젝션과 정렬

use std::cmp::Ordering;

use mongodb::bson::{Bson, Document};

use crate::db::memory::filter::{compare, is_truthy, lookup};
use crate::db::memory::update::{remove_path, set_path};
use crate::errors::AppResult;

/// 포함(`{name: 1}`) 또는 제외(`{name: 0}`) 프로젝션을 적용합니다.
///
/// `_id`는 명시적으로 제외하지 않는 한 항상 포함됩니다.
pub(crate) fn project(document: &Document, projection: &Document) -> AppResult<Document> {
    if projection.is_empty() {
        return Ok(document.clone());
    }

    let inclusive = projection
        .iter()
        .any(|(path, flag)| path != "_id" && is_truthy(flag));

    if !inclusive {
        let mut projected = document.clone();
        for path in projection.keys() {
            remove_path(&mut projected, path);
        }
        return Ok(projected);
    }

    let mut projected = Document::new();
    if projection.get("_id").is_none_or(is_truthy) {
        if let Some(id) = document.get("_id") {
            projected.insert("_id", id.clone());
        }
    }
    for (path, flag) in projection {
        if path == "_id" || !is_truthy(flag) {
            continue;
        }
        if let Some(value) = lookup(document, path) {
            set_path(&mut projected, path, value.clone())?;
        }
    }

    Ok(projected)
}

/// `{field: 1 | -1}` 정렬 명세에 따라 두 문서의 순서를 비교합니다.
pub(crate) fn compare_by_sort(left: &Document, right: &Document, sort: &Document) -> Ordering {
    for (path, direction) in sort {
        let ordering = sort_order(lookup(left, path), lookup(right, path));
        let descending = matches!(direction, Bson::Int32(d) if *d < 0)
            || matches!(direction, Bson::Int64(d) if *d < 0)
            || matches!(direction, Bson::Double(d) if *d < 0.0);
        let ordering = if descending { ordering.reverse() } else { ordering };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// 값이 없거나 `null`이면 가장 앞, 그 다음은 숫자, 문자열, ... 순서입니다.
fn sort_order(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let rank = |value: Option<&Bson>| match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::ObjectId(_)) => 5,
        Some(Bson::Boolean(_)) => 6,
        Some(Bson::DateTime(_)) => 7,
        Some(_) => 8,
    };

    rank(left).cmp(&rank(right)).then_with(|| match (left, right) {
        (Some(l), Some(r)) => compare(l, r).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn test_inclusive_projection_keeps_id() {
        let id = ObjectId::new();
        let document = doc! { "_id": id, "name": "Acme", "slug": "acme", "image": "x.png" };

        let projected = project(&document, &doc! { "name": 1 }).unwrap();

        assert_eq!(projected, doc! { "_id": id, "name": "Acme" });
    }

    #[test]
    fn test_inclusive_projection_can_drop_id() {
        let document = doc! { "_id": ObjectId::new(), "name": "Acme" };

        let projected = project(&document, &doc! { "name": 1, "_id": 0 }).unwrap();

        assert_eq!(projected, doc! { "name": "Acme" });
    }

    #[test]
    fn test_exclusive_projection() {
        let id = ObjectId::new();
        let document = doc! { "_id": id, "name": "Acme", "password": "hash" };

        let projected = project(&document, &doc! { "password": 0 }).unwrap();

        assert_eq!(projected, doc! { "_id": id, "name": "Acme" });
    }

    #[test]
    fn test_sort_order() {
        let a = doc! { "name": "a", "stock": 1 };
        let b = doc! { "name": "b", "stock": 1 };
        let missing = doc! { "name": "c" };

        assert_eq!(compare_by_sort(&a, &b, &doc! { "name": 1 }), Ordering::Less);
        assert_eq!(compare_by_sort(&a, &b, &doc! { "name": -1 }), Ordering::Greater);
        assert_eq!(
            compare_by_sort(&a, &b, &doc! { "stock": 1, "name": -1 }),
            Ordering::Greater
        );
        assert_eq!(compare_by_sort(&missing, &a, &doc! { "stock": 1 }), Ordering::Less);
    }
}
