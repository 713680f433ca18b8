//! 업데이트 연산자와 파이프라인 단계 적용
//!
//! 패치: `$set`, `$unset`, `$inc`, `$setOnInsert`, `$push`, `$addToSet`, `$pull`.
//! 파이프라인: `$set`/`$addFields`, `$unset` 단계와 식
//! (`"$field"`, `$$NOW`, `$literal`, `$add`, `$ifNull`, `$setUnion`,
//! `$setDifference`, `$concatArrays`).

use mongodb::bson::{Bson, DateTime, Document};

use crate::db::memory::filter::{
    as_f64, is_operator_document, lookup, matches_field, values_equal,
};
use crate::db::store::Update;
use crate::errors::{AppError, AppResult};

/// 업데이트를 문서에 적용합니다. `inserting`은 upsert로 새 문서를 만드는 중인지 여부입니다.
pub(crate) fn apply_update(document: &mut Document, update: &Update, inserting: bool) -> AppResult<()> {
    match update {
        Update::Patch(operators) => apply_operators(document, operators, inserting),
        Update::Pipeline(stages) => {
            for stage in stages {
                apply_stage(document, stage)?;
            }
            Ok(())
        }
    }
}

pub(crate) fn set_path(document: &mut Document, path: &str, value: Bson) -> AppResult<()> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }
            match document.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => Err(AppError::DatabaseError(format!(
                    "Cannot create field '{}' in element {{{}: ...}}",
                    rest, head
                ))),
            }
        }
    }
}

pub(crate) fn remove_path(document: &mut Document, path: &str) -> Option<Bson> {
    match path.split_once('.') {
        None => document.remove(path),
        Some((head, rest)) => match document.get_mut(head) {
            Some(Bson::Document(inner)) => remove_path(inner, rest),
            _ => None,
        },
    }
}

fn apply_operators(document: &mut Document, operators: &Document, inserting: bool) -> AppResult<()> {
    for (operator, fields) in operators {
        if !operator.starts_with('$') {
            return Err(AppError::DatabaseError(
                "update document requires atomic operators".to_string(),
            ));
        }
        let Bson::Document(fields) = fields else {
            return Err(AppError::DatabaseError(format!(
                "Modifiers operate on fields but we found {} with a non-document value",
                operator
            )));
        };

        match operator.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(document, path, value.clone())?;
                }
            }
            "$setOnInsert" => {
                if inserting {
                    for (path, value) in fields {
                        set_path(document, path, value.clone())?;
                    }
                }
            }
            "$unset" => {
                for path in fields.keys() {
                    remove_path(document, path);
                }
            }
            "$inc" => {
                for (path, amount) in fields {
                    let current = lookup(document, path).cloned().unwrap_or(Bson::Int32(0));
                    let next = add_values(&current, amount)?;
                    set_path(document, path, next)?;
                }
            }
            "$push" | "$addToSet" => {
                for (path, value) in fields {
                    let mut items = array_at(document, path)?;
                    for item in each_values(value) {
                        let present = items.iter().any(|existing| values_equal(existing, &item));
                        if operator == "$push" || !present {
                            items.push(item);
                        }
                    }
                    set_path(document, path, Bson::Array(items))?;
                }
            }
            "$pull" => {
                for (path, condition) in fields {
                    let items = array_at(document, path)?;
                    let mut kept = Vec::with_capacity(items.len());
                    for item in items {
                        if !pull_matches(&item, condition)? {
                            kept.push(item);
                        }
                    }
                    set_path(document, path, Bson::Array(kept))?;
                }
            }
            other => {
                return Err(AppError::DatabaseError(format!("Unknown modifier: {}", other)));
            }
        }
    }

    Ok(())
}

fn array_at(document: &Document, path: &str) -> AppResult<Vec<Bson>> {
    match lookup(document, path) {
        None | Some(Bson::Null) => Ok(Vec::new()),
        Some(Bson::Array(items)) => Ok(items.clone()),
        Some(_) => Err(AppError::DatabaseError(format!(
            "The field '{}' must be an array",
            path
        ))),
    }
}

fn each_values(value: &Bson) -> Vec<Bson> {
    match value {
        Bson::Document(spec) => match spec.get("$each") {
            Some(Bson::Array(items)) => items.clone(),
            _ => vec![value.clone()],
        },
        other => vec![other.clone()],
    }
}

fn pull_matches(item: &Bson, condition: &Bson) -> AppResult<bool> {
    match condition {
        Bson::Document(operators) if is_operator_document(operators) => {
            matches_field(Some(item), condition)
        }
        expected => Ok(values_equal(item, expected)),
    }
}

/// 숫자끼리의 덧셈. 날짜에 숫자를 더하면 밀리초로 취급합니다.
fn add_values(left: &Bson, right: &Bson) -> AppResult<Bson> {
    match (left, right) {
        (Bson::Int32(l), Bson::Int32(r)) => Ok(l
            .checked_add(*r)
            .map(Bson::Int32)
            .unwrap_or(Bson::Int64(i64::from(*l) + i64::from(*r)))),
        (Bson::Int32(_) | Bson::Int64(_), Bson::Int32(_) | Bson::Int64(_)) => {
            let l = as_i64(left).unwrap_or_default();
            let r = as_i64(right).unwrap_or_default();
            Ok(Bson::Int64(l.saturating_add(r)))
        }
        (Bson::DateTime(date), number) | (number, Bson::DateTime(date)) => {
            let millis = as_f64(number).ok_or_else(|| {
                AppError::DatabaseError("only numbers can be added to a date".to_string())
            })?;
            Ok(Bson::DateTime(DateTime::from_millis(
                date.timestamp_millis() + millis as i64,
            )))
        }
        _ => match (as_f64(left), as_f64(right)) {
            (Some(l), Some(r)) => Ok(Bson::Double(l + r)),
            _ => Err(AppError::DatabaseError(format!(
                "Cannot apply $add/$inc to non-numeric values {} and {}",
                left, right
            ))),
        },
    }
}

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        _ => None,
    }
}

fn apply_stage(document: &mut Document, stage: &Document) -> AppResult<()> {
    for (name, spec) in stage {
        match name.as_str() {
            "$set" | "$addFields" => {
                let Bson::Document(fields) = spec else {
                    return Err(AppError::DatabaseError(format!(
                        "{} specification stage must be an object",
                        name
                    )));
                };
                // 한 단계 안의 식은 모두 단계 시작 시점의 문서를 기준으로 평가됩니다.
                let input = document.clone();
                for (path, expression) in fields {
                    let value = evaluate(&input, expression)?;
                    set_path(document, path, value)?;
                }
            }
            "$unset" => match spec {
                Bson::String(path) => {
                    remove_path(document, path);
                }
                Bson::Array(paths) => {
                    for path in paths {
                        if let Bson::String(path) = path {
                            remove_path(document, path);
                        }
                    }
                }
                _ => {
                    return Err(AppError::DatabaseError(
                        "$unset specification must be a string or an array".to_string(),
                    ));
                }
            },
            other => {
                return Err(AppError::DatabaseError(format!(
                    "unsupported update pipeline stage: {}",
                    other
                )));
            }
        }
    }

    Ok(())
}

/// 집계 식을 평가합니다.
pub(crate) fn evaluate(document: &Document, expression: &Bson) -> AppResult<Bson> {
    match expression {
        Bson::String(variable) if variable == "$$NOW" => Ok(Bson::DateTime(DateTime::now())),
        Bson::String(variable) if variable.starts_with("$$") => Err(AppError::DatabaseError(
            format!("unsupported variable: {}", variable),
        )),
        Bson::String(path) if path.starts_with('$') => {
            Ok(lookup(document, &path[1..]).cloned().unwrap_or(Bson::Null))
        }
        Bson::Array(items) => items
            .iter()
            .map(|item| evaluate(document, item))
            .collect::<AppResult<Vec<_>>>()
            .map(Bson::Array),
        Bson::Document(inner) if is_operator_document(inner) => evaluate_operator(document, inner),
        Bson::Document(inner) => {
            let mut evaluated = Document::new();
            for (key, value) in inner {
                evaluated.insert(key.clone(), evaluate(document, value)?);
            }
            Ok(Bson::Document(evaluated))
        }
        literal => Ok(literal.clone()),
    }
}

fn evaluate_operator(document: &Document, expression: &Document) -> AppResult<Bson> {
    let Some((operator, arguments)) = expression.iter().next() else {
        return Ok(Bson::Document(Document::new()));
    };
    if expression.len() > 1 {
        return Err(AppError::DatabaseError(format!(
            "an expression specification must contain exactly one field: {}",
            operator
        )));
    }

    match operator.as_str() {
        "$literal" => Ok(arguments.clone()),
        "$add" => {
            let mut total: Option<Bson> = None;
            for argument in operands(arguments) {
                let value = evaluate(document, argument)?;
                if matches!(value, Bson::Null) {
                    return Ok(Bson::Null);
                }
                total = Some(match total {
                    None => value,
                    Some(sum) => add_values(&sum, &value)?,
                });
            }
            Ok(total.unwrap_or(Bson::Int32(0)))
        }
        "$ifNull" => {
            let arguments = operands(arguments);
            let Some((fallback, candidates)) = arguments.split_last() else {
                return Err(AppError::DatabaseError(
                    "$ifNull needs at least two arguments".to_string(),
                ));
            };
            for candidate in candidates {
                let value = evaluate(document, candidate)?;
                if !matches!(value, Bson::Null) {
                    return Ok(value);
                }
            }
            evaluate(document, fallback)
        }
        "$setUnion" | "$concatArrays" => {
            let mut merged: Vec<Bson> = Vec::new();
            for argument in operands(arguments) {
                let Some(items) = evaluate_array(document, argument, operator)? else {
                    return Ok(Bson::Null);
                };
                for item in items {
                    let present = merged.iter().any(|existing| values_equal(existing, &item));
                    if operator == "$concatArrays" || !present {
                        merged.push(item);
                    }
                }
            }
            Ok(Bson::Array(merged))
        }
        "$setDifference" => {
            let arguments = operands(arguments);
            let [left, right] = arguments.as_slice() else {
                return Err(AppError::DatabaseError(
                    "$setDifference takes exactly 2 arguments".to_string(),
                ));
            };
            let (Some(left), Some(right)) = (
                evaluate_array(document, left, operator)?,
                evaluate_array(document, right, operator)?,
            ) else {
                return Ok(Bson::Null);
            };

            let mut difference: Vec<Bson> = Vec::new();
            for item in left {
                let removed = right.iter().any(|other| values_equal(other, &item));
                let present = difference.iter().any(|existing| values_equal(existing, &item));
                if !removed && !present {
                    difference.push(item);
                }
            }
            Ok(Bson::Array(difference))
        }
        other => Err(AppError::DatabaseError(format!(
            "unsupported expression operator: {}",
            other
        ))),
    }
}

fn operands(arguments: &Bson) -> Vec<&Bson> {
    match arguments {
        Bson::Array(items) => items.iter().collect(),
        single => vec![single],
    }
}

fn evaluate_array(document: &Document, argument: &Bson, operator: &str) -> AppResult<Option<Vec<Bson>>> {
    match evaluate(document, argument)? {
        Bson::Null => Ok(None),
        Bson::Array(items) => Ok(Some(items)),
        other => Err(AppError::DatabaseError(format!(
            "All operands of {} must be arrays, found {}",
            operator, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_patch_operators() {
        let mut document = doc! { "name": "old", "restoredAt": DateTime::now(), "__v": 0 };
        let update = Update::Patch(doc! {
            "$set": { "name": "new", "meta.origin": "KR" },
            "$unset": { "restoredAt": 1 },
            "$inc": { "__v": 1 },
        });

        apply_update(&mut document, &update, false).unwrap();

        assert_eq!(document.get_str("name").unwrap(), "new");
        assert_eq!(document.get_document("meta").unwrap().get_str("origin").unwrap(), "KR");
        assert!(!document.contains_key("restoredAt"));
        assert_eq!(document.get_i32("__v").unwrap(), 1);
    }

    #[test]
    fn test_inc_creates_missing_field() {
        let mut document = doc! {};
        apply_update(&mut document, &Update::Patch(doc! { "$inc": { "__v": 1 } }), false).unwrap();

        assert_eq!(document.get_i32("__v").unwrap(), 1);
    }

    #[test]
    fn test_patch_requires_operators() {
        let mut document = doc! {};
        let result = apply_update(&mut document, &Update::Patch(doc! { "name": "x" }), false);

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[test]
    fn test_array_operators() {
        let mut document = doc! { "brands": ["a", "b"] };
        let update = Update::Patch(doc! {
            "$addToSet": { "brands": { "$each": ["b", "c"] } },
        });
        apply_update(&mut document, &update, false).unwrap();
        assert_eq!(document.get_array("brands").unwrap().len(), 3);

        let update = Update::Patch(doc! { "$pull": { "brands": "a" } });
        apply_update(&mut document, &update, false).unwrap();
        assert_eq!(
            document.get_array("brands").unwrap(),
            &vec![Bson::String("b".into()), Bson::String("c".into())]
        );
    }

    #[test]
    fn test_pipeline_version_expression() {
        let mut document = doc! { "name": "x" };
        let stage = doc! { "$set": { "__v": { "$add": [ { "$ifNull": ["$__v", 0] }, 1 ] } } };

        apply_update(&mut document, &Update::Pipeline(vec![stage.clone()]), false).unwrap();
        apply_update(&mut document, &Update::Pipeline(vec![stage]), false).unwrap();

        assert_eq!(document.get_i32("__v").unwrap(), 2);
    }

    #[test]
    fn test_pipeline_set_union_and_difference() {
        let mut document = doc! { "brands": ["a", "b", "c"] };
        let stage = doc! {
            "$set": {
                "brands": {
                    "$setUnion": [
                        { "$setDifference": [ { "$ifNull": ["$brands", []] }, ["b"] ] },
                        ["d", "a"],
                    ]
                },
                "name": { "$literal": "$not-a-path" },
            }
        };

        apply_update(&mut document, &Update::Pipeline(vec![stage]), false).unwrap();

        assert_eq!(
            document.get_array("brands").unwrap(),
            &vec![
                Bson::String("a".into()),
                Bson::String("c".into()),
                Bson::String("d".into()),
            ]
        );
        assert_eq!(document.get_str("name").unwrap(), "$not-a-path");
    }

    #[test]
    fn test_pipeline_unset_stage() {
        let mut document = doc! { "freezedAt": DateTime::now(), "name": "x" };
        apply_update(
            &mut document,
            &Update::Pipeline(vec![doc! { "$unset": ["freezedAt"] }]),
            false,
        )
        .unwrap();

        assert!(!document.contains_key("freezedAt"));
    }

    #[test]
    fn test_set_on_insert_only_when_inserting() {
        let update = Update::Patch(doc! { "$setOnInsert": { "createdAt": "now" } });

        let mut existing = doc! {};
        apply_update(&mut existing, &update, false).unwrap();
        assert!(!existing.contains_key("createdAt"));

        let mut inserted = doc! {};
        apply_update(&mut inserted, &update, true).unwrap();
        assert!(inserted.contains_key("createdAt"));
    }
}
