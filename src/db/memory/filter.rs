//! 쿼리 필터 평가
//!
//! MongoDB 쿼리 문법 중 리포지토리와 서비스가 실제로 사용하는 부분집합을 평가합니다.
//! 지원 연산자: `$and`, `$or`, `$nor`, `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`,
//! `$in`, `$nin`, `$exists`, `$regex`(+`$options`), `$not`, `$size`.
//! 배열 필드에 대한 동등 비교는 원소 중 하나만 일치해도 참입니다.

use std::cmp::Ordering;

use mongodb::bson::{Bson, Document};
use regex::RegexBuilder;

use crate::errors::{AppError, AppResult};

/// 점(`.`)으로 구분된 경로를 따라 값을 찾습니다.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

pub(crate) fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// 숫자 타입(`Int32`/`Int64`/`Double`)을 구분하지 않는 동등 비교
pub(crate) fn values_equal(left: &Bson, right: &Bson) -> bool {
    match (as_f64(left), as_f64(right)) {
        (Some(l), Some(r)) => l == r,
        _ => match (left, right) {
            (Bson::Array(l), Bson::Array(r)) => {
                l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
            }
            _ => left == right,
        },
    }
}

/// 같은 종류의 값끼리만 순서를 매깁니다.
pub(crate) fn compare(left: &Bson, right: &Bson) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (as_f64(left), as_f64(right)) {
        return l.partial_cmp(&r);
    }

    match (left, right) {
        (Bson::String(l), Bson::String(r)) => Some(l.cmp(r)),
        (Bson::DateTime(l), Bson::DateTime(r)) => {
            Some(l.timestamp_millis().cmp(&r.timestamp_millis()))
        }
        (Bson::ObjectId(l), Bson::ObjectId(r)) => Some(l.bytes().cmp(&r.bytes())),
        (Bson::Boolean(l), Bson::Boolean(r)) => Some(l.cmp(r)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

pub(crate) fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(flag) => *flag,
        Bson::Null => false,
        other => as_f64(other).map_or(true, |number| number != 0.0),
    }
}

pub(crate) fn is_operator_document(document: &Document) -> bool {
    document.keys().next().is_some_and(|key| key.starts_with('$'))
}

/// 문서가 필터 조건을 모두 만족하는지 평가합니다.
pub(crate) fn matches(document: &Document, filter: &Document) -> AppResult<bool> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches(document, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => any_clause(document, key, condition)?,
            "$nor" => !any_clause(document, key, condition)?,
            other if other.starts_with('$') => {
                return Err(AppError::DatabaseError(format!(
                    "unknown top level operator: {}",
                    other
                )));
            }
            path => matches_field(lookup(document, path), condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn clauses<'a>(operator: &str, condition: &'a Bson) -> AppResult<Vec<&'a Document>> {
    let Bson::Array(items) = condition else {
        return Err(AppError::DatabaseError(format!(
            "{} must be an array",
            operator
        )));
    };
    if items.is_empty() {
        return Err(AppError::DatabaseError(format!(
            "{} must be a nonempty array",
            operator
        )));
    }

    items
        .iter()
        .map(|item| match item {
            Bson::Document(clause) => Ok(clause),
            _ => Err(AppError::DatabaseError(format!(
                "{} argument's entries must be objects",
                operator
            ))),
        })
        .collect()
}

fn any_clause(document: &Document, operator: &str, condition: &Bson) -> AppResult<bool> {
    for clause in clauses(operator, condition)? {
        if matches(document, clause)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// 단일 필드 값에 대한 조건 평가. 값이 없으면 `None`입니다.
pub(crate) fn matches_field(value: Option<&Bson>, condition: &Bson) -> AppResult<bool> {
    match condition {
        Bson::Document(operators) if is_operator_document(operators) => {
            for (operator, operand) in operators {
                if operator == "$options" {
                    continue;
                }
                if !apply_operator(value, operator, operand, operators)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Bson::RegularExpression(regex) => regex_matches(value, &regex.pattern, &regex.options),
        expected => Ok(equals(value, expected)),
    }
}

fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => matches!(expected, Bson::Null),
        Some(actual) => match actual {
            Bson::Array(items) => {
                values_equal(actual, expected)
                    || items.iter().any(|item| values_equal(item, expected))
            }
            _ => values_equal(actual, expected),
        },
    }
}

fn apply_operator(
    value: Option<&Bson>,
    operator: &str,
    operand: &Bson,
    operators: &Document,
) -> AppResult<bool> {
    match operator {
        "$eq" => Ok(equals(value, operand)),
        "$ne" => Ok(!equals(value, operand)),
        "$gt" => Ok(compare_with(value, operand, |o| o == Ordering::Greater)),
        "$gte" => Ok(compare_with(value, operand, |o| o != Ordering::Less)),
        "$lt" => Ok(compare_with(value, operand, |o| o == Ordering::Less)),
        "$lte" => Ok(compare_with(value, operand, |o| o != Ordering::Greater)),
        "$in" => Ok(candidates(operator, operand)?
            .iter()
            .any(|candidate| equals(value, candidate))),
        "$nin" => Ok(!candidates(operator, operand)?
            .iter()
            .any(|candidate| equals(value, candidate))),
        "$exists" => Ok(value.is_some() == is_truthy(operand)),
        "$regex" => {
            let options = operators.get_str("$options").unwrap_or("");
            match operand {
                Bson::String(pattern) => regex_matches(value, pattern, options),
                Bson::RegularExpression(regex) => {
                    let merged = format!("{}{}", regex.options, options);
                    regex_matches(value, &regex.pattern, &merged)
                }
                _ => Err(AppError::DatabaseError("$regex has to be a string".to_string())),
            }
        }
        "$not" => Ok(!matches_field(value, operand)?),
        "$size" => {
            let expected = as_f64(operand).ok_or_else(|| {
                AppError::DatabaseError("$size needs a number".to_string())
            })?;
            Ok(matches!(value, Some(Bson::Array(items)) if items.len() as f64 == expected))
        }
        other => Err(AppError::DatabaseError(format!("unknown operator: {}", other))),
    }
}

fn candidates<'a>(operator: &str, operand: &'a Bson) -> AppResult<&'a Vec<Bson>> {
    match operand {
        Bson::Array(items) => Ok(items),
        _ => Err(AppError::DatabaseError(format!("{} needs an array", operator))),
    }
}

fn compare_with(value: Option<&Bson>, operand: &Bson, accept: fn(Ordering) -> bool) -> bool {
    match value {
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| compare(item, operand).is_some_and(accept)),
        Some(actual) => compare(actual, operand).is_some_and(accept),
        None => false,
    }
}

fn regex_matches(value: Option<&Bson>, pattern: &str, options: &str) -> AppResult<bool> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .build()
        .map_err(|e| AppError::DatabaseError(format!("invalid regex '{}': {}", pattern, e)))?;

    Ok(match value {
        Some(Bson::String(text)) => regex.is_match(text),
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(text) if regex.is_match(text))),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{DateTime, doc, oid::ObjectId};

    fn brand() -> Document {
        doc! {
            "_id": ObjectId::new(),
            "name": "Acme Tools",
            "slug": "acme-tools",
            "stock": 7_i32,
            "price": 12.5,
            "brands": ["a", "b"],
            "meta": { "origin": "KR" },
        }
    }

    #[test]
    fn test_equality_and_array_membership() {
        let document = brand();

        assert!(matches(&document, &doc! { "name": "Acme Tools" }).unwrap());
        assert!(matches(&document, &doc! { "brands": "b" }).unwrap());
        assert!(matches(&document, &doc! { "stock": 7_i64 }).unwrap());
        assert!(matches(&document, &doc! { "meta.origin": "KR" }).unwrap());
        assert!(!matches(&document, &doc! { "name": "Other" }).unwrap());
    }

    #[test]
    fn test_exists_operator() {
        let document = brand();

        assert!(matches(&document, &doc! { "freezedAt": { "$exists": false } }).unwrap());
        assert!(!matches(&document, &doc! { "freezedAt": { "$exists": true } }).unwrap());
        assert!(matches(&document, &doc! { "slug": { "$exists": 1 } }).unwrap());
    }

    #[test]
    fn test_missing_field_equals_null() {
        let document = brand();

        assert!(matches(&document, &doc! { "slogan": Bson::Null }).unwrap());
    }

    #[test]
    fn test_range_and_set_operators() {
        let document = brand();

        assert!(matches(&document, &doc! { "stock": { "$gt": 5, "$lte": 7 } }).unwrap());
        assert!(!matches(&document, &doc! { "price": { "$lt": 10 } }).unwrap());
        assert!(matches(&document, &doc! { "slug": { "$in": ["x", "acme-tools"] } }).unwrap());
        assert!(matches(&document, &doc! { "slug": { "$nin": ["x"] } }).unwrap());
        assert!(matches(&document, &doc! { "slug": { "$ne": "x" } }).unwrap());
    }

    #[test]
    fn test_date_comparison() {
        let past = DateTime::from_millis(1_000);
        let document = doc! { "expiredAt": DateTime::from_millis(5_000) };

        assert!(matches(&document, &doc! { "expiredAt": { "$gt": past } }).unwrap());
    }

    #[test]
    fn test_logical_operators() {
        let document = brand();

        let filter = doc! {
            "$or": [
                { "name": { "$regex": "zzz", "$options": "i" } },
                { "slug": { "$regex": "ACME", "$options": "i" } },
            ]
        };
        assert!(matches(&document, &filter).unwrap());

        let filter = doc! { "$and": [ { "stock": 7 }, { "freezedAt": { "$exists": true } } ] };
        assert!(!matches(&document, &filter).unwrap());

        let filter = doc! { "$nor": [ { "stock": 8 } ] };
        assert!(matches(&document, &filter).unwrap());
    }

    #[test]
    fn test_regex_is_case_sensitive_without_option() {
        let document = brand();

        assert!(!matches(&document, &doc! { "name": { "$regex": "acme" } }).unwrap());
    }

    #[test]
    fn test_unknown_operator_is_an_error() {
        let document = brand();

        let result = matches(&document, &doc! { "name": { "$near": 1 } });
        assert!(matches!(result, Err(AppError::DatabaseError(_))));

        let result = matches(&document, &doc! { "$where": "true" });
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }
}
