//! 조회 결과 형태
//!
//! 리포지토리 조회 메서드는 결과 타입 `P: Projection<E>`로 형태를 고릅니다.
//!
//! - [`Lean`]: 저장소 문서를 그대로 담은 BSON 문서. select로 일부 필드만 가져올 때 사용합니다.
//! - [`Hydrated<E>`]: 타입이 있는 엔티티와 로드 시점 스냅샷. 필드를 고친 뒤
//!   [`DatabaseRepository::save`](super::DatabaseRepository::save)로 저장할 수 있습니다.

use std::ops::{Deref, DerefMut};

use mongodb::bson::{self, Bson, Document, oid::ObjectId};
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::entities::Entity;
use crate::errors::{AppError, AppResult};

pub const ID_KEY: &str = "_id";
pub const VERSION_KEY: &str = "__v";

/// 저장소 문서를 결과 타입으로 변환
pub trait Projection<E: Entity>: Sized + Send {
    fn project(document: Document) -> AppResult<Self>;
}

/// 가공하지 않은 문서
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lean(pub Document);

impl Lean {
    pub fn into_inner(self) -> Document {
        self.0
    }
}

impl Deref for Lean {
    type Target = Document;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Lean {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<E: Entity> Projection<E> for Lean {
    fn project(document: Document) -> AppResult<Self> {
        Ok(Lean(document))
    }
}

/// 저장 가능한 엔티티 인스턴스
///
/// `snapshot`은 마지막으로 저장소와 동기화된 시점의 직렬화 결과이며,
/// 저장 시 현재 값과 비교해 변경된 필드만 기록합니다.
#[derive(Debug, Clone)]
pub struct Hydrated<E> {
    entity: E,
    snapshot: Document,
}

impl<E: Entity> Hydrated<E> {
    pub fn from_document(document: Document) -> AppResult<Self> {
        let entity: E = bson::from_document(document).map_err(|e| {
            AppError::DatabaseError(format!("{} 문서 변환 실패: {}", E::MODEL_NAME, e))
        })?;
        let snapshot = encode(&entity)?;

        Ok(Self { entity, snapshot })
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.entity.id()
    }

    /// 마지막 동기화 시점의 `__v`
    pub fn version(&self) -> i64 {
        match self.snapshot.get(VERSION_KEY) {
            Some(Bson::Int32(v)) => i64::from(*v),
            Some(Bson::Int64(v)) => *v,
            Some(Bson::Double(v)) => *v as i64,
            _ => 0,
        }
    }

    pub fn snapshot(&self) -> &Document {
        &self.snapshot
    }

    /// 현재 엔티티 값을 직렬화합니다.
    pub fn to_document(&self) -> AppResult<Document> {
        encode(&self.entity)
    }

    pub fn is_modified(&self) -> AppResult<bool> {
        let current = self.to_document()?;
        Ok(current
            .iter()
            .chain(self.snapshot.iter())
            .any(|(key, _)| {
                key != VERSION_KEY && current.get(key.as_str()) != self.snapshot.get(key.as_str())
            }))
    }

    /// 저장 직후의 문서로 엔티티와 스냅샷을 교체합니다.
    pub(crate) fn refresh(&mut self, document: Document) -> AppResult<()> {
        *self = Self::from_document(document)?;
        Ok(())
    }

    pub fn into_inner(self) -> E {
        self.entity
    }
}

impl<E> Deref for Hydrated<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.entity
    }
}

impl<E> DerefMut for Hydrated<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entity
    }
}

impl<E: Serialize> Serialize for Hydrated<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entity.serialize(serializer)
    }
}

impl<E: Entity> Projection<E> for Hydrated<E> {
    fn project(document: Document) -> AppResult<Self> {
        Self::from_document(document)
    }
}

pub(crate) fn encode<E: Entity>(entity: &E) -> AppResult<Document> {
    bson::to_document(entity)
        .map_err(|e| AppError::InternalError(format!("{} 문서 직렬화 실패: {}", E::MODEL_NAME, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Brand;
    use mongodb::bson::doc;

    fn stored_brand() -> Document {
        doc! {
            "_id": ObjectId::new(),
            "name": "Acme",
            "slug": "acme",
            "image": "brands/acme.png",
            "createdBy": ObjectId::new(),
            "__v": 3,
        }
    }

    #[test]
    fn test_hydrated_tracks_modifications() {
        let mut brand = Hydrated::<Brand>::from_document(stored_brand()).unwrap();

        assert_eq!(brand.version(), 3);
        assert!(!brand.is_modified().unwrap());

        brand.slogan = Some("Just do it".to_string());
        assert!(brand.is_modified().unwrap());
    }

    #[test]
    fn test_hydrated_serializes_as_entity() {
        let brand = Hydrated::<Brand>::from_document(stored_brand()).unwrap();

        let value = serde_json::to_value(&brand).unwrap();

        assert_eq!(value["name"], "Acme");
        assert!(value.get("snapshot").is_none());
    }

    #[test]
    fn test_partial_document_fails_to_hydrate() {
        let result = Hydrated::<Brand>::from_document(doc! { "name": "Acme" });

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[test]
    fn test_lean_keeps_raw_document() {
        let lean = <Lean as Projection<Brand>>::project(doc! { "name": "Acme" }).unwrap();

        assert_eq!(lean.get_str("name").unwrap(), "Acme");
    }
}
