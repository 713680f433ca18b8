//! 다른 컬렉션 문서에 대한 참조
//!
//! 저장소에는 항상 `ObjectId`로 기록되며, populate로 조회하면
//! 같은 자리에 대상 문서 전체가 들어옵니다. [`Reference`]는 두 형태를 모두 읽고,
//! 쓸 때는 항상 식별자만 기록합니다.

use std::fmt;

use mongodb::bson::{Bson, from_document, oid::ObjectId};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::Entity;

/// 식별자 또는 populate된 대상 문서
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<T> {
    Id(ObjectId),
    Populated(Box<T>),
}

impl<T: Entity> Reference<T> {
    /// 참조 대상의 식별자. populate된 문서에 `_id`가 없으면 `None`입니다.
    pub fn id(&self) -> Option<ObjectId> {
        match self {
            Reference::Id(id) => Some(*id),
            Reference::Populated(entity) => entity.id(),
        }
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Reference::Id(_) => None,
            Reference::Populated(entity) => Some(entity),
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Reference::Populated(_))
    }
}

impl<T> From<ObjectId> for Reference<T> {
    fn from(id: ObjectId) -> Self {
        Reference::Id(id)
    }
}

impl<T: Entity> Serialize for Reference<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.id() {
            Some(id) => id.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Entity> Deserialize<'de> for Reference<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Bson::deserialize(deserializer)? {
            Bson::ObjectId(id) => Ok(Reference::Id(id)),
            Bson::String(hex) => ObjectId::parse_str(&hex)
                .map(Reference::Id)
                .map_err(de::Error::custom),
            Bson::Document(document) => from_document::<T>(document)
                .map(|entity| Reference::Populated(Box::new(entity)))
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(UnexpectedReference(other))),
        }
    }
}

struct UnexpectedReference(Bson);

impl fmt::Display for UnexpectedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected an ObjectId or a document, found {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::catalog::Brand;
    use mongodb::bson::{doc, to_bson};

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        brand: Reference<Brand>,
    }

    #[test]
    fn test_reads_plain_id() {
        let id = ObjectId::new();
        let holder: Holder = from_document(doc! { "brand": id }).unwrap();

        assert_eq!(holder.brand.id(), Some(id));
        assert!(!holder.brand.is_populated());
    }

    #[test]
    fn test_reads_populated_document_and_writes_id() {
        let id = ObjectId::new();
        let creator = ObjectId::new();
        let populated = doc! {
            "brand": {
                "_id": id,
                "name": "Acme",
                "image": "brand/acme.png",
                "createdBy": creator,
                "__v": 0,
            }
        };

        let holder: Holder = from_document(populated).unwrap();
        assert_eq!(holder.brand.populated().map(|b| b.name.as_str()), Some("Acme"));

        let written = to_bson(&holder).unwrap();
        assert_eq!(written, Bson::Document(doc! { "brand": id }));
    }

    #[test]
    fn test_rejects_other_values() {
        let result = from_document::<Holder>(doc! { "brand": 42 });
        assert!(result.is_err());
    }
}
