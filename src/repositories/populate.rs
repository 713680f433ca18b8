//! 관계 경로 채우기 (populate)
//!
//! 조회 결과 문서의 관계 필드를 대상 컬렉션의 문서로 바꿉니다. 읽기 전용이며,
//! 대상 엔티티의 조회 훅이 그대로 적용되므로 보관된 대상은 기본적으로 채워지지 않습니다.

use std::collections::HashSet;

use log::debug;
use mongodb::bson::{Bson, Document, doc};

use crate::db::{DocumentStore, FindOptions};
use crate::domain::entities::Entity;
use crate::errors::AppResult;

use super::hooks::{HookPipeline, Operation};
use super::projection::ID_KEY;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Relation {
    /// 경로에 대상 문서의 `_id` (또는 `_id` 배열)가 저장된 관계
    Reference,
    /// 대상 문서의 `foreign_field`가 이 문서의 `local_field`를 가리키는 관계
    Virtual {
        local_field: String,
        foreign_field: String,
    },
}

/// 채울 관계 경로 정의
#[derive(Debug, Clone)]
pub struct PopulateOptions {
    path: String,
    relation: Relation,
    collection: &'static str,
    hooks: HookPipeline,
    match_filter: Option<Document>,
    select: Option<Document>,
}

impl PopulateOptions {
    pub fn reference<T: Entity>(path: impl Into<String>) -> Self {
        Self::build::<T>(path.into(), Relation::Reference)
    }

    pub fn virtual_field<T: Entity>(
        path: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        Self::build::<T>(
            path.into(),
            Relation::Virtual {
                local_field: local_field.into(),
                foreign_field: foreign_field.into(),
            },
        )
    }

    fn build<T: Entity>(path: String, relation: Relation) -> Self {
        Self {
            path,
            relation,
            collection: T::COLLECTION,
            hooks: T::hooks(),
            match_filter: None,
            select: None,
        }
    }

    /// 대상 문서에 추가로 적용할 조건. `paranoId: false`로 보관 문서도 포함할 수 있습니다.
    pub fn with_match(mut self, filter: Document) -> Self {
        self.match_filter = Some(filter);
        self
    }

    pub fn with_select(mut self, select: Document) -> Self {
        self.select = Some(select);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 대상 컬렉션 조회 필터: 훅을 거친 match 조건과 키 조건을 함께 만족시킵니다.
    fn target_filter(&self, key_field: &str, keys: Vec<Bson>) -> Document {
        let (mut filter, _) = self
            .hooks
            .prepare_filter(Operation::Find, self.match_filter.clone().unwrap_or_default());
        let key_condition = doc! { "$in": keys };

        if filter.contains_key(key_field) {
            filter = doc! { "$and": [filter, { key_field: key_condition }] };
        } else {
            filter.insert(key_field, key_condition);
        }
        filter
    }

    fn target_projection(&self, key_field: &str) -> Option<Document> {
        let mut select = self.select.clone()?;
        if is_inclusive(&select) {
            select.insert(key_field, 1);
        } else {
            select.remove(key_field);
        }
        Some(select)
    }

    async fn fetch<S: DocumentStore>(
        &self,
        store: &S,
        key_field: &str,
        keys: Vec<Bson>,
    ) -> AppResult<Vec<Document>> {
        let filter = self.target_filter(key_field, keys);
        debug!("populate {} from {} filter={}", self.path, self.collection, filter);

        store
            .find(
                self.collection,
                filter,
                FindOptions {
                    projection: self.target_projection(key_field),
                    ..Default::default()
                },
            )
            .await
    }
}

/// 문서들의 관계 경로를 순서대로 채웁니다.
pub(crate) async fn populate<S: DocumentStore>(
    store: &S,
    documents: &mut [Document],
    options: &[PopulateOptions],
) -> AppResult<()> {
    if documents.is_empty() {
        return Ok(());
    }

    for option in options {
        match &option.relation {
            Relation::Reference => populate_reference(store, documents, option).await?,
            Relation::Virtual {
                local_field,
                foreign_field,
            } => populate_virtual(store, documents, option, local_field, foreign_field).await?,
        }
    }

    Ok(())
}

async fn populate_reference<S: DocumentStore>(
    store: &S,
    documents: &mut [Document],
    option: &PopulateOptions,
) -> AppResult<()> {
    let mut keys = Vec::new();
    let mut seen = HashSet::new();
    for document in documents.iter() {
        let ids: Vec<&Bson> = match document.get(&option.path) {
            Some(Bson::Array(values)) => values.iter().collect(),
            Some(value) => vec![value],
            None => Vec::new(),
        };
        for id in ids {
            if let Bson::ObjectId(oid) = id {
                if seen.insert(*oid) {
                    keys.push(id.clone());
                }
            }
        }
    }

    if keys.is_empty() {
        return Ok(());
    }

    let targets = option.fetch(store, ID_KEY, keys).await?;
    let find_target = |id: &Bson| {
        targets
            .iter()
            .find(|target| target.get(ID_KEY) == Some(id))
            .cloned()
    };

    for document in documents.iter_mut() {
        let populated = match document.get(&option.path) {
            Some(Bson::Array(values)) => Bson::Array(
                values
                    .iter()
                    .filter_map(|id| find_target(id).map(Bson::Document))
                    .collect(),
            ),
            Some(id) if matches!(id, Bson::ObjectId(_)) => {
                find_target(id).map(Bson::Document).unwrap_or(Bson::Null)
            }
            _ => continue,
        };
        document.insert(option.path.clone(), populated);
    }

    Ok(())
}

async fn populate_virtual<S: DocumentStore>(
    store: &S,
    documents: &mut [Document],
    option: &PopulateOptions,
    local_field: &str,
    foreign_field: &str,
) -> AppResult<()> {
    let mut keys: Vec<Bson> = Vec::new();
    for document in documents.iter() {
        if let Some(value) = document.get(local_field) {
            if !keys.contains(value) {
                keys.push(value.clone());
            }
        }
    }

    let targets = if keys.is_empty() {
        Vec::new()
    } else {
        option.fetch(store, foreign_field, keys).await?
    };

    for document in documents.iter_mut() {
        let local = document.get(local_field).cloned();
        let related: Vec<Bson> = targets
            .iter()
            .filter(|target| local.is_some() && target.get(foreign_field) == local.as_ref())
            .cloned()
            .map(Bson::Document)
            .collect();
        document.insert(option.path.clone(), related);
    }

    Ok(())
}

fn is_inclusive(select: &Document) -> bool {
    select
        .iter()
        .filter(|(key, _)| key.as_str() != ID_KEY)
        .any(|(_, value)| match value {
            Bson::Boolean(flag) => *flag,
            Bson::Int32(v) => *v != 0,
            Bson::Int64(v) => *v != 0,
            Bson::Double(v) => *v != 0.0,
            _ => true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::domain::entities::{Brand, Otp};
    use mongodb::bson::{DateTime, oid::ObjectId};

    async fn seed(store: &MemoryStore, collection: &str, documents: Vec<Document>) {
        store
            .insert_many(collection, documents, Default::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reference_array_skips_archived_targets() {
        let store = MemoryStore::new();
        let active = ObjectId::new();
        let archived = ObjectId::new();
        seed(
            &store,
            "brands",
            vec![
                doc! { "_id": active, "name": "Active" },
                doc! { "_id": archived, "name": "Old", "freezedAt": DateTime::now() },
            ],
        )
        .await;

        let mut documents = vec![doc! { "name": "Shoes", "brands": [active, archived] }];
        populate(&store, &mut documents, &[PopulateOptions::reference::<Brand>("brands")])
            .await
            .unwrap();

        let brands = documents[0].get_array("brands").unwrap();
        assert_eq!(brands.len(), 1);
        assert_eq!(brands[0].as_document().unwrap().get_str("name").unwrap(), "Active");
    }

    #[tokio::test]
    async fn test_reference_bypass_includes_archived() {
        let store = MemoryStore::new();
        let archived = ObjectId::new();
        seed(
            &store,
            "brands",
            vec![doc! { "_id": archived, "name": "Old", "freezedAt": DateTime::now() }],
        )
        .await;

        let mut documents = vec![doc! { "brands": archived }];
        let option = PopulateOptions::reference::<Brand>("brands")
            .with_match(doc! { "paranoId": false })
            .with_select(doc! { "name": 1 });
        populate(&store, &mut documents, &[option]).await.unwrap();

        let brand = documents[0].get_document("brands").unwrap();
        assert_eq!(brand.get_str("name").unwrap(), "Old");
        assert!(!brand.contains_key("freezedAt"));
    }

    #[tokio::test]
    async fn test_missing_single_reference_becomes_null() {
        let store = MemoryStore::new();
        let mut documents = vec![doc! { "brands": ObjectId::new() }];

        populate(&store, &mut documents, &[PopulateOptions::reference::<Brand>("brands")])
            .await
            .unwrap();

        assert_eq!(documents[0].get("brands"), Some(&Bson::Null));
    }

    #[tokio::test]
    async fn test_virtual_groups_by_foreign_field() {
        let store = MemoryStore::new();
        let user_a = ObjectId::new();
        let user_b = ObjectId::new();
        seed(
            &store,
            "otps",
            vec![
                doc! { "code": "1", "type": "ConfirmEmail", "createdBy": user_a },
                doc! { "code": "2", "type": "ResetPassword", "createdBy": user_a },
                doc! { "code": "3", "type": "ConfirmEmail", "createdBy": user_b },
            ],
        )
        .await;

        let mut documents = vec![doc! { "_id": user_a }, doc! { "_id": user_b }];
        let option = PopulateOptions::virtual_field::<Otp>("otp", "_id", "createdBy")
            .with_match(doc! { "type": "ConfirmEmail" })
            .with_select(doc! { "code": 1 });
        populate(&store, &mut documents, &[option]).await.unwrap();

        let first = documents[0].get_array("otp").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].as_document().unwrap().get_str("code").unwrap(), "1");
        assert_eq!(documents[1].get_array("otp").unwrap().len(), 1);
    }
}
