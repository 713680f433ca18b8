//! # 카테고리 서비스 구현
//!
//! 브랜드 서비스와 같은 생명주기를 따르며, 다음이 추가됩니다.
//!
//! - 소속 브랜드 검증: 중복을 제거한 식별자가 모두 활성 브랜드여야 합니다.
//! - 자산 폴더: 카테고리마다 UUID v4 폴더(`category/{assetFolderId}`)를 가집니다.
//! - 브랜드 목록 수정: 파이프라인 업데이트에서 `$setDifference`로 빼고 `$setUnion`으로 더합니다.

use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use uuid::Uuid;
use validator::Validate;

use super::{archived_by_id, duplicated, not_found, scope_archive};
use crate::db::{DocumentStore, MongoStore, Update};
use crate::domain::dto::catalog::{CreateCategoryRequest, FindAllQuery, UpdateCategoryRequest};
use crate::domain::dto::parse_unique_object_ids;
use crate::domain::entities::Category;
use crate::errors::{AppError, AppResult};
use crate::repositories::{
    BrandRepository, CategoryRepository, CreateArgs, DeleteArgs, FindOneAndUpdateArgs,
    FindOneArgs, FreezeArgs, Hydrated, Lean, PaginateArgs, Paginated, RestoreArgs,
};
use crate::services::storage::{AssetFolder, AssetStorage, UploadFile};

const MODEL: &str = "Category";

const SEARCH_FIELDS: [&str; 3] = ["name", "slug", "description"];

/// 카테고리 비즈니스 로직 서비스
pub struct CategoryService<S: DocumentStore = MongoStore> {
    categories: CategoryRepository<S>,
    brands: BrandRepository<S>,
    storage: Arc<dyn AssetStorage>,
}

impl<S: DocumentStore> CategoryService<S> {
    pub fn new(
        categories: CategoryRepository<S>,
        brands: BrandRepository<S>,
        storage: Arc<dyn AssetStorage>,
    ) -> Self {
        Self {
            categories,
            brands,
            storage,
        }
    }

    /// 새 카테고리 생성
    ///
    /// 이미지는 새로 만든 자산 폴더 아래에 올라가며, 생성이 실패하면 지워집니다.
    pub async fn create(
        &self,
        request: CreateCategoryRequest,
        file: &UploadFile,
        user: ObjectId,
    ) -> AppResult<Hydrated<Category>> {
        request.validate()?;

        let existing = self
            .categories
            .find_one::<Hydrated<Category>>(FindOneArgs::new(doc! {
                "name": request.name.as_str(),
                "paranoId": false,
            }))
            .await?;
        if let Some(category) = existing {
            return Err(duplicated(MODEL, category.is_archived()));
        }

        let brand_ids = parse_unique_object_ids(request.brands.as_deref().unwrap_or_default())?;
        self.ensure_brands_exist(&brand_ids).await?;

        let asset_folder_id = Uuid::new_v4().to_string();
        let folder = format!("{}/{}", AssetFolder::Category.as_str(), asset_folder_id);
        let image = self.storage.upload(file, &folder).await?;

        let category = Category::new(request.name, image.as_str(), asset_folder_id, user)
            .with_description(request.description)
            .with_brands(brand_ids);

        let created = match self.categories.create(CreateArgs::one(category)).await {
            Ok(mut created) => created.pop(),
            Err(e) => {
                self.discard(&image).await;
                return Err(e);
            }
        };

        match created {
            Some(category) => {
                info!("카테고리 생성: {} ({})", category.name, image);
                Ok(category)
            }
            None => {
                self.discard(&image).await;
                Err(AppError::BadRequestError(
                    "Fail To Create This Category Resource".to_string(),
                ))
            }
        }
    }

    /// 카테고리 수정
    ///
    /// 파이프라인 업데이트 하나로 일반 필드를 덮어쓰고 브랜드 목록을 합칩니다.
    /// 값은 모두 `$literal`로 감싸 표현식으로 해석되지 않게 합니다.
    /// 파이프라인 업데이트는 슬러그 훅을 거치지 않으므로 이름을 바꿔도 슬러그는 그대로입니다.
    pub async fn update(
        &self,
        category_id: ObjectId,
        request: UpdateCategoryRequest,
        user: ObjectId,
    ) -> AppResult<Hydrated<Category>> {
        request.validate()?;

        if let Some(name) = &request.name {
            if self.categories.exists(doc! { "name": name.as_str() }).await? {
                return Err(duplicated(MODEL, false));
            }
        }

        let added = parse_unique_object_ids(request.brands.as_deref().unwrap_or_default())?;
        self.ensure_brands_exist(&added).await?;
        let removed = parse_unique_object_ids(request.remove_brands.as_deref().unwrap_or_default())?;

        let mut set = Document::new();
        for (key, value) in request.scalar_fields() {
            set.insert(key, doc! { "$literal": value });
        }
        set.insert("updatedBy", user);
        set.insert(
            "brands",
            doc! {
                "$setUnion": [
                    { "$setDifference": ["$brands", object_ids(&removed)] },
                    object_ids(&added),
                ]
            },
        );

        self.categories
            .find_one_and_update(FindOneAndUpdateArgs {
                filter: doc! { "_id": category_id },
                update: Update::Pipeline(vec![doc! { "$set": set }]),
                ..Default::default()
            })
            .await?
            .ok_or_else(|| not_found(MODEL))
    }

    /// 카테고리 이미지 교체. 수정 후 문서를 돌려줍니다.
    pub async fn update_attachment(
        &self,
        category_id: ObjectId,
        file: &UploadFile,
        user: ObjectId,
    ) -> AppResult<Hydrated<Category>> {
        let category = self.find_one(category_id, false).await?;

        let folder = format!("{}/{}", AssetFolder::Category.as_str(), category.asset_folder_id);
        let image = self.storage.upload(file, &folder).await?;

        let updated = self
            .categories
            .find_one_and_update::<Hydrated<Category>>(FindOneAndUpdateArgs {
                filter: doc! { "_id": category_id },
                update: doc! { "image": image.as_str(), "updatedBy": user }.into(),
                ..Default::default()
            })
            .await;

        let updated = match updated {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.discard(&image).await;
                return Err(not_found(MODEL));
            }
            Err(e) => {
                self.discard(&image).await;
                return Err(e);
            }
        };

        self.storage.delete(&category.image).await?;
        Ok(updated)
    }

    pub async fn freeze(&self, category_id: ObjectId, user: ObjectId) -> AppResult<()> {
        self.categories
            .freeze::<Lean>(FreezeArgs {
                filter: doc! { "_id": category_id },
                updated_by: user,
            })
            .await?
            .ok_or_else(|| not_found(MODEL))?;

        info!("카테고리 보관: {}", category_id);
        Ok(())
    }

    /// 보관된 카테고리 복원. 수정 전(보관 상태) 문서를 돌려줍니다.
    pub async fn restore(
        &self,
        category_id: ObjectId,
        user: ObjectId,
    ) -> AppResult<Hydrated<Category>> {
        let category = self
            .categories
            .restore::<Hydrated<Category>>(RestoreArgs {
                filter: doc! { "_id": category_id },
                updated_by: user,
            })
            .await?
            .ok_or_else(|| not_found(MODEL))?;

        info!("카테고리 복원: {}", category_id);
        Ok(category)
    }

    /// 보관된 카테고리를 영구 삭제하고 이미지를 지웁니다.
    pub async fn remove(&self, category_id: ObjectId) -> AppResult<()> {
        let category = self
            .categories
            .find_one_and_delete::<Hydrated<Category>>(DeleteArgs {
                filter: archived_by_id(category_id),
            })
            .await?
            .ok_or_else(|| not_found(MODEL))?;

        self.storage.delete(&category.image).await?;
        info!("카테고리 삭제: {} ({})", category_id, category.image);
        Ok(())
    }

    pub async fn find_all(
        &self,
        query: FindAllQuery,
        archive: bool,
    ) -> AppResult<Paginated<Hydrated<Category>>> {
        query.validate()?;

        self.categories
            .paginate(PaginateArgs {
                filter: scope_archive(query.search_filter(&SEARCH_FIELDS), archive),
                page: query.page(),
                size: query.size,
                ..Default::default()
            })
            .await
    }

    pub async fn find_one(
        &self,
        category_id: ObjectId,
        archive: bool,
    ) -> AppResult<Hydrated<Category>> {
        self.categories
            .find_one(FindOneArgs::new(scope_archive(doc! { "_id": category_id }, archive)))
            .await?
            .ok_or_else(|| not_found(MODEL))
    }

    /// 식별자가 모두 활성 브랜드를 가리키는지 확인합니다.
    async fn ensure_brands_exist(&self, brand_ids: &[ObjectId]) -> AppResult<()> {
        if brand_ids.is_empty() {
            return Ok(());
        }

        let found = self
            .brands
            .count(doc! { "_id": { "$in": object_ids(brand_ids) } })
            .await?;
        if found != brand_ids.len() as u64 {
            return Err(AppError::NotFound(
                "Some of the mentioned brands do not exist".to_string(),
            ));
        }
        Ok(())
    }

    async fn discard(&self, image: &str) {
        if let Err(e) = self.storage.delete(image).await {
            warn!("업로드 이미지 정리 실패 ({}): {}", image, e);
        }
    }
}

fn object_ids(ids: &[ObjectId]) -> Vec<Bson> {
    ids.iter().map(|id| Bson::ObjectId(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::domain::entities::Brand;
    use crate::services::storage::LocalAssetStorage;

    struct Fixture {
        service: CategoryService<MemoryStore>,
        brands: BrandRepository<MemoryStore>,
        dir: tempfile::TempDir,
        user: ObjectId,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            MemoryStore::new()
                .with_unique_index("categories", "name")
                .with_unique_index("brands", "name"),
        );
        let storage: Arc<dyn AssetStorage> = Arc::new(LocalAssetStorage::new(dir.path()));
        let brands = BrandRepository::new(Arc::clone(&store));
        let service = CategoryService::new(
            CategoryRepository::new(Arc::clone(&store)),
            brands.clone(),
            storage,
        );

        Fixture {
            service,
            brands,
            dir,
            user: ObjectId::new(),
        }
    }

    async fn brand(fx: &Fixture, name: &str) -> ObjectId {
        let created = fx
            .brands
            .create(CreateArgs::one(Brand::new(name, "brand/x.png", fx.user)))
            .await
            .unwrap();
        created[0].id.unwrap()
    }

    fn image() -> UploadFile {
        UploadFile::new("cover.png", b"cover".to_vec())
    }

    fn request(name: &str, brands: &[ObjectId]) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            description: Some("Things to wear".to_string()),
            brands: Some(brands.iter().map(|id| id.to_hex()).collect()),
        }
    }

    #[tokio::test]
    async fn test_create_stores_image_in_asset_folder() {
        let fx = fixture();
        let acme = brand(&fx, "Acme").await;

        let category = fx
            .service
            .create(request("Shoes", &[acme, acme]), &image(), fx.user)
            .await
            .unwrap();

        assert_eq!(category.brand_ids(), vec![acme]);
        assert!(Uuid::parse_str(&category.asset_folder_id).is_ok());
        assert!(category
            .image
            .starts_with(&format!("category/{}/", category.asset_folder_id)));
        assert!(fx.dir.path().join(&category.image).exists());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_or_archived_brands() {
        let fx = fixture();
        let acme = brand(&fx, "Acme").await;

        let unknown = fx
            .service
            .create(request("Shoes", &[acme, ObjectId::new()]), &image(), fx.user)
            .await;
        assert!(matches!(unknown, Err(AppError::NotFound(ref m)) if m == "Some of the mentioned brands do not exist"));

        fx.brands
            .freeze::<Lean>(FreezeArgs {
                filter: doc! { "_id": acme },
                updated_by: fx.user,
            })
            .await
            .unwrap();
        let archived = fx
            .service
            .create(request("Shoes", &[acme]), &image(), fx.user)
            .await;
        assert!(matches!(archived, Err(AppError::NotFound(_))));
        assert!(!fx.dir.path().join("category").exists());
    }

    #[tokio::test]
    async fn test_update_merges_brands_and_keeps_slug() {
        let fx = fixture();
        let acme = brand(&fx, "Acme").await;
        let globex = brand(&fx, "Globex").await;
        let initech = brand(&fx, "Initech").await;
        let category = fx
            .service
            .create(request("Shoes", &[acme, globex]), &image(), fx.user)
            .await
            .unwrap();

        let updated = fx
            .service
            .update(
                category.id.unwrap(),
                UpdateCategoryRequest {
                    name: Some("Sneakers & Boots".to_string()),
                    brands: Some(vec![initech.to_hex(), acme.to_hex()]),
                    remove_brands: Some(vec![globex.to_hex()]),
                    ..Default::default()
                },
                fx.user,
            )
            .await
            .unwrap();

        let mut ids = updated.brand_ids();
        ids.sort();
        let mut expected = vec![acme, initech];
        expected.sort();
        assert_eq!(ids, expected);
        assert_eq!(updated.name, "Sneakers & Boots");
        assert_eq!(updated.slug.as_deref(), Some("shoes"));
        assert_eq!(updated.version, 1);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_keeps_literal_values() {
        let fx = fixture();
        let category = fx
            .service
            .create(request("Shoes", &[]), &image(), fx.user)
            .await
            .unwrap();

        let updated = fx
            .service
            .update(
                category.id.unwrap(),
                UpdateCategoryRequest {
                    description: Some("$name".to_string()),
                    ..Default::default()
                },
                fx.user,
            )
            .await
            .unwrap();

        assert_eq!(updated.description.as_deref(), Some("$name"));
        assert_eq!(updated.slug.as_deref(), Some("shoes"));
    }

    #[tokio::test]
    async fn test_update_attachment_keeps_folder() {
        let fx = fixture();
        let category = fx
            .service
            .create(request("Shoes", &[]), &image(), fx.user)
            .await
            .unwrap();

        let updated = fx
            .service
            .update_attachment(
                category.id.unwrap(),
                &UploadFile::new("next.png", b"next".to_vec()),
                fx.user,
            )
            .await
            .unwrap();

        assert!(updated
            .image
            .starts_with(&format!("category/{}/", category.asset_folder_id)));
        assert!(fx.dir.path().join(&updated.image).exists());
        assert!(!fx.dir.path().join(&category.image).exists());
    }

    #[tokio::test]
    async fn test_remove_requires_archive() {
        let fx = fixture();
        let category = fx
            .service
            .create(request("Shoes", &[]), &image(), fx.user)
            .await
            .unwrap();
        let id = category.id.unwrap();

        assert!(matches!(fx.service.remove(id).await, Err(AppError::NotFound(_))));

        fx.service.freeze(id, fx.user).await.unwrap();
        fx.service.remove(id).await.unwrap();

        assert!(matches!(fx.service.find_one(id, true).await, Err(AppError::NotFound(_))));
        assert!(!fx.dir.path().join(&category.image).exists());
    }

    #[tokio::test]
    async fn test_find_all_searches_description() {
        let fx = fixture();
        fx.service
            .create(request("Shoes", &[]), &image(), fx.user)
            .await
            .unwrap();
        fx.service
            .create(
                CreateCategoryRequest {
                    name: "Books".to_string(),
                    ..Default::default()
                },
                &image(),
                fx.user,
            )
            .await
            .unwrap();

        let found = fx
            .service
            .find_all(
                FindAllQuery {
                    search: Some("wear".to_string()),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();

        assert_eq!(found.result.len(), 1);
        assert_eq!(found.result[0].name, "Shoes");
    }
}
