//! # 브랜드 서비스 구현
//!
//! 브랜드의 생성부터 보관, 복원, 영구 삭제까지의 생명주기를 관리합니다.
//!
//! ## 처리 흐름
//!
//! ```text
//! create ──▶ 이름 중복 확인(보관 포함) ──▶ 이미지 업로드 ──▶ 문서 생성
//!                                                  │ 실패
//!                                                  ▼
//!                                            업로드 이미지 삭제
//!
//! freeze ──▶ restore ──▶ freeze ... ──▶ remove (보관 상태에서만) ──▶ 이미지 삭제
//! ```
//!
//! ## 에러 메시지
//!
//! | 상황 | 에러 |
//! |------|------|
//! | 활성 브랜드와 이름 중복 | `ConflictError("Duplicated Brand")` |
//! | 보관된 브랜드와 이름 중복 | `ConflictError("Duplicated With Archived Brand")` |
//! | 대상 없음 | `NotFound("Fail To Find Matching Brand Instance")` |
//! | 생성 결과 없음 | `BadRequestError("Fail To Create This Brand Resource")` |

use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::{doc, oid::ObjectId};
use validator::Validate;

use super::{archived_by_id, duplicated, not_found, scope_archive};
use crate::db::{DocumentStore, MongoStore};
use crate::domain::dto::catalog::{CreateBrandRequest, FindAllQuery, UpdateBrandRequest};
use crate::domain::entities::Brand;
use crate::errors::{AppError, AppResult};
use crate::repositories::{
    BrandRepository, CreateArgs, DeleteArgs, FindOneAndUpdateArgs, FindOneArgs, FreezeArgs,
    Hydrated, Lean, PaginateArgs, Paginated, RestoreArgs, UpdateQueryOptions,
};
use crate::services::storage::{AssetFolder, AssetStorage, UploadFile};

const MODEL: &str = "Brand";

/// 브랜드 검색 대상 필드
const SEARCH_FIELDS: [&str; 3] = ["name", "slug", "slogan"];

/// 브랜드 비즈니스 로직 서비스
///
/// 모든 메서드는 작업을 수행하는 사용자의 `ObjectId`를 받아
/// `createdBy`/`updatedBy`에 기록합니다.
///
/// ## 사용 예제
///
/// ```rust,ignore
/// let service = BrandService::new(BrandRepository::new(store.clone()), storage.clone());
///
/// let brand = service
///     .create(CreateBrandRequest { name: "Acme".into(), slogan: None }, &file, user_id)
///     .await?;
/// assert_eq!(brand.slug.as_deref(), Some("acme"));
/// ```
pub struct BrandService<S: DocumentStore = MongoStore> {
    brands: BrandRepository<S>,
    storage: Arc<dyn AssetStorage>,
}

impl<S: DocumentStore> BrandService<S> {
    pub fn new(brands: BrandRepository<S>, storage: Arc<dyn AssetStorage>) -> Self {
        Self { brands, storage }
    }

    /// 새 브랜드 생성
    ///
    /// # 반환값
    ///
    /// * `Ok(Hydrated<Brand>)` - 슬러그와 타임스탬프가 채워진 브랜드
    /// * `Err(AppError::ValidationError)` - 이름/슬로건 길이 위반
    /// * `Err(AppError::ConflictError)` - 같은 이름의 브랜드가 이미 있음 (보관 포함)
    /// * `Err(AppError::StorageError)` - 이미지 업로드 실패
    pub async fn create(
        &self,
        request: CreateBrandRequest,
        file: &UploadFile,
        user: ObjectId,
    ) -> AppResult<Hydrated<Brand>> {
        request.validate()?;

        let existing = self
            .brands
            .find_one::<Hydrated<Brand>>(FindOneArgs::new(doc! {
                "name": request.name.as_str(),
                "paranoId": false,
            }))
            .await?;
        if let Some(brand) = existing {
            return Err(duplicated(MODEL, brand.is_archived()));
        }

        let image = self.storage.upload(file, AssetFolder::Brand.as_str()).await?;
        let brand = Brand::new(request.name, image.as_str(), user).with_slogan(request.slogan);

        let created = match self.brands.create(CreateArgs::one(brand)).await {
            Ok(mut created) => created.pop(),
            Err(e) => {
                self.discard(&image).await;
                return Err(e);
            }
        };

        match created {
            Some(brand) => {
                info!("브랜드 생성: {} ({})", brand.name, image);
                Ok(brand)
            }
            None => {
                self.discard(&image).await;
                Err(AppError::BadRequestError(
                    "Fail To Create This Brand Resource".to_string(),
                ))
            }
        }
    }

    /// 이름/슬로건 수정. 이름이 바뀌면 슬러그도 다시 계산됩니다.
    pub async fn update(
        &self,
        brand_id: ObjectId,
        request: UpdateBrandRequest,
        user: ObjectId,
    ) -> AppResult<Hydrated<Brand>> {
        request.validate()?;

        if let Some(name) = &request.name {
            if self.brands.exists(doc! { "name": name.as_str() }).await? {
                return Err(duplicated(MODEL, false));
            }
        }

        let mut patch = request.to_patch();
        patch.insert("updatedBy", user);

        self.brands
            .find_one_and_update(FindOneAndUpdateArgs {
                filter: doc! { "_id": brand_id },
                update: patch.into(),
                ..Default::default()
            })
            .await?
            .ok_or_else(|| not_found(MODEL))
    }

    /// 브랜드 이미지 교체
    ///
    /// 새 이미지를 먼저 올린 뒤 문서를 바꿉니다. 대상이 없으면 새 이미지를 지우고,
    /// 성공하면 이전 이미지를 지웁니다. 수정 전 문서를 돌려줍니다.
    pub async fn update_attachment(
        &self,
        brand_id: ObjectId,
        file: &UploadFile,
        user: ObjectId,
    ) -> AppResult<Hydrated<Brand>> {
        let image = self.storage.upload(file, AssetFolder::Brand.as_str()).await?;

        let previous = self
            .brands
            .find_one_and_update::<Hydrated<Brand>>(FindOneAndUpdateArgs {
                filter: doc! { "_id": brand_id },
                update: doc! { "image": image.as_str(), "updatedBy": user }.into(),
                options: UpdateQueryOptions::previous(),
            })
            .await;

        let previous = match previous {
            Ok(Some(brand)) => brand,
            Ok(None) => {
                self.discard(&image).await;
                return Err(not_found(MODEL));
            }
            Err(e) => {
                self.discard(&image).await;
                return Err(e);
            }
        };

        self.storage.delete(&previous.image).await?;
        Ok(previous)
    }

    /// 브랜드 보관 (소프트 삭제)
    pub async fn freeze(&self, brand_id: ObjectId, user: ObjectId) -> AppResult<()> {
        self.brands
            .freeze::<Lean>(FreezeArgs {
                filter: doc! { "_id": brand_id },
                updated_by: user,
            })
            .await?
            .ok_or_else(|| not_found(MODEL))?;

        info!("브랜드 보관: {}", brand_id);
        Ok(())
    }

    /// 보관된 브랜드 복원. 수정 전(보관 상태) 문서를 돌려줍니다.
    pub async fn restore(&self, brand_id: ObjectId, user: ObjectId) -> AppResult<Hydrated<Brand>> {
        let brand = self
            .brands
            .restore::<Hydrated<Brand>>(RestoreArgs {
                filter: doc! { "_id": brand_id },
                updated_by: user,
            })
            .await?
            .ok_or_else(|| not_found(MODEL))?;

        info!("브랜드 복원: {}", brand_id);
        Ok(brand)
    }

    /// 보관된 브랜드를 영구 삭제하고 이미지를 지웁니다.
    pub async fn remove(&self, brand_id: ObjectId) -> AppResult<()> {
        let brand = self
            .brands
            .find_one_and_delete::<Hydrated<Brand>>(DeleteArgs {
                filter: archived_by_id(brand_id),
            })
            .await?
            .ok_or_else(|| not_found(MODEL))?;

        self.storage.delete(&brand.image).await?;
        info!("브랜드 삭제: {} ({})", brand_id, brand.image);
        Ok(())
    }

    /// 브랜드 목록. `archive`가 참이면 보관된 브랜드만 조회합니다.
    pub async fn find_all(
        &self,
        query: FindAllQuery,
        archive: bool,
    ) -> AppResult<Paginated<Hydrated<Brand>>> {
        query.validate()?;

        self.brands
            .paginate(PaginateArgs {
                filter: scope_archive(query.search_filter(&SEARCH_FIELDS), archive),
                page: query.page(),
                size: query.size,
                ..Default::default()
            })
            .await
    }

    pub async fn find_one(&self, brand_id: ObjectId, archive: bool) -> AppResult<Hydrated<Brand>> {
        self.brands
            .find_one(FindOneArgs::new(scope_archive(doc! { "_id": brand_id }, archive)))
            .await?
            .ok_or_else(|| not_found(MODEL))
    }

    /// 보상 삭제. 원래 에러를 가리지 않도록 실패는 로그만 남깁니다.
    async fn discard(&self, image: &str) {
        if let Err(e) = self.storage.delete(image).await {
            warn!("업로드 이미지 정리 실패 ({}): {}", image, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::storage::LocalAssetStorage;

    struct Fixture {
        service: BrandService<MemoryStore>,
        store: Arc<MemoryStore>,
        dir: tempfile::TempDir,
        user: ObjectId,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new().with_unique_index("brands", "name"));
        let storage: Arc<dyn AssetStorage> = Arc::new(LocalAssetStorage::new(dir.path()));
        let service = BrandService::new(BrandRepository::new(Arc::clone(&store)), storage);

        Fixture {
            service,
            store,
            dir,
            user: ObjectId::new(),
        }
    }

    fn logo() -> UploadFile {
        UploadFile::new("logo.png", b"logo".to_vec())
    }

    fn request(name: &str) -> CreateBrandRequest {
        CreateBrandRequest {
            name: name.to_string(),
            slogan: Some("Quality first".to_string()),
        }
    }

    async fn create(fx: &Fixture, name: &str) -> Hydrated<Brand> {
        fx.service.create(request(name), &logo(), fx.user).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_uploads_image_and_derives_slug() {
        let fx = fixture();

        let brand = create(&fx, "My Cool Brand!").await;

        assert_eq!(brand.slug.as_deref(), Some("my-cool-brand"));
        assert_eq!(brand.version, 0);
        assert_eq!(brand.created_by, fx.user);
        assert!(fx.dir.path().join(&brand.image).exists());
    }

    #[tokio::test]
    async fn test_duplicate_names_are_reported_by_state() {
        let fx = fixture();
        let brand = create(&fx, "Acme").await;

        let active = fx.service.create(request("Acme"), &logo(), fx.user).await;
        assert!(matches!(active, Err(AppError::ConflictError(ref m)) if m == "Duplicated Brand"));

        fx.service.freeze(brand.id.unwrap(), fx.user).await.unwrap();

        let archived = fx.service.create(request("Acme"), &logo(), fx.user).await;
        assert!(matches!(
            archived,
            Err(AppError::ConflictError(ref m)) if m == "Duplicated With Archived Brand"
        ));
    }

    #[tokio::test]
    async fn test_invalid_request_uploads_nothing() {
        let fx = fixture();

        let result = fx.service.create(request("A"), &logo(), fx.user).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(!fx.dir.path().join("brand").exists());
    }

    #[tokio::test]
    async fn test_update_renames_and_bumps_version() {
        let fx = fixture();
        let brand = create(&fx, "Acme").await;

        let updated = fx
            .service
            .update(
                brand.id.unwrap(),
                UpdateBrandRequest {
                    name: Some("Acme Tools".to_string()),
                    slogan: None,
                },
                fx.user,
            )
            .await
            .unwrap();

        assert_eq!(updated.slug.as_deref(), Some("acme-tools"));
        assert_eq!(updated.updated_by, Some(fx.user));
        assert_eq!(updated.version, 1);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_name_and_missing_brand() {
        let fx = fixture();
        let brand = create(&fx, "Acme").await;
        create(&fx, "Globex").await;

        let taken = fx
            .service
            .update(
                brand.id.unwrap(),
                UpdateBrandRequest {
                    name: Some("Globex".to_string()),
                    slogan: None,
                },
                fx.user,
            )
            .await;
        assert!(matches!(taken, Err(AppError::ConflictError(_))));

        let missing = fx
            .service
            .update(
                ObjectId::new(),
                UpdateBrandRequest {
                    name: None,
                    slogan: Some("Hello".to_string()),
                },
                fx.user,
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_attachment_swaps_files() {
        let fx = fixture();
        let brand = create(&fx, "Acme").await;
        let old_image = brand.image.clone();

        let previous = fx
            .service
            .update_attachment(brand.id.unwrap(), &UploadFile::new("new.png", b"new".to_vec()), fx.user)
            .await
            .unwrap();

        assert_eq!(previous.image, old_image);
        assert!(!fx.dir.path().join(&old_image).exists());

        let current = fx.service.find_one(brand.id.unwrap(), false).await.unwrap();
        assert!(current.image.ends_with("_new.png"));
        assert!(fx.dir.path().join(&current.image).exists());
    }

    #[tokio::test]
    async fn test_update_attachment_on_missing_brand_removes_upload() {
        let fx = fixture();

        let result = fx
            .service
            .update_attachment(ObjectId::new(), &logo(), fx.user)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let leftovers = std::fs::read_dir(fx.dir.path().join("brand")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_archive_lifecycle() {
        let fx = fixture();
        let brand = create(&fx, "Acme").await;
        let id = brand.id.unwrap();

        // 활성 상태에서는 영구 삭제 불가
        assert!(matches!(fx.service.remove(id).await, Err(AppError::NotFound(_))));

        fx.service.freeze(id, fx.user).await.unwrap();
        assert!(matches!(fx.service.find_one(id, false).await, Err(AppError::NotFound(_))));
        assert!(fx.service.find_one(id, true).await.unwrap().is_archived());

        let before_restore = fx.service.restore(id, fx.user).await.unwrap();
        assert!(before_restore.is_archived());
        let restored = fx.service.find_one(id, false).await.unwrap();
        assert!(restored.restored_at.is_some());
        assert!(restored.freezed_at.is_none());

        fx.service.freeze(id, fx.user).await.unwrap();
        fx.service.remove(id).await.unwrap();

        assert!(fx.store.documents("brands").is_empty());
        assert!(!fx.dir.path().join(&brand.image).exists());
    }

    #[tokio::test]
    async fn test_find_all_searches_and_separates_archive() {
        let fx = fixture();
        for name in ["Acme", "Acme Tools", "Globex"] {
            create(&fx, name).await;
        }
        let archived = create(&fx, "Acme Archive").await;
        fx.service.freeze(archived.id.unwrap(), fx.user).await.unwrap();

        let found = fx
            .service
            .find_all(
                FindAllQuery {
                    search: Some("ACME".to_string()),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();
        assert_eq!(found.result.len(), 2);
        assert_eq!(found.docs_count, None);

        let archive = fx
            .service
            .find_all(FindAllQuery::default(), true)
            .await
            .unwrap();
        assert_eq!(archive.result.len(), 1);
        assert_eq!(archive.result[0].name, "Acme Archive");
    }

    #[tokio::test]
    async fn test_find_all_paginates() {
        let fx = fixture();
        for index in 0..7 {
            create(&fx, &format!("Brand {}", index)).await;
        }

        let page = fx
            .service
            .find_all(
                FindAllQuery {
                    page: Some("2".to_string()),
                    size: Some(5.0),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();

        assert_eq!(page.result.len(), 2);
        assert_eq!(page.docs_count, Some(7));
        assert_eq!(page.pages, Some(2));
        assert_eq!(page.current_page, Some(2));
    }
}
