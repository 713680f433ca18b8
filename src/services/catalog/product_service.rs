//! # 상품 서비스 구현
//!
//! 상품은 카테고리의 자산 폴더 아래에 자신의 폴더를 만들고 이미지 여러 장을 올립니다.
//!
//! ```text
//! category/{category.assetFolderId}/product/{product.assetFolderId}/{uuid}_{파일명}
//! ```
//!
//! 상품 이름에는 유니크 인덱스가 없으므로 중복 확인은 이 서비스에서만 이루어집니다.

use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::{doc, oid::ObjectId};
use uuid::Uuid;
use validator::Validate;

use super::{duplicated, not_found, scope_archive};
use crate::config::StorageConfig;
use crate::db::{DocumentStore, MongoStore};
use crate::domain::dto::catalog::{CreateProductRequest, FindAllQuery};
use crate::domain::dto::parse_object_id;
use crate::domain::entities::catalog::product::sale_price;
use crate::domain::entities::{Brand, Category, Product, Reference};
use crate::errors::{AppError, AppResult};
use crate::repositories::{
    BrandRepository, CategoryRepository, CreateArgs, FindOneArgs, Hydrated, Lean, PaginateArgs,
    Paginated, PopulateOptions, ProductRepository,
};
use crate::services::storage::{
    AssetFolder, AssetStorage, UploadFile, delete_many, upload_many,
};

const MODEL: &str = "Product";

const SEARCH_FIELDS: [&str; 3] = ["name", "slug", "description"];

/// 상품 비즈니스 로직 서비스
pub struct ProductService<S: DocumentStore = MongoStore> {
    products: ProductRepository<S>,
    brands: BrandRepository<S>,
    categories: CategoryRepository<S>,
    storage: Arc<dyn AssetStorage>,
    upload_concurrency: usize,
}

impl<S: DocumentStore> ProductService<S> {
    /// 동시 업로드 수는 `UPLOAD_CONCURRENCY` 설정을 따릅니다.
    pub fn new(
        products: ProductRepository<S>,
        brands: BrandRepository<S>,
        categories: CategoryRepository<S>,
        storage: Arc<dyn AssetStorage>,
    ) -> Self {
        Self {
            products,
            brands,
            categories,
            storage,
            upload_concurrency: StorageConfig::upload_concurrency(),
        }
    }

    pub fn with_upload_concurrency(mut self, concurrency: usize) -> Self {
        self.upload_concurrency = concurrency.max(1);
        self
    }

    /// 새 상품 생성
    ///
    /// 카테고리와 브랜드는 활성 상태여야 합니다. 이미지는 입력 순서대로 기록되며,
    /// 업로드나 생성이 실패하면 이미 올라간 이미지를 모두 지웁니다.
    pub async fn create(
        &self,
        request: CreateProductRequest,
        files: &[UploadFile],
        user: ObjectId,
    ) -> AppResult<Hydrated<Product>> {
        request.validate()?;

        let category_id = parse_object_id(&request.category)?;
        let brand_id = parse_object_id(&request.brands)?;

        let category = self
            .categories
            .find_one::<Hydrated<Category>>(FindOneArgs::new(doc! { "_id": category_id }))
            .await?
            .ok_or_else(|| AppError::NotFound("Fail to find this category instance".to_string()))?;

        if !self.brands.exists(doc! { "_id": brand_id }).await? {
            return Err(AppError::NotFound("Fail to find this brand instance".to_string()));
        }

        let existing = self
            .products
            .find_one::<Hydrated<Product>>(FindOneArgs::new(doc! {
                "name": request.name.as_str(),
                "paranoId": false,
            }))
            .await?;
        if let Some(product) = existing {
            return Err(duplicated(MODEL, product.is_archived()));
        }

        let asset_folder_id = Uuid::new_v4().to_string();
        let folder = format!(
            "{}/{}/{}/{}",
            AssetFolder::Category.as_str(),
            category.asset_folder_id,
            AssetFolder::Product.as_str(),
            asset_folder_id
        );
        let images = upload_many(self.storage.as_ref(), files, &folder, self.upload_concurrency).await?;

        let discount = request.discount_percent();
        let product = Product {
            id: None,
            name: request.name,
            slug: None,
            description: request.description,
            images: images.clone(),
            asset_folder_id,
            brands: Reference::Id(brand_id),
            category: Reference::Id(category_id),
            original_price: request.original_price,
            discount_price: discount,
            sale_price: sale_price(request.original_price, discount),
            sold_items: 0,
            stock: request.stock,
            created_by: user,
            updated_by: None,
            freezed_at: None,
            restored_at: None,
            created_at: None,
            updated_at: None,
            version: 0,
        };

        let created = match self.products.create(CreateArgs::one(product)).await {
            Ok(mut created) => created.pop(),
            Err(e) => {
                self.discard(&images).await;
                return Err(e);
            }
        };

        match created {
            Some(product) => {
                info!("상품 생성: {} (이미지 {}장)", product.name, images.len());
                Ok(product)
            }
            None => {
                self.discard(&images).await;
                Err(AppError::BadRequestError(
                    "Fail to create this product instance".to_string(),
                ))
            }
        }
    }

    /// 브랜드와 카테고리를 채운 상품 문서
    pub async fn find_one(&self, product_id: ObjectId, archive: bool) -> AppResult<Lean> {
        self.products
            .find_one::<Lean>(
                FindOneArgs::new(scope_archive(doc! { "_id": product_id }, archive))
                    .populate(PopulateOptions::reference::<Brand>("brands"))
                    .populate(PopulateOptions::reference::<Category>("category")),
            )
            .await?
            .ok_or_else(|| not_found(MODEL))
    }

    pub async fn find_all(
        &self,
        query: FindAllQuery,
        archive: bool,
    ) -> AppResult<Paginated<Hydrated<Product>>> {
        query.validate()?;

        self.products
            .paginate(PaginateArgs {
                filter: scope_archive(query.search_filter(&SEARCH_FIELDS), archive),
                page: query.page(),
                size: query.size,
                ..Default::default()
            })
            .await
    }

    async fn discard(&self, images: &[String]) {
        if let Err(e) = delete_many(self.storage.as_ref(), images).await {
            warn!("상품 이미지 정리 실패: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::repositories::FreezeArgs;
    use crate::services::storage::testing::RecordingStorage;

    struct Fixture {
        service: ProductService<MemoryStore>,
        storage: Arc<RecordingStorage>,
        brand: ObjectId,
        category: Hydrated<Category>,
        brands: BrandRepository<MemoryStore>,
        user: ObjectId,
    }

    async fn fixture(storage: RecordingStorage) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = ObjectId::new();
        let brands = BrandRepository::new(Arc::clone(&store));
        let categories = CategoryRepository::new(Arc::clone(&store));

        let brand = brands
            .create(CreateArgs::one(Brand::new("Acme", "brand/acme.png", user)))
            .await
            .unwrap()[0]
            .id
            .unwrap();
        let category = categories
            .create(CreateArgs::one(
                Category::new("Shoes", "category/f/c.png", Uuid::new_v4().to_string(), user)
                    .with_brands(vec![brand]),
            ))
            .await
            .unwrap()
            .remove(0);

        let storage = Arc::new(storage);
        let service = ProductService::new(
            ProductRepository::new(Arc::clone(&store)),
            brands.clone(),
            categories,
            storage.clone(),
        )
        .with_upload_concurrency(2);

        Fixture {
            service,
            storage,
            brand,
            category,
            brands,
            user,
        }
    }

    fn request(fx: &Fixture, name: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            description: None,
            brands: fx.brand.to_hex(),
            category: fx.category.id.unwrap().to_hex(),
            original_price: 200.0,
            discount_price: Some(25.0),
            stock: 3,
        }
    }

    fn files(names: &[&str]) -> Vec<UploadFile> {
        names.iter().map(|name| UploadFile::new(*name, b"img".to_vec())).collect()
    }

    #[tokio::test]
    async fn test_create_computes_price_and_keeps_image_order() {
        let fx = fixture(RecordingStorage::default()).await;

        let product = fx
            .service
            .create(request(&fx, "Runner 2"), &files(&["a.png", "b.png", "c.png"]), fx.user)
            .await
            .unwrap();

        assert_eq!(product.sale_price, 150.0);
        assert_eq!(product.discount_price, 25.0);
        assert_eq!(product.sold_items, 0);
        assert_eq!(product.slug.as_deref(), Some("runner-2"));

        let folder = format!(
            "category/{}/product/{}",
            fx.category.asset_folder_id, product.asset_folder_id
        );
        let expected: Vec<String> = ["a.png", "b.png", "c.png"]
            .iter()
            .map(|name| format!("{}/{}", folder, name))
            .collect();
        assert_eq!(product.images, expected);
    }

    #[tokio::test]
    async fn test_missing_discount_means_full_price() {
        let fx = fixture(RecordingStorage::default()).await;
        let mut plain = request(&fx, "Plain");
        plain.discount_price = None;

        let product = fx.service.create(plain, &files(&["a.png"]), fx.user).await.unwrap();

        assert_eq!(product.sale_price, 200.0);
        assert_eq!(product.discount_price, 0.0);
    }

    #[tokio::test]
    async fn test_upload_failure_removes_uploaded_images() {
        let fx = fixture(RecordingStorage::failing_on("b.png")).await;

        let result = fx
            .service
            .create(request(&fx, "Runner"), &files(&["a.png", "b.png", "c.png"]), fx.user)
            .await;

        assert!(matches!(result, Err(AppError::StorageError(_))));
        assert!(fx.storage.stored().is_empty());
        assert!(fx
            .service
            .find_all(FindAllQuery::default(), false)
            .await
            .unwrap()
            .result
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_active_references() {
        let fx = fixture(RecordingStorage::default()).await;

        let mut unknown_category = request(&fx, "Runner");
        unknown_category.category = ObjectId::new().to_hex();
        let result = fx.service.create(unknown_category, &files(&["a.png"]), fx.user).await;
        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "Fail to find this category instance"));

        fx.brands
            .freeze::<Lean>(FreezeArgs {
                filter: doc! { "_id": fx.brand },
                updated_by: fx.user,
            })
            .await
            .unwrap();
        let result = fx.service.create(request(&fx, "Runner"), &files(&["a.png"]), fx.user).await;
        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "Fail to find this brand instance"));

        assert!(fx.storage.stored().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected_before_upload() {
        let fx = fixture(RecordingStorage::default()).await;
        fx.service
            .create(request(&fx, "Runner"), &files(&["a.png"]), fx.user)
            .await
            .unwrap();

        let result = fx
            .service
            .create(request(&fx, "Runner"), &files(&["z.png"]), fx.user)
            .await;

        assert!(matches!(result, Err(AppError::ConflictError(ref m)) if m == "Duplicated Product"));
        assert_eq!(fx.storage.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_find_one_populates_references() {
        let fx = fixture(RecordingStorage::default()).await;
        let product = fx
            .service
            .create(request(&fx, "Runner"), &files(&["a.png"]), fx.user)
            .await
            .unwrap();

        let found = fx.service.find_one(product.id.unwrap(), false).await.unwrap().into_inner();

        assert_eq!(found.get_document("brands").unwrap().get_str("name").unwrap(), "Acme");
        assert_eq!(found.get_document("category").unwrap().get_str("name").unwrap(), "Shoes");
    }
}
