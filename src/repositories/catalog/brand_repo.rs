//! # 브랜드 리포지토리
//!
//! `brands` 컬렉션. 이름은 유니크 인덱스로 보호됩니다.

use crate::db::IndexSpec;
use crate::domain::entities::Brand;

entity_repository! {
    /// 브랜드 데이터 액세스 리포지토리
    ///
    /// 보관(freeze)된 브랜드도 이름을 점유하므로, 같은 이름의 새 브랜드는
    /// 유니크 인덱스에 막힙니다. 서비스는 생성 전에 `paranoId: false`로 미리 확인합니다.
    BrandRepository<Brand> {
        name: "brand",
        indexes: [IndexSpec::unique("name")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::registry::Repository;
    use crate::db::MemoryStore;
    use crate::errors::AppError;
    use crate::repositories::CreateArgs;
    use mongodb::bson::oid::ObjectId;

    #[tokio::test]
    async fn test_init_creates_unique_name_index() {
        let store = Arc::new(MemoryStore::new());
        let brands = BrandRepository::new(Arc::clone(&store));

        brands.init().await.unwrap();

        assert_eq!(brands.name(), "brand");
        assert_eq!(Repository::collection_name(&brands), "brands");
        assert_eq!(store.indexes("brands"), vec![IndexSpec::unique("name")]);

        brands
            .create(CreateArgs::one(Brand::new("Acme", "a.png", ObjectId::new())))
            .await
            .unwrap();
        let duplicate = brands
            .create(CreateArgs::one(Brand::new("Acme", "b.png", ObjectId::new())))
            .await;
        assert!(matches!(duplicate, Err(AppError::DatabaseError(_))));
    }
}
