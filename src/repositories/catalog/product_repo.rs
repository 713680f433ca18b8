//! 상품 리포지토리
//!
//! 상품 이름에는 인덱스가 없습니다. 중복 여부는 서비스가 생성 전에 확인합니다.

use crate::domain::entities::Product;

entity_repository! {
    /// 상품 데이터 액세스 리포지토리 (`products`)
    ProductRepository<Product> {
        name: "product",
        indexes: [],
    }
}
