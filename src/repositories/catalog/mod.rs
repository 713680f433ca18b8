//! 카탈로그(브랜드, 카테고리, 상품) 리포지토리

pub mod brand_repo;
pub mod category_repo;
pub mod product_repo;

pub use brand_repo::BrandRepository;
pub use category_repo::CategoryRepository;
pub use product_repo::ProductRepository;
