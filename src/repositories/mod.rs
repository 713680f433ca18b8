//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! [`DatabaseRepository`]가 모든 컬렉션 공통 작업(조회, 페이지네이션, 생성, 수정,
//! 보관/복원, 삭제, populate)을 제공하고, 엔티티별 리포지토리는 이를 감싸 인덱스 정의와
//! 전용 조회 메서드만 더합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::{BrandRepository, FindOneArgs, Hydrated};
//!
//! let brands = BrandRepository::new(store.clone());
//! let brand: Option<Hydrated<Brand>> = brands
//!     .find_one(FindOneArgs::new(doc! { "slug": "my-cool-brand" }))
//!     .await?;
//! ```

/// 엔티티 리포지토리 선언
///
/// 범용 리포지토리를 감싸는 구조체, `Deref`, 인덱스 생성과
/// [`Repository`](crate::core::registry::Repository) 구현을 만들어 냅니다.
macro_rules! entity_repository {
    (
        $(#[$meta:meta])*
        $name:ident<$entity:ty> {
            name: $label:literal,
            indexes: [$($index:expr),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        pub struct $name<S: $crate::db::DocumentStore = $crate::db::MongoStore> {
            inner: $crate::repositories::DatabaseRepository<$entity, S>,
        }

        impl<S: $crate::db::DocumentStore> $name<S> {
            pub fn new(store: std::sync::Arc<S>) -> Self {
                Self {
                    inner: $crate::repositories::DatabaseRepository::new(store),
                }
            }

            /// 컬렉션 인덱스 정의
            pub fn indexes() -> Vec<$crate::db::IndexSpec> {
                vec![$($index),*]
            }

            pub async fn create_indexes(&self) -> $crate::errors::AppResult<()> {
                for index in Self::indexes() {
                    self.inner
                        .store()
                        .create_index(self.inner.collection_name(), index)
                        .await?;
                }
                Ok(())
            }
        }

        impl<S: $crate::db::DocumentStore> Clone for $name<S> {
            fn clone(&self) -> Self {
                Self {
                    inner: self.inner.clone(),
                }
            }
        }

        impl<S: $crate::db::DocumentStore> std::ops::Deref for $name<S> {
            type Target = $crate::repositories::DatabaseRepository<$entity, S>;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        #[async_trait::async_trait]
        impl<S: $crate::db::DocumentStore> $crate::core::registry::Repository for $name<S> {
            fn name(&self) -> &str {
                $label
            }

            fn collection_name(&self) -> &str {
                self.inner.collection_name()
            }

            async fn init(&self) -> $crate::errors::AppResult<()> {
                self.create_indexes().await?;
                log::info!(
                    "{} 리포지토리 초기화 완료 (collection: {})",
                    $label,
                    self.inner.collection_name()
                );
                Ok(())
            }
        }
    };
}

pub mod args;
pub mod catalog;
pub mod database_repository;
pub mod hooks;
pub mod pagination;
pub mod populate;
pub mod projection;
pub mod tokens;
pub mod users;

pub use args::*;
pub use catalog::{BrandRepository, CategoryRepository, ProductRepository};
pub use database_repository::DatabaseRepository;
pub use pagination::{Page, PageWindow, Paginated};
pub use populate::PopulateOptions;
pub use projection::{Hydrated, Lean, Projection};
pub use tokens::TokenRepository;
pub use users::{OtpRepository, UserRepository};
