//! # Service Registry
//!
//! 애플리케이션 전역에서 공유되는 리포지토리와 서비스 인스턴스를 보관하는
//! 타입 기반 싱글톤 레지스트리입니다.
//!
//! ## 동작 방식
//!
//! ```text
//! main
//!  ├─ Database 연결 → MongoStore 생성
//!  ├─ 리포지토리/서비스 생성 → ServiceLocator::set()
//!  ├─ ServiceLocator::initialize_all() → 리포지토리별 init (인덱스 생성)
//!  └─ 핸들러 → ServiceLocator::require::<T>()
//! ```
//!
//! 인스턴스는 `TypeId`를 키로 하나씩만 저장되며, 같은 타입을 다시 등록하면 교체됩니다.
//!
//! ```rust,ignore
//! let brands = Arc::new(BrandRepository::new(store.clone()));
//! ServiceLocator::set(brands.clone());
//! ServiceLocator::initialize_all(&[brands]).await?;
//!
//! let brands = ServiceLocator::require::<BrandRepository>()?;
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use log::info;
use once_cell::sync::Lazy;

use crate::errors::{AppError, AppResult};

/// 데이터 액세스 리포지토리를 위한 공통 인터페이스
#[async_trait]
pub trait Repository: Send + Sync {
    /// 리포지토리의 고유 이름을 반환합니다.
    fn name(&self) -> &str;

    /// 연결된 MongoDB 컬렉션의 이름을 반환합니다.
    fn collection_name(&self) -> &str;

    /// 리포지토리 초기화 로직을 수행합니다.
    ///
    /// 컬렉션 인덱스 생성 등 데이터 액세스와 관련된 준비 작업입니다.
    async fn init(&self) -> AppResult<()>;
}

/// 타입별 싱글톤 인스턴스 저장소
pub struct ServiceLocator {
    instances: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ServiceLocator {
    fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// 인스턴스를 등록합니다. 같은 타입이 이미 있으면 교체합니다.
    pub fn set<T: 'static + Send + Sync>(instance: Arc<T>) {
        info!("📦 Registering: {}", short_type_name::<T>());

        let mut instances = LOCATOR
            .instances
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        instances.insert(TypeId::of::<T>(), instance as Arc<dyn Any + Send + Sync>);
    }

    /// 등록된 인스턴스를 가져옵니다.
    pub fn get<T: 'static + Send + Sync>() -> Option<Arc<T>> {
        let instances = LOCATOR
            .instances
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        instances
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// 등록된 인스턴스를 가져오고, 없으면 `InternalError`를 돌려줍니다.
    pub fn require<T: 'static + Send + Sync>() -> AppResult<Arc<T>> {
        Self::get::<T>().ok_or_else(|| {
            AppError::InternalError(format!(
                "Service not found: {}. Make sure it's registered with ServiceLocator::set()",
                short_type_name::<T>()
            ))
        })
    }

    /// 리포지토리들을 순서대로 초기화합니다. 하나라도 실패하면 즉시 중단합니다.
    pub async fn initialize_all(repositories: &[Arc<dyn Repository>]) -> AppResult<()> {
        info!("🔄 Initializing {} repositories", repositories.len());

        for repository in repositories {
            repository.init().await?;
            info!(
                "  ✓ {} ({})",
                repository.name(),
                repository.collection_name()
            );
        }

        info!("✅ Service registry ready");
        Ok(())
    }
}

/// `catalog_backend::services::catalog::BrandService<...>` → `BrandService<...>`
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(index) => &full[index + 2..],
        None => full,
    }
}

/// 전역 서비스 로케이터 인스턴스
static LOCATOR: Lazy<ServiceLocator> = Lazy::new(ServiceLocator::new);
