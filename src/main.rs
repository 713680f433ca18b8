//! 카탈로그 백엔드 메인 애플리케이션
//!
//! MongoDB 연결을 설정하고 리포지토리와 서비스를 등록한 뒤
//! Actix-web HTTP 서버를 구동합니다.

use std::io;
use std::sync::Arc;

use actix_web::{App, HttpServer, middleware};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use catalog_backend::config::ServerConfig;
use catalog_backend::core::registry::{Repository, ServiceLocator};
use catalog_backend::db::{Database, MongoStore};
use catalog_backend::repositories::{
    BrandRepository, CategoryRepository, OtpRepository, ProductRepository, TokenRepository,
    UserRepository,
};
use catalog_backend::routes::configure_all_routes;
use catalog_backend::services::auth::AuthService;
use catalog_backend::services::catalog::{BrandService, CategoryService, ProductService};
use catalog_backend::services::storage::{AssetStorage, LocalAssetStorage};

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 카탈로그 백엔드 시작중...");

    let store = initialize_store().await?;
    register_services(store).await?;

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    start_http_server().await
}

/// HTTP 서버를 구성하고 실행합니다
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server() -> io::Result<()> {
    let bind_address = (ServerConfig::host(), ServerConfig::port());

    info!("🌐 서버가 http://{}:{} 에서 실행중입니다", bind_address.0, bind_address.1);
    info!("📍 Health check: http://{}:{}/health", bind_address.0, bind_address.1);

    HttpServer::new(|| {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => {
            if let Err(e) = dotenv::from_filename(".env.prod") {
                eprintln!(".env.prod 파일 로드 실패: {}", e);
            }
        }
        "dev" => {
            if let Err(e) = dotenv::from_filename(".env.dev") {
                eprintln!(".env.dev 파일 로드 실패: {}", e);
            }
        }
        _ => {
            dotenv().ok();
        }
    }
}

/// `RUST_LOG` 기반 로깅 초기화 (기본값: "info,actix_web=info")
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
    info!(
        "Current profile: {}",
        std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string())
    );
}

/// MongoDB에 연결하고 문서 저장소를 만듭니다
async fn initialize_store() -> io::Result<Arc<MongoStore>> {
    info!("📡 데이터베이스 연결 중...");

    let database = Database::new().await.map_err(|e| {
        error!("데이터베이스 연결 실패: {}", e);
        io::Error::other(e.to_string())
    })?;

    let store = Arc::new(MongoStore::new(&database));
    ServiceLocator::set(Arc::new(database));
    Ok(store)
}

/// 리포지토리와 서비스를 등록하고 리포지토리 인덱스를 준비합니다
async fn register_services(store: Arc<MongoStore>) -> io::Result<()> {
    let brands = BrandRepository::new(Arc::clone(&store));
    let categories = CategoryRepository::new(Arc::clone(&store));
    let products = ProductRepository::new(Arc::clone(&store));
    let users = UserRepository::new(Arc::clone(&store));
    let otps = OtpRepository::new(Arc::clone(&store));
    let tokens = TokenRepository::new(Arc::clone(&store));

    let storage: Arc<dyn AssetStorage> = Arc::new(LocalAssetStorage::from_config());

    ServiceLocator::set(Arc::new(BrandService::new(brands.clone(), Arc::clone(&storage))));
    ServiceLocator::set(Arc::new(CategoryService::new(
        categories.clone(),
        brands.clone(),
        Arc::clone(&storage),
    )));
    ServiceLocator::set(Arc::new(ProductService::new(
        products.clone(),
        brands.clone(),
        categories.clone(),
        Arc::clone(&storage),
    )));
    ServiceLocator::set(Arc::new(AuthService::new(
        users.clone(),
        otps.clone(),
        tokens.clone(),
    )));

    let repositories: Vec<Arc<dyn Repository>> = vec![
        Arc::new(brands),
        Arc::new(categories),
        Arc::new(products),
        Arc::new(users),
        Arc::new(otps),
        Arc::new(tokens),
    ];

    ServiceLocator::initialize_all(&repositories).await.map_err(|e| {
        error!("리포지토리 초기화 실패: {}", e);
        io::Error::other(e.to_string())
    })
}
