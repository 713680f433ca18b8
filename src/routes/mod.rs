//! API 라우트 설정 모듈
//!
//! 현재는 로드밸런서와 모니터링을 위한 헬스체크 엔드포인트만 노출합니다.
//! 카탈로그/인증 서비스는 [`ServiceLocator`](crate::core::registry::ServiceLocator)에
//! 등록되어 있으므로 핸들러는 `ServiceLocator::require::<T>()`로 꺼내 씁니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use actix_web::App;
//!
//! let app = App::new().configure(configure_all_routes);
//! ```

use actix_web::{HttpResponse, web};
use mongodb::bson::DateTime;
use serde_json::json;

/// 모든 라우트를 설정합니다
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "healthy",
///   "service": "catalog_backend",
///   "version": "0.1.0",
///   "timestamp": "2024-01-01T00:00:00Z"
/// }
/// ```
#[actix_web::get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": DateTime::now().try_to_rfc3339_string().unwrap_or_default(),
    }))
}
