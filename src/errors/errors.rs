//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! 카탈로그 백엔드를 위한 통합 에러 처리 시스템입니다.
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 타입 안전하고
//! 일관된 에러 처리를 제공합니다.
//!
//! ## 계층별 에러 정책
//!
//! - **저장소 계층** (`db`): 드라이버 에러를 `DatabaseError`로 옮겨 담을 뿐,
//!   재시도하거나 삼키지 않습니다.
//! - **리포지토리 계층**: 결과가 없으면 `None`/빈 배열을 돌려주며 `NotFound`를
//!   직접 만들지 않습니다.
//! - **서비스 계층**: `None`을 `NotFound`로, 사전 중복 검사를 `ConflictError`로 변환합니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::AppError;
//! use crate::repositories::{FindOneArgs, Hydrated};
//!
//! let brand = brand_repo
//!     .find_one::<Hydrated<Brand>>(FindOneArgs::new(doc! { "_id": id }))
//!     .await?
//!     .ok_or_else(|| AppError::NotFound("Fail To Find Matching Brand Instance".to_string()))?;
//! ```

use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 자동으로 HTTP 응답으로 변환되어 클라이언트에게 전달됩니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 데이터베이스 관련 에러 (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 입력값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 충돌/중복 에러 (409 Conflict)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 인증 실패 에러 (401 Unauthorized)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 요청은 유효하지만 처리할 수 없음 (400 Bad Request)
    #[error("Bad request: {0}")]
    BadRequestError(String),

    /// 파일 저장소 에러 (500 Internal Server Error)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl actix_web::ResponseError for AppError {
    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 각 에러 타입을 적절한 HTTP 상태 코드와 JSON 응답으로 변환합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::ValidationError(_) | AppError::BadRequestError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        actix_web::HttpResponse::build(status)
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}
