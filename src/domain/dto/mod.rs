//! # Data Transfer Objects (DTO) Module
//!
//! 서비스 경계에서 주고받는 요청/응답 객체를 정의하는 모듈입니다.
//! 요청 DTO는 `validator` crate로 입력값을 검증한 뒤 서비스에 전달되며,
//! 응답 DTO는 엔티티에서 외부에 노출할 필드만 골라 담습니다.
//!
//! ## 모듈 구조
//!
//! ```text
//! dto/
//! ├── catalog/            # 브랜드, 카테고리, 상품 요청 + 목록 조회 쿼리
//! └── users/
//!     ├── request/        # 회원가입, 로그인, 이메일 확인
//!     └── response/       # 사용자 응답
//! ```
//!
//! ## 검증 사용 예제
//!
//! ```rust,ignore
//! use validator::Validate;
//!
//! let request = CreateBrandRequest { name: "Acme".into(), slogan: None };
//! request.validate()?; // ValidationErrors → AppError::ValidationError
//! ```

pub mod catalog;
pub mod users;

use mongodb::bson::oid::ObjectId;
use validator::ValidationError;

use crate::errors::{AppError, AppResult};

/// ObjectId 16진 문자열 형식 검증
pub(crate) fn validate_object_id(value: &str) -> Result<(), ValidationError> {
    if ObjectId::parse_str(value).is_err() {
        return Err(ValidationError::new("invalid_object_id")
            .with_message("InValid MongoDB Format".into()));
    }
    Ok(())
}

/// ObjectId 목록 형식 검증
pub(crate) fn validate_object_ids(values: &[String]) -> Result<(), ValidationError> {
    values.iter().try_for_each(|value| validate_object_id(value))
}

/// 문자열 식별자를 ObjectId로 변환합니다.
pub fn parse_object_id(value: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(value)
        .map_err(|_| AppError::ValidationError(format!("InValid MongoDB Format: {}", value)))
}

/// 식별자 목록을 변환하면서 중복을 제거합니다. 처음 나온 순서를 유지합니다.
pub fn parse_unique_object_ids(values: &[String]) -> AppResult<Vec<ObjectId>> {
    let mut ids: Vec<ObjectId> = Vec::with_capacity(values.len());
    for value in values {
        let id = parse_object_id(value)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
