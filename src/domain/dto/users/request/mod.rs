//! # 사용자 관련 요청 DTO 모듈
//!
//! 클라이언트로부터 받은 JSON 데이터를 구조화된 타입으로 바꾸고 검증합니다.
//! 검증 실패는 `validator::ValidationErrors`로 나타나며,
//! [`AppError::ValidationError`](crate::errors::AppError::ValidationError)(400)로 변환됩니다.

pub mod auth_request;

pub use auth_request::{ConfirmEmailRequest, LoginRequest, ResendConfirmEmailRequest, SignupRequest};
