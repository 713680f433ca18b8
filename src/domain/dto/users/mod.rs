//! # User Data Transfer Objects Module
//!
//! 회원가입, 이메일 확인, 로그인 흐름의 요청/응답 DTO를 정의하는 모듈입니다.
//!
//! ## 모듈 구조
//!
//! ```text
//! users/
//! ├── request/
//! │   └── auth_request.rs    # 회원가입, 로그인, 이메일 확인, 재발송
//! └── response/
//!     └── user_response.rs   # 사용자 응답 (비밀번호 제외)
//! ```
//!
//! ## 검증 규칙
//!
//! - **이메일**: 형식 검증
//! - **사용자명**: 2-52자 ("이름 성")
//! - **비밀번호**: 최소 8자, 대소문자/숫자/특수문자 포함
//! - **비밀번호 확인**: 원본 비밀번호와 일치
//! - **확인 코드**: 숫자 6자리
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use validator::Validate;
//! use crate::domain::dto::users::{SignupRequest, UserResponse};
//!
//! let request = SignupRequest {
//!     username: "Jane Doe".to_string(),
//!     email: "jane@example.com".to_string(),
//!     password: "Str0ng!Pass".to_string(),
//!     confirm_password: "Str0ng!Pass".to_string(),
//! };
//! request.validate()?;
//!
//! let signup = auth_service.signup(request).await?;
//! let response = UserResponse::from(signup.user.into_inner());
//! ```

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
