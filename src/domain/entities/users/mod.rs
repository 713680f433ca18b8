//! Users Entity Module
//!
//! 사용자와 인증 보조 엔티티(OTP, 폐기 토큰)를 정의하는 모듈입니다.
//! 이 엔티티들은 보관(소프트 삭제)을 지원하지 않습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use crate::domain::entities::users::User;
//!
//! let user = User::new_system("Jane Doe", "jane@example.com", "plain-password");
//! let created = user_repo.create(CreateArgs::one(user)).await?;
//! ```

pub mod otp;
pub mod token;
pub mod user;

pub use otp::{Otp, OtpType};
pub use token::Token;
pub use user::{Gender, Language, Provider, Role, User};
