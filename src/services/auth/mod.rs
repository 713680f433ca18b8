//! 인증 서비스 모듈
//!
//! 이메일 가입, OTP 기반 이메일 인증, 로그인, 토큰 폐기 목록을 제공합니다.
//!
//! ```rust,ignore
//! use crate::services::auth::AuthService;
//!
//! let outcome = auth.signup(request).await?;
//! auth.confirm_email(ConfirmEmailRequest { email, code: outcome.code }).await?;
//! ```

pub mod auth_service;

pub use auth_service::{AuthService, SignupOutcome};
