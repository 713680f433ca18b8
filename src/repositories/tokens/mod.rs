//! 폐기된 토큰 리포지토리 모듈
//!
//! 로그아웃 등으로 무효화된 토큰의 `jti`를 만료 시각까지 보관합니다.
//! `expiredAt` TTL 인덱스가 만료된 기록을 정리합니다.
//!
//! # Usage
//!
//! ```rust,ignore
//! let tokens = TokenRepository::new(store.clone());
//! tokens.revoke("jwt-id", expires_at, user_id).await?;
//! assert!(tokens.is_revoked("jwt-id").await?);
//! ```

pub mod token_repository;

pub use token_repository::*;
