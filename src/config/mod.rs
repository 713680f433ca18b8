//! # Configuration Module
//!
//! 환경 변수 기반 설정 접근자를 제공합니다.
//! `main`에서 `PROFILE`에 맞는 `.env` 파일을 먼저 읽은 뒤 사용합니다.

pub mod data_config;

pub use data_config::*;
