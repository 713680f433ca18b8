//! # Core Framework Module
//!
//! 애플리케이션 전역 의존성을 보관하는 [`registry`] 모듈을 제공합니다.
//!
//! - [`ServiceLocator`]: `TypeId` 기반 싱글톤 레지스트리
//! - [`Repository`]: 리포지토리 초기화(인덱스 생성) 인터페이스

pub mod registry;

pub use registry::*;
