//! 카탈로그 백엔드
//!
//! MongoDB 위에 올린 범용 문서 리포지토리와, 이를 사용하는 카탈로그/인증 서비스입니다.
//! 리포지토리는 모든 쿼리에 보관(soft-delete) 조건을 덧붙이고, 변경 작업마다
//! 문서 버전(`__v`)을 하나씩 올립니다.
//!
//! # Features
//!
//! - **범용 리포지토리**: 조회, 페이지네이션, 생성, 수정, 저장, 보관/복원, 삭제
//! - **훅 파이프라인**: 보관 필터, 슬러그, 타임스탬프, 해시 필드
//! - **Lean / Hydrated**: 결과 형태를 타입으로 선택
//! - **카탈로그**: 브랜드, 카테고리, 상품과 이미지 자산 관리
//! - **인증**: 가입, OTP 이메일 인증, 로그인, 토큰 폐기 목록
//! - **저장소 추상화**: MongoDB 드라이버와 테스트용 인메모리 저장소
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    Services     │ ← 카탈로그/인증 비즈니스 규칙
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 훅 파이프라인, 버전, populate
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  DocumentStore  │ ← MongoStore / MemoryStore
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use catalog_backend::db::MemoryStore;
//! use catalog_backend::repositories::{BrandRepository, CreateArgs};
//!
//! let brands = BrandRepository::new(Arc::new(MemoryStore::new()));
//! let created = brands.create(CreateArgs::one(Brand::new("Acme", "brand/a.png", user))).await?;
//! assert_eq!(created[0].slug.as_deref(), Some("acme"));
//! ```

pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;
