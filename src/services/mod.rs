//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스는 엔티티 리포지토리와 자산 저장소를 조합해 도메인 규칙을 적용합니다.
//! 리포지토리의 `None`을 도메인 에러로 바꾸고, 여러 단계로 이루어진 작업이
//! 중간에 실패하면 앞 단계의 결과(업로드한 파일 등)를 직접 정리합니다.
//!
//! # Modules
//!
//! - [`auth`]: 가입, 이메일 인증, 로그인
//! - [`catalog`]: 브랜드, 카테고리, 상품
//! - [`storage`]: 이미지 자산 저장소 계약과 로컬 구현
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::core::registry::ServiceLocator;
//! use crate::services::catalog::BrandService;
//!
//! let brands = ServiceLocator::get::<BrandService>();
//! let page = brands.find_all(FindAllQuery::default(), false).await?;
//! ```

pub mod auth;
pub mod catalog;
pub mod storage;
