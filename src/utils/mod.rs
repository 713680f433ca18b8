//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`slug`] - 이름 → URL 슬러그 변환
//! - [`string_utils`] - 검색어를 정규식 리터럴로 변환
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::utils::slug::slugify;
//!
//! assert_eq!(slugify("My Cool Brand!"), "my-cool-brand");
//! ```

pub mod slug;
pub mod string_utils;
