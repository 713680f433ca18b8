//! # Domain Layer Module
//!
//! 카탈로그와 사용자 도메인의 문서 엔티티를 담는 계층입니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Entities      - MongoDB 문서와 1:1 대응되는 엔티티 + Entity trait
//! └── DTO           - 서비스 입력 검증(validator)과 응답 형식
//!      │
//!      ▼
//! Repositories     - 엔티티별 훅 파이프라인을 실행하는 제네릭 리포지토리
//!      │
//!      ▼
//! Services         - 중복 검사, 자산 업로드, 인증 흐름
//! ```

pub mod dto;
pub mod entities;

pub use entities::*;
