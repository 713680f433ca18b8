//! # Domain Entities Module
//!
//! MongoDB 컬렉션과 1:1로 대응되는 문서 구조체들을 정의합니다.
//!
//! ## 공통 규칙
//!
//! 모든 엔티티 문서는 다음 필드를 공유합니다.
//!
//! | 필드 | 의미 |
//! |------|------|
//! | `_id` | 생성 시 리포지토리가 부여하는 `ObjectId` |
//! | `createdBy` / `updatedBy` | 작업을 수행한 사용자 (호출자가 지정) |
//! | `freezedAt` / `restoredAt` | 보관(소프트 삭제)/복원 시각. 동시에 존재하지 않음 |
//! | `createdAt` / `updatedAt` | 타임스탬프 훅이 관리 |
//! | `__v` | 생성 시 0, 변경 작업마다 정확히 1씩 증가 |
//!
//! 필드 이름은 `serde(rename_all = "camelCase")`로 저장소 표기와 맞춥니다.
//!
//! ## 모듈 구조
//!
//! ```text
//! entities/
//! ├── mod.rs          ← Entity trait
//! ├── reference.rs    ← Reference<T> (id 또는 populate된 문서)
//! ├── catalog/        ← Brand, Category, Product
//! └── users/          ← User, Otp, Token
//! ```

pub mod catalog;
pub mod reference;
pub mod users;

pub use catalog::{Brand, Category, Product};
pub use reference::Reference;
pub use users::{Gender, Language, Otp, OtpType, Provider, Role, Token, User};

use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repositories::hooks::HookPipeline;

/// 리포지토리가 다룰 수 있는 문서 타입
///
/// 컬렉션 이름과 스키마 훅(슬러그, 소프트 삭제, 해싱, 타임스탬프)을 선언합니다.
/// 훅은 선언 순서대로 실행됩니다.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// 저장 컬렉션 이름
    const COLLECTION: &'static str;

    /// 로그와 에러 메시지에 쓰이는 모델 이름
    const MODEL_NAME: &'static str;

    /// 이 엔티티에 적용되는 훅 파이프라인
    fn hooks() -> HookPipeline;

    fn id(&self) -> Option<ObjectId>;
}
