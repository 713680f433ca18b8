//! 브랜드 요청 DTO
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::require_any_field;

/// 브랜드 생성 요청
///
/// 이미지는 본문이 아닌 업로드 파일로 따로 전달됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBrandRequest {
    /// 브랜드 이름 (2-25자)
    #[validate(length(min = 2, max = 25, message = "브랜드 이름은 2-25자 사이여야 합니다"))]
    pub name: String,

    /// 슬로건 (2-25자, 선택)
    #[validate(length(min = 2, max = 25, message = "슬로건은 2-25자 사이여야 합니다"))]
    pub slogan: Option<String>,
}

/// 브랜드 수정 요청
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_brand_update"))]
pub struct UpdateBrandRequest {
    #[validate(length(min = 2, max = 25, message = "브랜드 이름은 2-25자 사이여야 합니다"))]
    pub name: Option<String>,

    #[validate(length(min = 2, max = 25, message = "슬로건은 2-25자 사이여야 합니다"))]
    pub slogan: Option<String>,
}

impl UpdateBrandRequest {
    /// 값이 있는 필드만 담은 패치 문서
    pub fn to_patch(&self) -> Document {
        let mut patch = Document::new();
        if let Some(name) = &self.name {
            patch.insert("name", name.as_str());
        }
        if let Some(slogan) = &self.slogan {
            patch.insert("slogan", slogan.as_str());
        }
        patch
    }
}

fn validate_brand_update(req: &UpdateBrandRequest) -> Result<(), ValidationError> {
    require_any_field(&[req.name.is_some(), req.slogan.is_some()])
}
