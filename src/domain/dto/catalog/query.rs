//! 목록 조회 쿼리
use mongodb::bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::repositories::Page;
use crate::utils::string_utils::search_pattern;

/// `?page=&size=&search=` 목록 조회 쿼리
///
/// `page`와 `size`의 잘못된 값은 거부하지 않고 리포지토리가 기본값으로 보정합니다.
/// `page`를 생략하거나 `all`로 주면 전체 목록을 돌려줍니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FindAllQuery {
    pub page: Option<String>,
    pub size: Option<f64>,
    #[validate(length(min = 1, message = "검색어를 입력해주세요"))]
    pub search: Option<String>,
}

impl FindAllQuery {
    pub fn page(&self) -> Page {
        Page::parse(self.page.as_deref())
    }

    /// 주어진 필드 중 하나라도 검색어를 포함하면 일치하는 필터 (대소문자 무시)
    ///
    /// 검색어는 정규식 특수 문자를 이스케이프한 리터럴로 취급합니다.
    pub fn search_filter(&self, fields: &[&str]) -> Document {
        let Some(pattern) = search_pattern(self.search.as_deref()) else {
            return Document::new();
        };

        let conditions: Vec<Bson> = fields
            .iter()
            .map(|field| {
                let mut condition = Document::new();
                condition.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
                Bson::Document(condition)
            })
            .collect();

        doc! { "$or": conditions }
    }
}
