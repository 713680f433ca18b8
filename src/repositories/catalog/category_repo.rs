//! 카테고리 리포지토리

use crate::db::IndexSpec;
use crate::domain::entities::Category;

entity_repository! {
    /// 카테고리 데이터 액세스 리포지토리 (`categories`, 이름 유니크)
    CategoryRepository<Category> {
        name: "category",
        indexes: [IndexSpec::unique("name")],
    }
}
