//! 리포지토리 메서드 인자
//!
//! 모든 리포지토리 메서드는 인자 구조체 하나를 받습니다.
//! `Default`와 구조체 갱신 문법, 또는 작은 빌더 메서드로 만듭니다.
//!
//! ```rust,ignore
//! let page = brands
//!     .paginate::<Lean>(PaginateArgs {
//!         filter: doc! { "paranoId": false, "freezedAt": { "$exists": true } },
//!         page: Page::Number(2.0),
//!         size: Some(5.0),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

use mongodb::bson::{Document, oid::ObjectId};

use crate::db::Update;

use super::pagination::Page;
use super::populate::PopulateOptions;

/// 조회 공통 옵션
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub populate: Vec<PopulateOptions>,
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct FindArgs {
    pub filter: Document,
    pub select: Option<Document>,
    pub options: QueryOptions,
}

/// 단건 조회 인자. 다건 조회와 같은 모양입니다.
pub type FindOneArgs = FindArgs;

impl FindArgs {
    pub fn new(filter: Document) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn select(mut self, select: Document) -> Self {
        self.select = Some(select);
        self
    }

    pub fn populate(mut self, populate: PopulateOptions) -> Self {
        self.options.populate.push(populate);
        self
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.options.sort = Some(sort);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FindByIdArgs {
    pub id: ObjectId,
    pub select: Option<Document>,
    pub options: QueryOptions,
}

impl FindByIdArgs {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            select: None,
            options: QueryOptions::default(),
        }
    }

    pub fn populate(mut self, populate: PopulateOptions) -> Self {
        self.options.populate.push(populate);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaginateArgs {
    pub filter: Document,
    pub select: Option<Document>,
    pub options: QueryOptions,
    pub page: Page,
    /// 페이지 크기. 없거나 잘못된 값이면 기본 크기를 씁니다.
    pub size: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// `Some(false)`면 중간 실패 뒤의 문서도 계속 삽입합니다.
    pub ordered: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct CreateArgs<E> {
    pub data: Vec<E>,
    pub options: CreateOptions,
}

impl<E> CreateArgs<E> {
    pub fn one(entity: E) -> Self {
        Self::many(vec![entity])
    }

    pub fn many(data: Vec<E>) -> Self {
        Self {
            data,
            options: CreateOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub upsert: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateArgs {
    pub filter: Document,
    pub update: Update,
    pub options: WriteOptions,
}

/// 조회 후 수정 옵션
#[derive(Debug, Clone)]
pub struct UpdateQueryOptions {
    /// `true`(기본값)면 수정 후 문서, `false`면 수정 전 문서를 돌려줍니다.
    pub new: bool,
    pub upsert: bool,
    pub populate: Vec<PopulateOptions>,
    pub select: Option<Document>,
    pub sort: Option<Document>,
}

impl Default for UpdateQueryOptions {
    fn default() -> Self {
        Self {
            new: true,
            upsert: false,
            populate: Vec::new(),
            select: None,
            sort: None,
        }
    }
}

impl UpdateQueryOptions {
    /// 수정 전 문서를 돌려받습니다.
    pub fn previous() -> Self {
        Self {
            new: false,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FindOneAndUpdateArgs {
    pub filter: Document,
    pub update: Update,
    pub options: UpdateQueryOptions,
}

#[derive(Debug, Clone)]
pub struct FindByIdAndUpdateArgs {
    pub id: ObjectId,
    /// 없으면 버전과 타임스탬프만 갱신됩니다.
    pub update: Option<Update>,
    pub options: UpdateQueryOptions,
}

impl FindByIdAndUpdateArgs {
    pub fn new(id: ObjectId, update: impl Into<Update>) -> Self {
        Self {
            id,
            update: Some(update.into()),
            options: UpdateQueryOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteArgs {
    pub filter: Document,
}

/// 보관(freeze) 인자
#[derive(Debug, Clone)]
pub struct FreezeArgs {
    pub filter: Document,
    pub updated_by: ObjectId,
}

/// 복원(restore) 인자
pub type RestoreArgs = FreezeArgs;
