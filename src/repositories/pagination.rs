//! 페이지네이션 입력 보정과 결과 형식

use serde::Serialize;

use crate::config::DEFAULT_PAGE_SIZE;

/// 요청 페이지
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Page {
    /// 페이지를 나누지 않고 모든 문서를 반환
    #[default]
    All,
    /// 1부터 시작하는 페이지 번호. 잘못된 값은 1로 보정됩니다.
    Number(f64),
}

impl Page {
    /// 쿼리 문자열 값을 해석합니다. 없거나 `"all"`이면 [`Page::All`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Page::All,
            Some(value) if value.eq_ignore_ascii_case("all") => Page::All,
            Some(value) => Page::Number(value.parse().unwrap_or(f64::NAN)),
        }
    }
}

impl From<f64> for Page {
    fn from(page: f64) -> Self {
        Page::Number(page)
    }
}

impl From<i64> for Page {
    fn from(page: i64) -> Self {
        Page::Number(page as f64)
    }
}

/// 보정된 페이지 번호와 크기
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u64,
    size: u64,
}

impl PageWindow {
    /// 페이지는 1 이상, 크기는 1 이상으로 보정하고 소수점은 버립니다.
    /// 유한하지 않거나 범위를 벗어난 값은 각각 1과 기본 크기(5)가 됩니다.
    pub fn new(page: f64, size: Option<f64>) -> Self {
        let page = if page.is_finite() && page >= 1.0 {
            page.floor() as u64
        } else {
            1
        };
        let size = match size {
            Some(size) if size.is_finite() && size >= 1.0 => size.floor() as u64,
            _ => DEFAULT_PAGE_SIZE,
        };

        Self { page, size }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn pages(&self, docs_count: u64) -> u64 {
        docs_count.div_ceil(self.size)
    }
}

/// 페이지네이션 결과
///
/// [`Page::All`] 요청이면 개수 관련 필드는 모두 `None`이고 직렬화에서 빠집니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<P> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    pub result: Vec<P>,
}

impl<P> Paginated<P> {
    pub fn all(result: Vec<P>) -> Self {
        Self {
            docs_count: None,
            limit: None,
            pages: None,
            current_page: None,
            result,
        }
    }

    pub fn page(window: PageWindow, docs_count: u64, result: Vec<P>) -> Self {
        Self {
            docs_count: Some(docs_count),
            limit: Some(window.size()),
            pages: Some(window.pages(docs_count)),
            current_page: Some(window.page()),
            result,
        }
    }

    pub fn map<Q>(self, f: impl FnMut(P) -> Q) -> Paginated<Q> {
        Paginated {
            docs_count: self.docs_count,
            limit: self.limit,
            pages: self.pages,
            current_page: self.current_page,
            result: self.result.into_iter().map(f).collect(),
        }
    }
}
