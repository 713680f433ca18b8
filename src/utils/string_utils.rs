//! # 문자열 유틸리티
//!
//! 목록 조회 검색어 처리에 쓰이는 함수들입니다.

/// 사용자 검색어를 정규식 리터럴로 바꿉니다.
///
/// 비어 있거나 공백뿐인 검색어는 `None`을 돌려주어 검색 조건을 만들지 않게 합니다.
///
/// ```rust,ignore
/// assert_eq!(search_pattern(Some(" a.b* ")), Some(r"a\.b\*".to_string()));
/// ```
pub fn search_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(regex::escape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern_escapes_metacharacters() {
        assert_eq!(search_pattern(Some(" a.b* ")), Some(r"a\.b\*".to_string()));
        assert_eq!(search_pattern(Some("  ")), None);
        assert_eq!(search_pattern(None), None);
    }

    #[test]
    fn test_search_pattern_keeps_inner_spaces() {
        assert_eq!(search_pattern(Some("cool brand")), Some("cool brand".to_string()));
    }
}
