//! # 슬러그 생성
//!
//! 이름을 URL에 안전한 슬러그로 바꿉니다.
//!
//! 1. 자주 쓰이는 라틴 문자는 ASCII로 음역합니다 (`è` → `e`, `ß` → `ss`, `&` → `and`).
//! 2. `-`는 공백과 같은 구분자로 취급합니다.
//! 3. `[a-z0-9]`와 공백 이외의 문자는 제거합니다.
//! 4. 앞뒤 공백을 없애고, 연속 공백은 `-` 하나로 합친 뒤 소문자로 만듭니다.
//!
//! ```rust,ignore
//! assert_eq!(slugify("My Cool Brand!"), "my-cool-brand");
//! ```

/// 이름으로부터 슬러그를 만듭니다.
pub fn slugify(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());

    for ch in input.to_lowercase().chars() {
        if let Some(replacement) = transliterate(ch) {
            cleaned.push_str(replacement);
        } else if ch.is_ascii_alphanumeric() {
            cleaned.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            cleaned.push(' ');
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

fn transliterate(ch: char) -> Option<&'static str> {
    let replacement = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        '&' => " and ",
        _ => return None,
    };

    Some(replacement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("My Cool Brand!"), "my-cool-brand");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn test_hyphen_is_a_separator() {
        assert_eq!(slugify("Foo - Bar--Baz"), "foo-bar-baz");
    }

    #[test]
    fn test_strips_symbols() {
        assert_eq!(slugify("C++ / Rust_lang (2024)"), "c-rustlang-2024");
    }

    #[test]
    fn test_transliteration() {
        assert_eq!(slugify("Caffè Crème"), "caffe-creme");
        assert_eq!(slugify("Straße"), "strasse");
        assert_eq!(slugify("Salt & Pepper"), "salt-and-pepper");
    }

    #[test]
    fn test_non_latin_is_dropped() {
        assert_eq!(slugify("브랜드 Acme"), "acme");
        assert_eq!(slugify("!!!"), "");
    }
}
