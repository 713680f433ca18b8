//! 인증 요청관련 DTO
//!
//! 회원가입, 이메일 확인, 로그인을 요청하는 사용자들의 요청 정보를 매핑합니다.
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 회원가입 요청 구조체
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_passwords_match"))]
pub struct SignupRequest {
    /// "이름 성" 형태의 사용자명 (2-52자)
    #[validate(length(min = 2, max = 52, message = "사용자명은 2-52자 사이여야 합니다"))]
    pub username: String,

    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    /// 비밀번호 확인 (password와 일치해야 함)
    pub confirm_password: String,
}

/// 로컬 로그인 요청 구조체
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
}

/// 이메일 확인 요청 구조체
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmEmailRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    /// 메일로 받은 6자리 숫자 코드
    #[validate(custom(function = "validate_otp_code"))]
    pub code: String,
}

/// 확인 코드 재발송 요청 구조체
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResendConfirmEmailRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
}

/// 비밀번호 일치 여부를 검증
fn validate_passwords_match(req: &SignupRequest) -> Result<(), ValidationError> {
    if req.password != req.confirm_password {
        return Err(ValidationError::new("passwords_mismatch")
            .with_message("비밀번호가 일치하지 않습니다".into()));
    }
    Ok(())
}

/// 비밀번호 보안 강도 검증 (8자 이상, 대문자, 소문자, 숫자, 특수문자 필수 포함)
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(long_enough && has_uppercase && has_lowercase && has_digit && has_symbol) {
        return Err(ValidationError::new("weak_password").with_message(
            "비밀번호는 8자 이상이며 대문자, 소문자, 숫자, 특수문자를 포함해야 합니다".into(),
        ));
    }

    Ok(())
}

fn validate_otp_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("invalid_code")
            .with_message("확인 코드는 숫자 6자리입니다".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            username: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_valid_signup() {
        assert!(signup("Str0ng!Pass", "Str0ng!Pass").validate().is_ok());
    }

    #[test]
    fn test_password_mismatch() {
        let errors = signup("Str0ng!Pass", "Str0ng!Pazz").validate().unwrap_err();

        assert!(errors.to_string().contains("비밀번호가 일치하지 않습니다"));
    }

    #[test]
    fn test_weak_passwords() {
        assert!(validate_password_strength("short1!A").is_ok());
        assert!(validate_password_strength("alllowercase1!").is_err());
        assert!(validate_password_strength("NoDigits!!").is_err());
        assert!(validate_password_strength("NoSymbol123").is_err());
        assert!(validate_password_strength("S1!a").is_err());
    }

    #[test]
    fn test_otp_code_format() {
        let ok = ConfirmEmailRequest {
            email: "jane@example.com".to_string(),
            code: "012345".to_string(),
        };
        assert!(ok.validate().is_ok());

        for code in ["12345", "1234567", "12a456"] {
            let bad = ConfirmEmailRequest {
                email: "jane@example.com".to_string(),
                code: code.to_string(),
            };
            assert!(bad.validate().is_err(), "{} should be rejected", code);
        }
    }

    #[test]
    fn test_invalid_email() {
        let request = ResendConfirmEmailRequest {
            email: "not-an-email".to_string(),
        };

        assert!(request.validate().is_err());
    }
}
