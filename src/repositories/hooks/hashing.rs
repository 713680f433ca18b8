//! 민감 필드 bcrypt 해싱 훅
//!
//! 사용자 비밀번호와 OTP 코드처럼 평문으로 저장하면 안 되는 필드를
//! 저장 직전에 해시로 바꿉니다. 비용 계수는 [`PasswordConfig`]를 따릅니다.

use bcrypt::{hash, verify};
use mongodb::bson::Document;

use super::{Changes, DocumentHook};
use crate::config::PasswordConfig;
use crate::errors::{AppResult, ErrorContext};

pub struct HashFieldHook {
    field: &'static str,
    cost: Option<u32>,
}

impl HashFieldHook {
    /// 비용 계수는 해싱 시점의 [`PasswordConfig::bcrypt_cost`]를 사용합니다.
    pub fn new(field: &'static str) -> Self {
        Self { field, cost: None }
    }

    pub fn with_cost(field: &'static str, cost: u32) -> Self {
        Self {
            field,
            cost: Some(cost),
        }
    }
}

impl DocumentHook for HashFieldHook {
    fn name(&self) -> &'static str {
        "hash-field"
    }

    fn on_save(&self, document: &mut Document, changes: &Changes) -> AppResult<()> {
        if !changes.is_modified(self.field) {
            return Ok(());
        }

        if let Ok(plain) = document.get_str(self.field) {
            let cost = self.cost.unwrap_or_else(PasswordConfig::bcrypt_cost);
            let hashed = hash(plain, cost).with_context(|| format!("{} 해싱 실패", self.field))?;
            document.insert(self.field, hashed);
        }

        Ok(())
    }
}

/// 평문과 저장된 해시를 비교합니다.
pub fn compare_hash(plain: &str, hashed: &str) -> AppResult<bool> {
    verify(plain, hashed).context("해시 비교 실패")
}
