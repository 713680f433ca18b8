//! # 사용자 리포지토리 구현
//!
//! `users` 컬렉션의 데이터 액세스 계층입니다.
//!
//! ## 특징
//!
//! - **이메일 유니크 인덱스**: 같은 이메일로 두 계정을 만들 수 없음
//! - **비밀번호 해싱**: 저장 훅이 `password`가 바뀔 때마다 bcrypt로 해시
//! - **OTP 가상 필드**: `otp`는 `Otp.createdBy → User._id` 관계로 populate

use mongodb::bson::doc;

use crate::db::{DocumentStore, IndexSpec};
use crate::domain::entities::{Otp, User};
use crate::errors::AppResult;
use crate::repositories::{FindOneArgs, PopulateOptions, Projection};

entity_repository! {
    /// 사용자 데이터 액세스 리포지토리
    ///
    /// ## 에러 처리
    ///
    /// 조회 결과가 없으면 `Ok(None)`을 돌려주며, 서비스가 이를 `NotFound`로 바꿉니다.
    /// 중복 이메일 삽입은 유니크 인덱스에 막혀 `DatabaseError`로 전파됩니다.
    UserRepository<User> {
        name: "user",
        indexes: [IndexSpec::unique("email")],
    }
}

impl<S: DocumentStore> UserRepository<S> {
    /// 이메일 주소로 사용자 조회
    ///
    /// # 예제
    ///
    /// ```rust,ignore
    /// let user: Option<Hydrated<User>> = users.find_by_email("alice@example.com").await?;
    /// ```
    pub async fn find_by_email<P: Projection<User>>(&self, email: &str) -> AppResult<Option<P>> {
        self.find_one(FindOneArgs::new(doc! { "email": email })).await
    }

    /// 사용자의 OTP 목록을 채우는 populate 정의
    pub fn otp_population() -> PopulateOptions {
        PopulateOptions::virtual_field::<Otp>("otp", "_id", "createdBy")
    }
}
