//! # 인증 서비스 구현
//!
//! 이메일 가입과 확인, 로그인을 담당합니다.
//!
//! ## 가입 흐름
//!
//! ```text
//! signup ──▶ 이메일 중복 확인 ──▶ 사용자 생성(비밀번호 해시) ──▶ 확인 OTP 생성
//!                                                                  │
//! confirm_email ◀── 코드 비교(bcrypt) ◀── 사용자 + 유효 OTP 조회 ◀──┘
//!       │
//!       └──▶ confirmAt 기록 ──▶ OTP 삭제
//! ```
//!
//! 메일 발송은 이 서비스의 범위가 아니므로 생성된 코드를 호출자에게 돌려줍니다.
//! 토큰 발급도 외부에서 이루어지며, 여기서는 폐기 목록만 관리합니다.

use log::{info, warn};
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use rand::Rng;
use validator::Validate;

use crate::config::OtpConfig;
use crate::db::{DocumentStore, MongoStore};
use crate::domain::dto::users::{
    ConfirmEmailRequest, LoginRequest, ResendConfirmEmailRequest, SignupRequest, UserResponse,
};
use crate::domain::entities::{Otp, OtpType, User};
use crate::errors::{AppError, AppResult};
use crate::repositories::hooks::compare_hash;
use crate::repositories::{
    CreateArgs, DeleteArgs, FindOneArgs, Hydrated, OtpRepository, TokenRepository, UserRepository,
};

/// 가입 결과. `code`는 확인 메일에 실릴 평문 OTP입니다.
#[derive(Debug)]
pub struct SignupOutcome {
    pub user: Hydrated<User>,
    pub code: String,
}

/// 인증 비즈니스 로직 서비스
pub struct AuthService<S: DocumentStore = MongoStore> {
    users: UserRepository<S>,
    otps: OtpRepository<S>,
    tokens: TokenRepository<S>,
}

impl<S: DocumentStore> AuthService<S> {
    pub fn new(users: UserRepository<S>, otps: OtpRepository<S>, tokens: TokenRepository<S>) -> Self {
        Self { users, otps, tokens }
    }

    /// 새 계정 가입
    ///
    /// # Errors
    ///
    /// * `ConflictError("Email Exists")` - 이미 가입된 이메일
    /// * `BadRequestError("Fail To Signup This Account")` - 생성 결과 없음
    pub async fn signup(&self, request: SignupRequest) -> AppResult<SignupOutcome> {
        request.validate()?;

        if self.users.exists(doc! { "email": request.email.as_str() }).await? {
            return Err(AppError::ConflictError("Email Exists".to_string()));
        }

        let user = self
            .users
            .create(CreateArgs::one(User::new_system(
                &request.username,
                request.email,
                request.password,
            )))
            .await?
            .pop()
            .ok_or_else(|| AppError::BadRequestError("Fail To Signup This Account".to_string()))?;

        let user_id = user
            .id
            .ok_or_else(|| AppError::InternalError("생성된 사용자에 _id가 없습니다".to_string()))?;
        let code = self.create_confirm_email_otp(user_id).await?;

        info!("계정 가입: {}", user.email);
        Ok(SignupOutcome { user, code })
    }

    /// 확인 코드로 이메일을 인증합니다.
    pub async fn confirm_email(&self, request: ConfirmEmailRequest) -> AppResult<()> {
        request.validate()?;

        let mut user = self
            .find_unconfirmed(&request.email)
            .await?
            .ok_or_else(|| AppError::NotFound("Account Not Exists".to_string()))?;

        let otp_id = match user.otps().first() {
            Some(otp) if compare_hash(&request.code, &otp.code)? => otp.id,
            _ => return Err(AppError::BadRequestError("Invalid Code".to_string())),
        };

        user.confirm_at = Some(DateTime::now());
        self.users.save(&mut user).await?;

        if let Some(otp_id) = otp_id {
            self.otps
                .delete_one(DeleteArgs {
                    filter: doc! { "_id": otp_id },
                })
                .await?;
        }

        info!("이메일 인증 완료: {}", user.email);
        Ok(())
    }

    /// 확인 코드를 다시 발급합니다. 유효한 코드가 남아 있으면 거절합니다.
    pub async fn resend_confirm_email(&self, request: ResendConfirmEmailRequest) -> AppResult<String> {
        request.validate()?;

        let user = self
            .find_unconfirmed(&request.email)
            .await?
            .ok_or_else(|| AppError::NotFound("Account Not Exists".to_string()))?;

        if !user.otps().is_empty() {
            return Err(AppError::ConflictError("Sorry Please Try Again Later".to_string()));
        }

        let user_id = user
            .id
            .ok_or_else(|| AppError::InternalError("사용자에 _id가 없습니다".to_string()))?;
        self.create_confirm_email_otp(user_id).await
    }

    /// 인증을 마친 일반(SYSTEM) 계정으로 로그인합니다.
    ///
    /// 계정이 없을 때와 비밀번호가 틀렸을 때 같은 에러를 돌려줍니다.
    pub async fn login(&self, request: LoginRequest) -> AppResult<UserResponse> {
        request.validate()?;

        let user = self
            .users
            .find_one::<Hydrated<User>>(FindOneArgs::new(doc! {
                "email": request.email.as_str(),
                "confirmAt": { "$exists": true },
                "provide": "SYSTEM",
            }))
            .await?;

        let Some(user) = user else {
            return Err(account_not_found());
        };

        let hashed = user.password.as_deref().unwrap_or_default();
        if hashed.is_empty() || !compare_hash(&request.password, hashed)? {
            warn!("로그인 실패: {}", request.email);
            return Err(account_not_found());
        }

        info!("로그인 성공: {}", user.email);
        Ok(UserResponse::from(&*user))
    }

    /// 토큰을 폐기 목록에 올립니다. `expired_at`은 원래 토큰의 만료 시각입니다.
    pub async fn revoke_token(&self, jti: &str, expired_at: DateTime, user: ObjectId) -> AppResult<()> {
        self.tokens.revoke(jti, expired_at, user).await?;
        info!("토큰 폐기: {}", jti);
        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: &str) -> AppResult<bool> {
        self.tokens.is_revoked(jti).await
    }

    /// 아직 인증하지 않은 계정과 유효한 확인 OTP
    async fn find_unconfirmed(&self, email: &str) -> AppResult<Option<Hydrated<User>>> {
        let live_confirm_otp = doc! {
            "type": OtpType::ConfirmEmail.as_str(),
            "expiredAt": { "$gt": DateTime::now() },
        };

        self.users
            .find_one(
                FindOneArgs::new(doc! {
                    "email": email,
                    "confirmAt": { "$exists": false },
                })
                .populate(UserRepository::<S>::otp_population().with_match(live_confirm_otp)),
            )
            .await
    }

    async fn create_confirm_email_otp(&self, user: ObjectId) -> AppResult<String> {
        let code = generate_numeric_code();
        let ttl_millis = i64::try_from(OtpConfig::ttl().as_millis()).unwrap_or(i64::MAX);
        let expired_at =
            DateTime::from_millis(DateTime::now().timestamp_millis().saturating_add(ttl_millis));

        self.otps
            .create(CreateArgs::one(Otp::new(
                code.as_str(),
                expired_at,
                OtpType::ConfirmEmail,
                user,
            )))
            .await?;

        Ok(code)
    }
}

/// 6자리 숫자 코드
fn generate_numeric_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

fn account_not_found() -> AppError {
    AppError::NotFound("Fail To Find Matching Account".to_string())
}
