//! 사용자 계정과 일회용 코드(OTP) 리포지토리
//!
//! 두 컬렉션 모두 보관(soft delete)을 지원하지 않습니다.

pub mod otp_repo;
pub mod user_repo;

pub use otp_repo::OtpRepository;
pub use user_repo::UserRepository;
