//! # 사용자 관련 응답 DTO 모듈
//!
//! 엔티티에서 외부에 노출할 필드만 골라 담습니다.
//! 비밀번호 해시와 OTP 목록은 응답에 포함하지 않습니다.
//!
//! ```json
//! {
//!   "id": "507f1f77bcf86cd799439011",
//!   "username": "Jane Doe",
//!   "email": "jane@example.com",
//!   "provide": "SYSTEM",
//!   "role": "user",
//!   "confirmed": false
//! }
//! ```

pub mod user_response;

pub use user_response::UserResponse;
