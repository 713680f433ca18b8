//! OTP 리포지토리

use mongodb::bson::{DateTime, doc, oid::ObjectId};

use crate::db::{DocumentStore, IndexSpec};
use crate::domain::entities::{Otp, OtpType};
use crate::errors::AppResult;
use crate::repositories::{FindOneArgs, Hydrated};

entity_repository! {
    /// 일회용 코드 리포지토리 (`otps`, `expiredAt` TTL)
    OtpRepository<Otp> {
        name: "otp",
        indexes: [IndexSpec::ttl("expiredAt")],
    }
}

impl<S: DocumentStore> OtpRepository<S> {
    /// 아직 만료되지 않은 사용자의 OTP
    pub async fn find_live(&self, created_by: ObjectId, otp_type: OtpType) -> AppResult<Option<Hydrated<Otp>>> {
        self.find_one(FindOneArgs::new(doc! {
            "createdBy": created_by,
            "type": otp_type.as_str(),
            "expiredAt": { "$gt": DateTime::now() },
        }))
        .await
    }
}
