//! 데이터 저장소 및 런타임 설정
//!
//! 환경 변수에서 읽어 들이는 정적 설정 접근자들을 모아 둔 모듈입니다.
//! 모든 접근자는 값이 없거나 잘못된 경우 안전한 기본값으로 대체합니다.
//!
//! | 설정 | 환경 변수 | 기본값 |
//! |------|-----------|--------|
//! | [`DatabaseConfig`] | `MONGODB_URI`, `DATABASE_NAME`, `MONGODB_APP_NAME`, `MONGODB_SERVER_SELECTION_TIMEOUT_MS` | `mongodb://localhost:27017`, `catalog_dev`, `catalog_backend`, 5000 |
//! | [`PasswordConfig`] | `BCRYPT_COST` | 환경별 (4/4/10/12) |
//! | [`ServerConfig`] | `HOST`, `PORT` | `0.0.0.0`, 8080 |
//! | [`StorageConfig`] | `ASSET_ROOT`, `UPLOAD_CONCURRENCY` | `./uploads`, 4 |
//! | [`OtpConfig`] | `OTP_TTL_SECONDS` | 120 |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 페이지 크기를 지정하지 않았거나 잘못된 값을 넘겼을 때 사용하는 기본 페이지 크기
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// `ENVIRONMENT` 환경 변수에서 현재 실행 환경을 결정합니다.
    ///
    /// 값이 없으면 `PROFILE`을 확인하고, 그래도 없으면 `Production`으로 간주합니다.
    pub fn current() -> Self {
        let raw = env::var("ENVIRONMENT")
            .or_else(|_| env::var("PROFILE"))
            .unwrap_or_else(|_| "production".to_string());

        Self::from_str(&raw)
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

/// MongoDB 연결 설정
pub struct DatabaseConfig;

impl DatabaseConfig {
    pub fn uri() -> String {
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    pub fn database_name() -> String {
        env::var("DATABASE_NAME").unwrap_or_else(|_| "catalog_dev".to_string())
    }

    /// 드라이버 핸드셰이크에 실리는 애플리케이션 이름 (서버 로그/모니터링용)
    pub fn app_name() -> String {
        env::var("MONGODB_APP_NAME").unwrap_or_else(|_| "catalog_backend".to_string())
    }

    /// 서버 선택/연결 대기 시간. 프로세스 전역으로 적용됩니다.
    pub fn server_selection_timeout() -> Duration {
        let millis = env::var("MONGODB_SERVER_SELECTION_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(5_000);

        Duration::from_millis(millis)
    }
}

/// 비밀번호 및 OTP 해싱 설정
pub struct PasswordConfig;

impl PasswordConfig {
    /// bcrypt 비용 계수를 반환합니다.
    ///
    /// `BCRYPT_COST`가 4..=15 범위의 값이면 그대로 사용하고,
    /// 아니면 실행 환경별 기본값을 사용합니다.
    pub fn bcrypt_cost() -> u32 {
        if let Ok(cost_str) = env::var("BCRYPT_COST") {
            if let Ok(cost) = cost_str.parse::<u32>() {
                if (4..=15).contains(&cost) {
                    return cost;
                }
            }
        }

        Self::bcrypt_cost_for_env(&Environment::current())
    }

    pub fn bcrypt_cost_for_env(env: &Environment) -> u32 {
        match env {
            Environment::Development => 4,
            Environment::Test => 4,
            Environment::Staging => 10,
            Environment::Production => 12,
        }
    }
}

/// HTTP 서버 설정
pub struct ServerConfig;

impl ServerConfig {
    pub fn port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(8080)
    }

    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
    }
}

/// 자산(이미지) 저장소 설정
pub struct StorageConfig;

impl StorageConfig {
    /// 로컬 자산 저장소의 루트 디렉터리
    pub fn root() -> PathBuf {
        env::var("ASSET_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"))
    }

    /// 여러 파일을 올릴 때 동시에 진행할 업로드 수
    pub fn upload_concurrency() -> usize {
        env::var("UPLOAD_CONCURRENCY")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(4)
    }
}

/// 일회용 코드(OTP) 설정
pub struct OtpConfig;

impl OtpConfig {
    /// OTP 유효 시간 (기본 2분)
    pub fn ttl() -> Duration {
        let seconds = env::var("OTP_TTL_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(120);

        Duration::from_secs(seconds)
    }
}
