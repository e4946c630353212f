//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키 (필수)
//! - `MEDIA_PATH`: 레시피 이미지 저장 디렉토리
//! - `MEDIA_URL`: 이미지 URL 접두사
//! - `INGREDIENTS_CSV`: 시작 시 재료 카탈로그를 채울 CSV 파일 (선택)
//! - `HOST`, `PORT`: 서버 바인딩 주소
//! - `MIN_AMOUNT`, `MAX_AMOUNT`, `MIN_COOKING_TIME`, `MAX_COOKING_TIME`,
//!   `MAX_RECIPE_NAME_LEN`: 레시피 검증 범위

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// 설정 로딩 실패
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(#[from] env::VarError),

    #[error("Invalid limits: {0}")]
    InvalidLimits(String),
}

/// 레시피 검증에 사용하는 수치 범위
///
/// 양 끝 값을 포함합니다 (`min..=max`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min_amount: i64,
    pub max_amount: i64,
    pub min_cooking_time: i64,
    pub max_cooking_time: i64,
    pub max_recipe_name_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_amount: 1,
            max_amount: 32_000,
            min_cooking_time: 1,
            max_cooking_time: 32_000,
            max_recipe_name_len: 200,
        }
    }
}

impl Limits {
    /// 환경변수로 기본값을 덮어씁니다. 파싱할 수 없는 값은 기본값을 유지합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Self {
            min_amount: var_or("MIN_AMOUNT", defaults.min_amount),
            max_amount: var_or("MAX_AMOUNT", defaults.max_amount),
            min_cooking_time: var_or("MIN_COOKING_TIME", defaults.min_cooking_time),
            max_cooking_time: var_or("MAX_COOKING_TIME", defaults.max_cooking_time),
            max_recipe_name_len: var_or("MAX_RECIPE_NAME_LEN", defaults.max_recipe_name_len),
        }
        .validated()
    }

    /// DB의 CHECK 제약(`amount > 0`, `cooking_time > 0`)보다 느슨한 범위는 허용하지 않습니다.
    ///
    /// 하한은 1로 끌어올리고, 뒤집힌 범위나 길이 0은 에러입니다.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let limits = Self {
            min_amount: self.min_amount.max(1),
            min_cooking_time: self.min_cooking_time.max(1),
            ..self
        };

        if limits.min_amount > limits.max_amount {
            return Err(ConfigError::InvalidLimits(format!(
                "MIN_AMOUNT ({}) is greater than MAX_AMOUNT ({})",
                limits.min_amount, limits.max_amount
            )));
        }
        if limits.min_cooking_time > limits.max_cooking_time {
            return Err(ConfigError::InvalidLimits(format!(
                "MIN_COOKING_TIME ({}) is greater than MAX_COOKING_TIME ({})",
                limits.min_cooking_time, limits.max_cooking_time
            )));
        }
        if limits.max_recipe_name_len == 0 {
            return Err(ConfigError::InvalidLimits(
                "MAX_RECIPE_NAME_LEN must be at least 1".to_string(),
            ));
        }

        if limits != self {
            tracing::warn!(?limits, "recipe limit minimums raised to 1");
        }
        Ok(limits)
    }
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 파일 경로 (예: "sqlite:data/foodgram.db")
    pub database_url: String,
    /// JWT 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 업로드된 레시피 이미지가 저장되는 디렉토리
    pub media_path: String,
    /// 이미지 URL 접두사 (기본값: "/media")
    pub media_url: String,
    /// 재료 카탈로그 시드 CSV (`name,unit` 형식)
    pub ingredients_csv: Option<String>,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 8000)
    pub port: u16,
    /// 레시피 검증 범위
    pub limits: Limits,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    /// 검증 범위가 모순되면 서버를 띄우지 않습니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            media_path: env::var("MEDIA_PATH").unwrap_or_else(|_| "data/media".to_string()),
            media_url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
            // 빈 문자열은 "설정 안 함"으로 취급
            ingredients_csv: env::var("INGREDIENTS_CSV").ok().filter(|p| !p.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: var_or("PORT", 8000),
            limits: Limits::from_env()?,
        })
    }
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
