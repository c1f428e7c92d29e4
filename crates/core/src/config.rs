//! 설정 관리 — cvewatch.toml 파싱 및 런타임 설정
//!
//! [`CvewatchConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CVEWATCH_STORAGE_DB_PATH=/var/lib/cvewatch.db` 형식)
//! 3. 설정 파일 (`cvewatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), cvewatch_core::error::CvewatchError> {
//! use cvewatch_core::config::CvewatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CvewatchConfig::load("cvewatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CvewatchConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, CvewatchError};

/// cvewatch 통합 설정
///
/// `cvewatch.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvewatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스토리지 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 어드바이저리 피드 설정
    #[serde(default)]
    pub feed: FeedConfig,
    /// 알림 설정
    #[serde(default)]
    pub notify: NotifyConfig,
    /// 워처(폴링 루프) 설정
    #[serde(default)]
    pub watcher: WatcherSectionConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl CvewatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CvewatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CvewatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CvewatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CvewatchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CvewatchError> {
        toml::from_str(toml_str).map_err(|e| {
            CvewatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CVEWATCH_{SECTION}_{FIELD}`
    /// 예: `CVEWATCH_WATCHER_POLL_INTERVAL_MINS=5`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "CVEWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "CVEWATCH_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.pid_file, "CVEWATCH_GENERAL_PID_FILE");

        // Storage
        override_string(&mut self.storage.db_path, "CVEWATCH_STORAGE_DB_PATH");

        // Feed
        override_string(&mut self.feed.base_url, "CVEWATCH_FEED_BASE_URL");
        override_u32(&mut self.feed.result_limit, "CVEWATCH_FEED_RESULT_LIMIT");
        override_u64(&mut self.feed.timeout_secs, "CVEWATCH_FEED_TIMEOUT_SECS");

        // Notify
        override_opt_string(&mut self.notify.webex_token, "CVEWATCH_NOTIFY_WEBEX_TOKEN");
        override_opt_string(
            &mut self.notify.webex_room_id,
            "CVEWATCH_NOTIFY_WEBEX_ROOM_ID",
        );
        override_u64(&mut self.notify.timeout_secs, "CVEWATCH_NOTIFY_TIMEOUT_SECS");

        // Watcher
        override_bool(&mut self.watcher.enabled, "CVEWATCH_WATCHER_ENABLED");
        override_u64(
            &mut self.watcher.poll_interval_mins,
            "CVEWATCH_WATCHER_POLL_INTERVAL_MINS",
        );
        override_usize(
            &mut self.watcher.summary_max_chars,
            "CVEWATCH_WATCHER_SUMMARY_MAX_CHARS",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "CVEWATCH_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "CVEWATCH_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "CVEWATCH_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CvewatchError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.storage.db_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.db_path".to_owned(),
                reason: "db_path must not be empty".to_owned(),
            }
            .into());
        }

        if self.feed.base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "feed.base_url".to_owned(),
                reason: "base_url must not be empty".to_owned(),
            }
            .into());
        }

        if self.feed.result_limit == 0 || self.feed.result_limit > 200 {
            return Err(ConfigError::InvalidValue {
                field: "feed.result_limit".to_owned(),
                reason: "must be between 1 and 200".to_owned(),
            }
            .into());
        }

        if self.watcher.enabled {
            if self.watcher.poll_interval_mins == 0 || self.watcher.poll_interval_mins > 1440 {
                return Err(ConfigError::InvalidValue {
                    field: "watcher.poll_interval_mins".to_owned(),
                    reason: "must be between 1 and 1440".to_owned(),
                }
                .into());
            }

            if self.watcher.summary_max_chars < 20 || self.watcher.summary_max_chars > 2000 {
                return Err(ConfigError::InvalidValue {
                    field: "watcher.summary_max_chars".to_owned(),
                    reason: "must be between 20 and 2000".to_owned(),
                }
                .into());
            }
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "metrics.port".to_owned(),
                reason: "port must not be 0 when metrics is enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

// Default는 derive 매크로로 자동 생성 (각 필드가 Default를 구현하므로)

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// PID 파일 경로
    pub pid_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            pid_file: "/var/run/cvewatch.pid".to_owned(),
        }
    }
}

/// 스토리지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite 데이터베이스 파일 경로
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "cvewatch.db".to_owned(),
        }
    }
}

/// 어드바이저리 피드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// NVD CVE API 2.0 베이스 URL
    pub base_url: String,
    /// 키워드당 조회 건수 상한
    pub result_limit: u32,
    /// HTTP 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://services.nvd.nist.gov/rest/json/cves/2.0".to_owned(),
            result_limit: 5,
            timeout_secs: 20,
        }
    }
}

/// 알림 설정
///
/// 토큰 또는 룸 ID가 비어 있으면 알림은 명시적 미설정(no-op) 상태로 동작합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Webex 봇 토큰
    pub webex_token: Option<String>,
    /// Webex 룸 ID
    pub webex_room_id: Option<String>,
    /// HTTP 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webex_token: None,
            webex_room_id: None,
            timeout_secs: 15,
        }
    }
}

/// 워처(폴링 루프) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSectionConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 폴링 주기 (분)
    pub poll_interval_mins: u64,
    /// 알림 메시지의 요약문 최대 길이 (문자 수)
    pub summary_max_chars: usize,
}

impl Default for WatcherSectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_mins: 15,
            summary_max_chars: 120,
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 수신 주소
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
    /// 스크레이프 엔드포인트 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9105,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = Some(val);
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
