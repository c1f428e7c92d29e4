//! CVE 워처 설정
//!
//! [`WatcherConfig`]는 core의 [`CvewatchConfig`](cvewatch_core::config::CvewatchConfig)에서
//! 워처 모듈이 사용하는 값(폴링 주기, 조회 건수, 요약 길이, 피드/알림 접속 정보)을
//! 하나의 구조체로 모읍니다.
//!
//! # 사용 예시
//!
//! ```
//! use cvewatch_watcher::WatcherConfig;
//!
//! // 기본값으로 생성
//! let config = WatcherConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! use cvewatch_watcher::WatcherConfigBuilder;
//!
//! let config = WatcherConfigBuilder::new()
//!     .enabled(true)
//!     .poll_interval_mins(30)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::WatcherError;

/// CVE 워처 설정
///
/// core 설정의 `[watcher]`, `[feed]`, `[notify]`, `[storage]` 섹션에서 파생됩니다.
///
/// # 필드
///
/// - **enabled**: 워처 활성화 여부
/// - **poll_interval_mins**: 폴링 주기 (분)
/// - **result_limit**: 키워드당 피드 조회 건수
/// - **summary_max_chars**: 알림 본문에 포함할 요약 최대 길이 (문자 단위)
/// - **db_path**: SQLite 데이터베이스 경로
/// - **feed_base_url / feed_timeout_secs**: NVD 피드 접속 정보
/// - **webex_token / webex_room_id / notify_timeout_secs**: Webex 알림 접속 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// 워처 활성화 여부
    pub enabled: bool,
    /// 폴링 주기 (분)
    pub poll_interval_mins: u64,
    /// 키워드당 피드 조회 건수
    pub result_limit: u32,
    /// 요약 최대 길이 (바이트가 아닌 문자 수 기준)
    pub summary_max_chars: usize,
    /// SQLite 데이터베이스 경로
    pub db_path: String,
    /// NVD 피드 기본 URL
    pub feed_base_url: String,
    /// 피드 요청 타임아웃 (초)
    pub feed_timeout_secs: u64,
    /// Webex 봇 토큰. 없으면 알림은 no-op으로 동작
    pub webex_token: Option<String>,
    /// Webex 룸 ID. 없으면 알림은 no-op으로 동작
    pub webex_room_id: Option<String>,
    /// 알림 요청 타임아웃 (초)
    pub notify_timeout_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_mins: 15,
            result_limit: 5,
            summary_max_chars: 120,
            db_path: "cvewatch.db".to_owned(),
            feed_base_url: "https://services.nvd.nist.gov/rest/json/cves/2.0".to_owned(),
            feed_timeout_secs: 20,
            webex_token: None,
            webex_room_id: None,
            notify_timeout_secs: 15,
        }
    }
}

/// 설정 범위 상수
const MAX_POLL_INTERVAL_MINS: u64 = 1440; // 24 hours
const MAX_RESULT_LIMIT: u32 = 200;
const MIN_SUMMARY_MAX_CHARS: usize = 20;
const MAX_SUMMARY_MAX_CHARS: usize = 2000;
const MAX_TIMEOUT_SECS: u64 = 300;

impl WatcherConfig {
    /// core의 `CvewatchConfig`에서 워처 설정을 생성합니다.
    pub fn from_core(core: &cvewatch_core::config::CvewatchConfig) -> Self {
        Self {
            enabled: core.watcher.enabled,
            poll_interval_mins: core.watcher.poll_interval_mins,
            result_limit: core.feed.result_limit,
            summary_max_chars: core.watcher.summary_max_chars,
            db_path: core.storage.db_path.clone(),
            feed_base_url: core.feed.base_url.clone(),
            feed_timeout_secs: core.feed.timeout_secs,
            webex_token: core.notify.webex_token.clone(),
            webex_room_id: core.notify.webex_room_id.clone(),
            notify_timeout_secs: core.notify.timeout_secs,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `poll_interval_mins`: 1-1440
    /// - `result_limit`: 1-200
    /// - `summary_max_chars`: 20-2000
    /// - `db_path`, `feed_base_url`: 비어있으면 안 됨
    /// - `feed_timeout_secs`, `notify_timeout_secs`: 1-300
    /// - `webex_token` / `webex_room_id`: 한쪽만 설정할 수 없음
    pub fn validate(&self) -> Result<(), WatcherError> {
        if self.poll_interval_mins == 0 || self.poll_interval_mins > MAX_POLL_INTERVAL_MINS {
            return Err(WatcherError::Config {
                field: "poll_interval_mins".to_owned(),
                reason: format!("must be 1-{MAX_POLL_INTERVAL_MINS}"),
            });
        }

        if self.result_limit == 0 || self.result_limit > MAX_RESULT_LIMIT {
            return Err(WatcherError::Config {
                field: "result_limit".to_owned(),
                reason: format!("must be 1-{MAX_RESULT_LIMIT}"),
            });
        }

        if self.summary_max_chars < MIN_SUMMARY_MAX_CHARS
            || self.summary_max_chars > MAX_SUMMARY_MAX_CHARS
        {
            return Err(WatcherError::Config {
                field: "summary_max_chars".to_owned(),
                reason: format!("must be {MIN_SUMMARY_MAX_CHARS}-{MAX_SUMMARY_MAX_CHARS}"),
            });
        }

        if self.db_path.is_empty() {
            return Err(WatcherError::Config {
                field: "db_path".to_owned(),
                reason: "db_path must not be empty".to_owned(),
            });
        }

        if self.feed_base_url.is_empty() {
            return Err(WatcherError::Config {
                field: "feed_base_url".to_owned(),
                reason: "feed_base_url must not be empty".to_owned(),
            });
        }

        if self.feed_timeout_secs == 0 || self.feed_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(WatcherError::Config {
                field: "feed_timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_SECS}"),
            });
        }

        if self.notify_timeout_secs == 0 || self.notify_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(WatcherError::Config {
                field: "notify_timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_SECS}"),
            });
        }

        // 토큰과 룸 ID는 쌍으로만 의미가 있음
        match (&self.webex_token, &self.webex_room_id) {
            (Some(_), None) => {
                return Err(WatcherError::Config {
                    field: "webex_room_id".to_owned(),
                    reason: "webex_room_id required when webex_token is set".to_owned(),
                });
            }
            (None, Some(_)) => {
                return Err(WatcherError::Config {
                    field: "webex_token".to_owned(),
                    reason: "webex_token required when webex_room_id is set".to_owned(),
                });
            }
            _ => {}
        }

        Ok(())
    }
}

/// [`WatcherConfig`] 빌더
///
/// 유연한 설정 구성 및 빌드 시 유효성 검증을 제공합니다.
#[derive(Default)]
pub struct WatcherConfigBuilder {
    config: WatcherConfig,
}

impl WatcherConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성화 여부를 설정합니다.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// 폴링 주기(분)를 설정합니다.
    pub fn poll_interval_mins(mut self, mins: u64) -> Self {
        self.config.poll_interval_mins = mins;
        self
    }

    /// 키워드당 조회 건수를 설정합니다.
    pub fn result_limit(mut self, limit: u32) -> Self {
        self.config.result_limit = limit;
        self
    }

    /// 요약 최대 길이를 설정합니다.
    pub fn summary_max_chars(mut self, chars: usize) -> Self {
        self.config.summary_max_chars = chars;
        self
    }

    /// 데이터베이스 경로를 설정합니다.
    pub fn db_path(mut self, path: impl Into<String>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// 피드 기본 URL을 설정합니다.
    pub fn feed_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.feed_base_url = url.into();
        self
    }

    /// 피드 타임아웃(초)을 설정합니다.
    pub fn feed_timeout_secs(mut self, secs: u64) -> Self {
        self.config.feed_timeout_secs = secs;
        self
    }

    /// Webex 토큰을 설정합니다.
    pub fn webex_token(mut self, token: impl Into<String>) -> Self {
        self.config.webex_token = Some(token.into());
        self
    }

    /// Webex 룸 ID를 설정합니다.
    pub fn webex_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.config.webex_room_id = Some(room_id.into());
        self
    }

    /// 알림 타임아웃(초)을 설정합니다.
    pub fn notify_timeout_secs(mut self, secs: u64) -> Self {
        self.config.notify_timeout_secs = secs;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `WatcherError::Config` 반환
    pub fn build(self) -> Result<WatcherConfig, WatcherError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
