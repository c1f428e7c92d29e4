//! CVE 워처 에러 타입
//!
//! [`WatcherError`]는 워처 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<WatcherError> for CvewatchError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **피드 조회**: `Feed`, `FeedStatus`, `FeedDecode`
//! - **알림**: `Notify`
//! - **저장소**: `Storage`
//! - **감시 목록**: `InvalidKeyword`
//! - **설정**: `Config`
//! - **채널 통신**: `Channel`

use cvewatch_core::error::{ConfigError, CvewatchError, PipelineError, StorageError};

/// CVE 워처 도메인 에러
///
/// 피드 폴링, 중복 제거, 알림 전송의 모든 에러 시나리오를 포함합니다.
///
/// # 에러 변환
///
/// `From<WatcherError> for CvewatchError` 구현으로
/// `cvewatch-daemon`에서 사용하는 최상위 에러 타입으로 자동 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// 피드 HTTP 요청 실패 (타임아웃, 연결 실패 등)
    #[error("feed request error: '{keyword}': {reason}")]
    Feed {
        /// 조회에 사용된 제품 키워드
        keyword: String,
        /// 요청 실패 사유
        reason: String,
    },

    /// 피드가 비정상 HTTP 상태 코드를 반환함
    #[error("feed status error: '{keyword}': HTTP {status}")]
    FeedStatus {
        /// 조회에 사용된 제품 키워드
        keyword: String,
        /// 응답 상태 코드
        status: u16,
    },

    /// 피드 응답 본문 디코딩 실패
    #[error("feed decode error: '{keyword}': {reason}")]
    FeedDecode {
        /// 조회에 사용된 제품 키워드
        keyword: String,
        /// 디코딩 실패 사유
        reason: String,
    },

    /// 알림 전송 실패
    #[error("notify error: {0}")]
    Notify(String),

    /// SQLite 저장소 접근 실패
    #[error("storage error: {0}")]
    Storage(String),

    /// 유효하지 않은 감시 키워드 (공백 제거 후 빈 문자열 등)
    #[error("invalid keyword: {reason}")]
    InvalidKeyword {
        /// 거부 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),
}

impl From<WatcherError> for CvewatchError {
    fn from(err: WatcherError) -> Self {
        match err {
            WatcherError::Storage(msg) => CvewatchError::Storage(StorageError::Unavailable(msg)),
            WatcherError::Config { field, reason } => {
                CvewatchError::Config(ConfigError::InvalidValue { field, reason })
            }
            WatcherError::Channel(msg) => CvewatchError::Pipeline(PipelineError::ChannelSend(msg)),
            other => CvewatchError::Watcher(other.to_string()),
        }
    }
}
