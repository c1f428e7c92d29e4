//! 에러 타입 — 도메인별 에러 정의

/// cvewatch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CvewatchError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 플러그인 생명주기 에러
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 워처 도메인 에러 (cvewatch-watcher에서 변환됨)
    #[error("watcher error: {0}")]
    Watcher(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 채널 수신 실패
    #[error("channel receive failed: {0}")]
    ChannelRecv(String),

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 이미 실행 중
    #[error("pipeline already running")]
    AlreadyRunning,

    /// 실행 중이 아님
    #[error("pipeline not running")]
    NotRunning,
}

/// 플러그인 생명주기 에러
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// 동일한 이름의 플러그인이 이미 등록됨
    #[error("plugin already registered: {name}")]
    AlreadyRegistered { name: String },

    /// 플러그인을 찾을 수 없음
    #[error("plugin not found: {name}")]
    NotFound { name: String },

    /// 잘못된 상태에서의 작업 시도
    #[error("invalid plugin state for '{name}': current={current}, expected={expected}")]
    InvalidState {
        name: String,
        current: String,
        expected: String,
    },

    /// 중지 실패 (이름별 에러 목록)
    #[error("failed to stop plugins: {0}")]
    StopFailed(String),
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 스토리지에 접근할 수 없음 (연결 실패 포함)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),

    /// 마이그레이션 실패
    #[error("migration failed: {0}")]
    Migration(String),
}
