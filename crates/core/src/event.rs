//! 이벤트 시스템 — 모듈 간 통신의 기본 단위
//!
//! 모듈 간 통신은 이벤트 기반 메시지 패싱으로 수행됩니다.
//! [`EventMetadata`]는 모든 이벤트에 공통으로 포함되는 메타데이터이며,
//! [`Event`] trait은 모든 이벤트 타입이 구현해야 하는 인터페이스입니다.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::CycleSummary;

// --- 모듈명 상수 ---

/// CVE 워처 모듈명
pub const MODULE_WATCHER: &str = "cve-watcher";
/// 데몬 오케스트레이터 모듈명
pub const MODULE_DAEMON: &str = "daemon";

// --- 이벤트 타입 상수 ---

/// 폴링 사이클 완료 이벤트 타입
pub const EVENT_TYPE_CYCLE: &str = "cycle";

/// 이벤트 메타데이터 — 모든 이벤트에 공통으로 포함되는 추적 정보
///
/// 각 이벤트의 발생 시각, 생성 모듈, 분산 추적 ID를 담고 있어
/// 이벤트 흐름을 추적하고 디버깅할 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 이벤트 발생 시각 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 이벤트를 생성한 모듈명 (예: "cve-watcher")
    pub source_module: String,
    /// 분산 추적 ID — 같은 흐름의 이벤트를 연결합니다
    pub trace_id: String,
}

impl EventMetadata {
    /// 기존 trace_id를 사용하여 새 메타데이터를 생성합니다.
    ///
    /// 이벤트 체인에서 동일한 추적 ID를 유지할 때 사용합니다.
    pub fn new(source_module: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            source_module: source_module.into(),
            trace_id: trace_id.into(),
        }
    }

    /// 새로운 UUID v4 trace_id를 생성하여 메타데이터를 만듭니다.
    ///
    /// 새로운 이벤트 체인의 시작점에서 사용합니다.
    pub fn with_new_trace(source_module: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            source_module: source_module.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl fmt::Display for EventMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] source={} trace={}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.source_module,
            self.trace_id,
        )
    }
}

/// 모든 이벤트가 구현해야 하는 기본 trait
///
/// 각 모듈은 자체 이벤트 타입을 정의하고 이 trait을 구현합니다.
/// `Send + Sync + 'static` 바운드로 `tokio::mpsc` 채널을 통한
/// 안전한 전송을 보장합니다.
pub trait Event: Send + Sync + 'static {
    /// 이벤트 고유 ID (UUID v4)
    fn event_id(&self) -> &str;

    /// 이벤트 메타데이터 (timestamp, source_module, trace_id)
    fn metadata(&self) -> &EventMetadata;

    /// 이벤트 타입명 (로깅 및 라우팅에 사용)
    fn event_type(&self) -> &str;
}

/// 폴링 사이클 완료 이벤트
///
/// 워처가 한 사이클을 끝낼 때마다 생성되어 데몬의 사이클 로거가
/// 소비합니다.
#[derive(Debug, Clone)]
pub struct CycleEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 사이클 결과 요약
    pub summary: CycleSummary,
}

impl CycleEvent {
    /// 새로운 trace를 시작하는 사이클 이벤트를 생성합니다.
    pub fn new(summary: CycleSummary) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::with_new_trace(MODULE_WATCHER),
            summary,
        }
    }

    /// 기존 trace에 연결된 사이클 이벤트를 생성합니다.
    pub fn with_trace(summary: CycleSummary, trace_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_WATCHER, trace_id),
            summary,
        }
    }
}

impl Event for CycleEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_CYCLE
    }
}

impl fmt::Display for CycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CycleEvent[{}] products={} accepted={} failed={}",
            &self.id[..8.min(self.id.len())],
            self.summary.outcomes.len(),
            self.summary.total_accepted(),
            self.summary.failed_products(),
        )
    }
}
