//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 모든 모듈이 공유하는 데이터 구조를 정의합니다.
//! 피드에서 가져온 어드바이저리, seen 레코드, 사이클 결과 요약 등을 담습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// CVE 어드바이저리
///
/// 피드에서 가져온 원본 레코드입니다. `id`가 없으면 비정형 레코드로
/// 간주되어 사이클 엔진에서 건너뜁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    /// CVE ID (예: CVE-2024-12345). 비정형 레코드는 None
    pub id: Option<String>,
    /// 공개 일시 (피드가 준 문자열 그대로)
    pub published: String,
    /// 요약 설명
    pub summary: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.id.as_deref().unwrap_or("<no-id>"),
            self.published,
        )
    }
}

/// seen 원장에 기록되는 레코드
///
/// `cve_id`가 기본 키입니다. 같은 ID가 다른 제품 키워드로 다시 조회되어도
/// 한 번만 기록됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    /// CVE ID
    pub cve_id: String,
    /// 최초로 이 CVE를 가져온 제품 키워드
    pub product: String,
    /// 공개 일시
    pub published: String,
}

impl fmt::Display for SeenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via '{}'", self.cve_id, self.product)
    }
}

/// 제품별 알림 전송 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyStatus {
    /// 새 어드바이저리가 없어 전송하지 않음
    Skipped,
    /// 전송 성공 (미설정 no-op 포함)
    Sent,
    /// 전송 실패
    Failed,
}

impl fmt::Display for NotifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Skipped => "skipped",
            Self::Sent => "sent",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// 한 사이클에서 제품 키워드 하나의 처리 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductOutcome {
    /// 제품 키워드
    pub product: String,
    /// 피드에서 가져온 레코드 수 (비정형 포함)
    pub fetched: usize,
    /// ID 없는 비정형 레코드 수
    pub malformed: usize,
    /// 처음 보는 것으로 수락된 어드바이저리 수
    pub accepted: usize,
    /// 알림 전송 결과
    pub notify: NotifyStatus,
    /// 이 제품 처리 중 발생한 에러 (있을 경우)
    pub error: Option<String>,
}

impl ProductOutcome {
    /// 에러 없이 끝났는지 여부
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for ProductOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: fetched={} accepted={} notify={}",
            self.product, self.fetched, self.accepted, self.notify,
        )?;
        if let Some(err) = &self.error {
            write!(f, " error={err}")?;
        }
        Ok(())
    }
}

/// 폴링 사이클 전체 결과 요약
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleSummary {
    /// 제품별 결과 (사전순)
    pub outcomes: Vec<ProductOutcome>,
}

impl CycleSummary {
    /// 사이클에서 수락된 어드바이저리 총수
    pub fn total_accepted(&self) -> usize {
        self.outcomes.iter().map(|o| o.accepted).sum()
    }

    /// 전송된 알림 수
    pub fn notifications_sent(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.notify == NotifyStatus::Sent && o.accepted > 0)
            .count()
    }

    /// 에러가 발생한 제품 수
    pub fn failed_products(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle: products={} accepted={} notified={} failed={}",
            self.outcomes.len(),
            self.total_accepted(),
            self.notifications_sent(),
            self.failed_products(),
        )
    }
}
