//! 파이프라인 trait — 모듈 생명주기와 건강 상태 정의

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::CvewatchError;

/// dyn-compatible trait에서 사용하는 boxed future 타입
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 모듈 건강 상태
///
/// 데몬의 health 집계는 worst-of 방식으로 동작합니다
/// (`Unhealthy` > `Degraded` > `Healthy`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// 정상 동작 중
    Healthy,
    /// 동작 중이지만 일부 기능 저하 (사유 포함)
    Degraded(String),
    /// 동작 불가 (사유 포함)
    Unhealthy(String),
}

impl HealthStatus {
    /// 정상 상태인지 여부
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 동작 불가 상태인지 여부
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
            Self::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}

/// 장기 실행 모듈의 생명주기 trait
///
/// 백그라운드 태스크를 소유한 모듈이 구현합니다.
/// `start`는 태스크를 스폰하고 즉시 반환하며, `stop`은 graceful shutdown을
/// 요청하고 태스크 종료를 기다립니다.
pub trait Pipeline: Send + Sync {
    /// 파이프라인을 시작합니다.
    fn start(&mut self) -> impl Future<Output = Result<(), CvewatchError>> + Send;

    /// 파이프라인을 정지합니다.
    fn stop(&mut self) -> impl Future<Output = Result<(), CvewatchError>> + Send;

    /// 현재 건강 상태를 확인합니다.
    fn health_check(&self) -> impl Future<Output = HealthStatus> + Send;
}
