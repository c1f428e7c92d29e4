//! CVE 워처 오케스트레이터 -- 폴링 루프 생명주기 관리
//!
//! [`CveWatcher`]는 core의 [`Pipeline`] trait을 구현하여
//! `cvewatch-daemon`에서 다른 모듈과 동일한 생명주기로 관리됩니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! WatchRegistry --> PollEngine --> AdvisoryFeed (NVD)
//!                       |
//!                  SeenLedger (중복 제거)
//!                       |
//!                   Notifier (Webex)
//!                       |
//!                  CycleSummary --> CycleEvent --> mpsc --> downstream
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cvewatch_core::error::CvewatchError;
use cvewatch_core::event::CycleEvent;
use cvewatch_core::pipeline::{HealthStatus, Pipeline};
use cvewatch_core::types::CycleSummary;

use crate::config::WatcherConfig;
use crate::engine::PollEngine;
use crate::error::WatcherError;
use crate::feed::{AdvisoryFeed, NvdFeed};
use crate::notify::{Notifier, WebexNotifier};
use crate::store::Store;

/// 워처 실행 상태
#[derive(Debug, Clone, PartialEq, Eq)]
enum WatcherState {
    /// 초기화됨, 아직 시작하지 않음
    Initialized,
    /// 실행 중
    Running,
    /// 정지됨
    Stopped,
}

/// 사이클 결과 누적 카운터 묶음
#[derive(Clone)]
struct CycleCounters {
    cycles_completed: Arc<AtomicU64>,
    advisories_accepted: Arc<AtomicU64>,
    notifications_sent: Arc<AtomicU64>,
    last_cycle_failures: Arc<AtomicU64>,
}

impl CycleCounters {
    fn new() -> Self {
        Self {
            cycles_completed: Arc::new(AtomicU64::new(0)),
            advisories_accepted: Arc::new(AtomicU64::new(0)),
            notifications_sent: Arc::new(AtomicU64::new(0)),
            last_cycle_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    fn record(&self, summary: &CycleSummary) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        self.advisories_accepted
            .fetch_add(summary.total_accepted() as u64, Ordering::Relaxed);
        self.notifications_sent
            .fetch_add(summary.notifications_sent() as u64, Ordering::Relaxed);
        self.last_cycle_failures
            .store(summary.failed_products() as u64, Ordering::Relaxed);
    }
}

/// CVE 워처 오케스트레이터
///
/// 폴링 주기마다 [`PollEngine`]으로 한 사이클을 수행하고, 결과를
/// [`CycleEvent`]로 다운스트림에 전달합니다. core의 `Pipeline` trait을
/// 구현하여 생명주기(start/stop/health_check)를 제공합니다.
///
/// # 재시작 제한
///
/// `stop()` 후 재시작이 필요하면 `CveWatcherBuilder`로 새 인스턴스를
/// 생성해야 합니다.
pub struct CveWatcher {
    /// 워처 설정
    config: WatcherConfig,
    /// 현재 상태
    state: WatcherState,
    /// 폴링 사이클 엔진
    engine: Arc<PollEngine>,
    /// 사이클 결과 전송 채널
    cycle_tx: mpsc::Sender<CycleEvent>,
    /// 폴링 루프 취소 토큰
    cancel: CancellationToken,
    /// 백그라운드 태스크 핸들
    tasks: Vec<tokio::task::JoinHandle<()>>,
    /// 누적 카운터
    counters: CycleCounters,
}

impl CveWatcher {
    /// 현재 상태명을 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            WatcherState::Initialized => "initialized",
            WatcherState::Running => "running",
            WatcherState::Stopped => "stopped",
        }
    }

    /// 완료된 사이클 수를 반환합니다.
    pub fn cycles_completed(&self) -> u64 {
        self.counters.cycles_completed.load(Ordering::Relaxed)
    }

    /// 수락된 새 어드바이저리 수를 반환합니다.
    pub fn advisories_accepted(&self) -> u64 {
        self.counters.advisories_accepted.load(Ordering::Relaxed)
    }

    /// 전송된 알림 수를 반환합니다.
    pub fn notifications_sent(&self) -> u64 {
        self.counters.notifications_sent.load(Ordering::Relaxed)
    }

    /// 단일 사이클을 수행합니다 (수동 트리거용).
    ///
    /// 주기 태스크와 동일하게 카운터를 갱신하고 [`CycleEvent`]를
    /// 전송합니다.
    pub async fn run_once(&self) -> Result<CycleSummary, WatcherError> {
        let summary = self.engine.run_once().await?;
        publish_cycle(&self.counters, &self.cycle_tx, summary.clone());
        Ok(summary)
    }
}

/// 사이클 결과를 카운터에 반영하고 이벤트로 전송합니다.
fn publish_cycle(
    counters: &CycleCounters,
    cycle_tx: &mpsc::Sender<CycleEvent>,
    summary: CycleSummary,
) {
    counters.record(&summary);
    let event = CycleEvent::new(summary);
    if let Err(e) = cycle_tx.try_send(event) {
        warn!(error = %e, "failed to send cycle event (channel full or closed)");
    }
}

impl Pipeline for CveWatcher {
    async fn start(&mut self) -> Result<(), CvewatchError> {
        if self.state == WatcherState::Running {
            return Err(cvewatch_core::error::PipelineError::AlreadyRunning.into());
        }

        info!("starting cve watcher");

        self.cancel = CancellationToken::new();
        let token = self.cancel.clone();
        let engine = Arc::clone(&self.engine);
        let cycle_tx = self.cycle_tx.clone();
        let counters = self.counters.clone();
        let interval_secs = self.config.poll_interval_mins * 60;

        let task = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));

            info!(interval_secs, "poll loop started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!("poll loop stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        match engine.run_once_cancellable(&token).await {
                            Ok(summary) => publish_cycle(&counters, &cycle_tx, summary),
                            Err(e) => warn!(error = %e, "poll cycle failed"),
                        }
                    }
                }
            }
        });

        self.tasks.push(task);
        self.state = WatcherState::Running;
        info!("cve watcher started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), CvewatchError> {
        if self.state != WatcherState::Running {
            return Err(cvewatch_core::error::PipelineError::NotRunning.into());
        }

        info!("stopping cve watcher");

        // abort 대신 취소 토큰을 사용해 진행 중인 제품 처리를 끝까지 기다림
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "poll task join failed");
            }
        }

        self.state = WatcherState::Stopped;
        info!("cve watcher stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            WatcherState::Running => {
                let failures = self.counters.last_cycle_failures.load(Ordering::Relaxed);
                if failures > 0 {
                    HealthStatus::Degraded(format!("{failures} product(s) failed in last cycle"))
                } else {
                    HealthStatus::Healthy
                }
            }
            WatcherState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            WatcherState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

/// CVE 워처 빌더
///
/// 워처를 구성하고 필요한 채널을 생성합니다. 피드와 알림자를 지정하지
/// 않으면 설정 기반의 [`NvdFeed`]와 [`WebexNotifier`]를 사용합니다.
pub struct CveWatcherBuilder {
    config: WatcherConfig,
    store: Option<Store>,
    feed: Option<Arc<dyn AdvisoryFeed>>,
    notifier: Option<Arc<dyn Notifier>>,
    cycle_tx: Option<mpsc::Sender<CycleEvent>>,
    cycle_channel_capacity: usize,
}

impl CveWatcherBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: WatcherConfig::default(),
            store: None,
            feed: None,
            notifier: None,
            cycle_tx: None,
            cycle_channel_capacity: 64,
        }
    }

    /// 워처 설정을 지정합니다.
    pub fn config(mut self, config: WatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// 연결된 저장소를 지정합니다. 필수입니다.
    pub fn store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    /// 피드 구현을 교체합니다 (테스트용).
    pub fn feed(mut self, feed: Arc<dyn AdvisoryFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// 알림자 구현을 교체합니다 (테스트용).
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// 외부 사이클 이벤트 채널을 설정합니다.
    ///
    /// 설정하지 않으면 빌더가 새 채널을 생성합니다.
    pub fn cycle_sender(mut self, tx: mpsc::Sender<CycleEvent>) -> Self {
        self.cycle_tx = Some(tx);
        self
    }

    /// 사이클 이벤트 채널 용량을 설정합니다 (외부 채널 미사용 시).
    pub fn cycle_channel_capacity(mut self, capacity: usize) -> Self {
        self.cycle_channel_capacity = capacity;
        self
    }

    /// 워처를 빌드합니다.
    ///
    /// # Returns
    ///
    /// - `CveWatcher`: 워처 인스턴스
    /// - `Option<mpsc::Receiver<CycleEvent>>`: 사이클 이벤트 수신 채널
    ///   (외부 cycle_sender를 설정한 경우 None)
    pub fn build(self) -> Result<(CveWatcher, Option<mpsc::Receiver<CycleEvent>>), WatcherError> {
        self.config.validate()?;

        let store = self.store.ok_or_else(|| WatcherError::Config {
            field: "store".to_owned(),
            reason: "a connected store is required".to_owned(),
        })?;

        let feed: Arc<dyn AdvisoryFeed> = match self.feed {
            Some(feed) => feed,
            None => Arc::new(NvdFeed::new(&self.config)?),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(WebexNotifier::from_config(&self.config)?),
        };

        let (cycle_tx, cycle_rx) = if let Some(tx) = self.cycle_tx {
            (tx, None)
        } else {
            let (tx, rx) = mpsc::channel(self.cycle_channel_capacity);
            (tx, Some(rx))
        };

        let engine = PollEngine::new(
            store.registry(),
            store.ledger(),
            feed,
            notifier,
            self.config.result_limit,
            self.config.summary_max_chars,
        );

        let watcher = CveWatcher {
            config: self.config,
            state: WatcherState::Initialized,
            engine: Arc::new(engine),
            cycle_tx,
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
            counters: CycleCounters::new(),
        };

        Ok((watcher, cycle_rx))
    }
}

impl Default for CveWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
