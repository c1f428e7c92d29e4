//! 폴링 사이클 엔진
//!
//! [`PollEngine::run_once`]는 감시 목록의 모든 제품에 대해
//! 조회 → 중복 제거 → 알림의 한 사이클을 수행합니다. 제품 하나의
//! 실패는 해당 제품 범위로 격리되고, 사이클 자체는 감시 목록 조회
//! 실패 시에만 실패합니다.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cvewatch_core::metrics as metric_names;
use cvewatch_core::types::{Advisory, CycleSummary, NotifyStatus, ProductOutcome, SeenRecord};

use crate::error::WatcherError;
use crate::feed::AdvisoryFeed;
use crate::notify::Notifier;
use crate::store::{SeenLedger, WatchRegistry};

/// 폴링 사이클 엔진
///
/// 저장소, 피드, 알림자를 조립해 한 사이클 단위의 실행을 제공합니다.
pub struct PollEngine {
    registry: WatchRegistry,
    ledger: SeenLedger,
    feed: Arc<dyn AdvisoryFeed>,
    notifier: Arc<dyn Notifier>,
    result_limit: u32,
    summary_max_chars: usize,
}

impl PollEngine {
    /// 새 엔진을 생성합니다.
    pub fn new(
        registry: WatchRegistry,
        ledger: SeenLedger,
        feed: Arc<dyn AdvisoryFeed>,
        notifier: Arc<dyn Notifier>,
        result_limit: u32,
        summary_max_chars: usize,
    ) -> Self {
        Self {
            registry,
            ledger,
            feed,
            notifier,
            result_limit,
            summary_max_chars,
        }
    }

    /// 한 사이클을 끝까지 수행합니다.
    ///
    /// 알림은 이력 기록이 성공한 뒤에 전송됩니다. 전송이 실패해도
    /// 기록은 되돌리지 않으므로, 각 CVE는 최대 한 번만 수락됩니다.
    ///
    /// # Errors
    ///
    /// 감시 목록 조회 실패만 사이클 전체의 에러가 됩니다.
    pub async fn run_once(&self) -> Result<CycleSummary, WatcherError> {
        self.run_cycle(None).await
    }

    /// 취소 토큰을 관찰하며 한 사이클을 수행합니다.
    ///
    /// 취소 시점에 처리 중이던 제품은 끝까지 처리하고, 남은 제품은
    /// 건너뜁니다.
    pub async fn run_once_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CycleSummary, WatcherError> {
        self.run_cycle(Some(cancel)).await
    }

    async fn run_cycle(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> Result<CycleSummary, WatcherError> {
        let started = Instant::now();
        let products = self.registry.list().await?;
        gauge!(metric_names::WATCHER_PRODUCTS_WATCHED).set(products.len() as f64);

        let mut outcomes = Vec::with_capacity(products.len());
        for product in &products {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                info!(remaining = products.len() - outcomes.len(), "cycle cancelled");
                break;
            }
            outcomes.push(self.poll_product(product).await);
        }

        let summary = CycleSummary { outcomes };
        counter!(metric_names::WATCHER_CYCLES_TOTAL).increment(1);
        counter!(metric_names::WATCHER_ADVISORIES_ACCEPTED_TOTAL)
            .increment(summary.total_accepted() as u64);
        for outcome in summary.outcomes.iter().filter(|o| !o.is_ok()) {
            counter!(
                metric_names::WATCHER_PRODUCT_FAILURES_TOTAL,
                metric_names::LABEL_PRODUCT => outcome.product.clone()
            )
            .increment(1);
        }
        histogram!(metric_names::WATCHER_CYCLE_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        info!(
            products = summary.outcomes.len(),
            accepted = summary.total_accepted(),
            notified = summary.notifications_sent(),
            failed = summary.failed_products(),
            "poll cycle complete"
        );
        Ok(summary)
    }

    /// 제품 하나를 조회하고 새 CVE에 대해 알림을 전송합니다.
    ///
    /// 실패해도 에러를 반환하지 않고 결과에 기록합니다.
    async fn poll_product(&self, product: &str) -> ProductOutcome {
        let advisories = match self.feed.fetch(product, self.result_limit).await {
            Ok(advisories) => {
                counter!(
                    metric_names::FEED_REQUESTS_TOTAL,
                    metric_names::LABEL_RESULT => "success"
                )
                .increment(1);
                counter!(metric_names::FEED_RECORDS_TOTAL).increment(advisories.len() as u64);
                advisories
            }
            Err(e) => {
                counter!(
                    metric_names::FEED_REQUESTS_TOTAL,
                    metric_names::LABEL_RESULT => "failure"
                )
                .increment(1);
                warn!(product = %product, error = %e, "feed fetch failed");
                return ProductOutcome {
                    product: product.to_owned(),
                    fetched: 0,
                    malformed: 0,
                    accepted: 0,
                    notify: NotifyStatus::Skipped,
                    error: Some(e.to_string()),
                };
            }
        };

        let fetched = advisories.len();
        let mut malformed = 0;
        let mut fresh: Vec<Advisory> = Vec::new();
        let mut error = None;

        for advisory in advisories {
            let Some(cve_id) = advisory.id.clone() else {
                malformed += 1;
                counter!(metric_names::WATCHER_ADVISORIES_MALFORMED_TOTAL).increment(1);
                debug!(product = %product, "dropping record without CVE id");
                continue;
            };
            let record = SeenRecord {
                cve_id,
                product: product.to_owned(),
                published: advisory.published.clone(),
            };
            match self.ledger.mark_seen(&record).await {
                Ok(true) => fresh.push(advisory),
                Ok(false) => {}
                Err(e) => {
                    warn!(product = %product, cve_id = %record.cve_id, error = %e, "ledger write failed");
                    error = Some(e.to_string());
                    break;
                }
            }
        }

        let accepted = fresh.len();
        let notify = if fresh.is_empty() {
            NotifyStatus::Skipped
        } else {
            let message = format_message(product, &fresh, self.summary_max_chars);
            match self.notifier.send(&message).await {
                Ok(()) => {
                    counter!(metric_names::NOTIFY_SENT_TOTAL).increment(1);
                    NotifyStatus::Sent
                }
                Err(e) => {
                    counter!(metric_names::NOTIFY_FAILURES_TOTAL).increment(1);
                    warn!(product = %product, error = %e, "notification failed");
                    error.get_or_insert_with(|| e.to_string());
                    NotifyStatus::Failed
                }
            }
        };

        ProductOutcome {
            product: product.to_owned(),
            fetched,
            malformed,
            accepted,
            notify,
            error,
        }
    }
}

/// 한 제품의 새 CVE 묶음을 마크다운 메시지 한 건으로 조립합니다.
pub fn format_message(product: &str, advisories: &[Advisory], summary_max_chars: usize) -> String {
    let mut message = format!("🚨 New CVEs for **{product}**:\n");
    for advisory in advisories {
        let id = advisory.id.as_deref().unwrap_or("<no-id>");
        let summary = truncate_chars(&advisory.summary, summary_max_chars);
        message.push_str(&format!(
            "- **{id}** ({published}): {summary}\n",
            published = advisory.published
        ));
    }
    message
}

/// 문자 수 기준으로 요약을 자릅니다. 잘린 경우에만 말줄임표를 붙입니다.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}
