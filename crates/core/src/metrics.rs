//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `cvewatch_`
//! - 모듈명: `watcher_`, `feed_`, `notify_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(cvewatch_core::metrics::WATCHER_CYCLES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 제품 키워드 레이블 키
pub const LABEL_PRODUCT: &str = "product";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Watcher 메트릭 ────────────────────────────────────────────────

/// Watcher: 완료된 폴링 사이클 수 (counter)
pub const WATCHER_CYCLES_TOTAL: &str = "cvewatch_watcher_cycles_total";

/// Watcher: 수락된 새 어드바이저리 수 (counter)
pub const WATCHER_ADVISORIES_ACCEPTED_TOTAL: &str = "cvewatch_watcher_advisories_accepted_total";

/// Watcher: ID 없이 버려진 비정형 레코드 수 (counter)
pub const WATCHER_ADVISORIES_MALFORMED_TOTAL: &str = "cvewatch_watcher_advisories_malformed_total";

/// Watcher: 사이클 중 처리에 실패한 제품 수 (counter, label: product)
pub const WATCHER_PRODUCT_FAILURES_TOTAL: &str = "cvewatch_watcher_product_failures_total";

/// Watcher: 사이클 수행 시간 (histogram, 초)
pub const WATCHER_CYCLE_DURATION_SECONDS: &str = "cvewatch_watcher_cycle_duration_seconds";

/// Watcher: 감시 중인 제품 키워드 수 (gauge)
pub const WATCHER_PRODUCTS_WATCHED: &str = "cvewatch_watcher_products_watched";

// ─── Feed 메트릭 ───────────────────────────────────────────────────

/// Feed: 피드 조회 수 (counter, label: result)
pub const FEED_REQUESTS_TOTAL: &str = "cvewatch_feed_requests_total";

/// Feed: 조회로 받은 레코드 수 (counter)
pub const FEED_RECORDS_TOTAL: &str = "cvewatch_feed_records_total";

// ─── Notify 메트릭 ─────────────────────────────────────────────────

/// Notify: 전송된 알림 수 (counter)
pub const NOTIFY_SENT_TOTAL: &str = "cvewatch_notify_sent_total";

/// Notify: 전송 실패 수 (counter)
pub const NOTIFY_FAILURES_TOTAL: &str = "cvewatch_notify_failures_total";

// ─── Daemon 메트릭 ─────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "cvewatch_daemon_uptime_seconds";

/// Daemon: 실행 중인 모듈 수 (gauge)
pub const DAEMON_MODULES_RUNNING: &str = "cvewatch_daemon_modules_running";

/// 모든 메트릭의 설명을 Prometheus recorder에 등록합니다.
///
/// recorder 설치 직후 한 번만 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(WATCHER_CYCLES_TOTAL, "Completed poll cycles");
    describe_counter!(
        WATCHER_ADVISORIES_ACCEPTED_TOTAL,
        "Advisories accepted as newly seen"
    );
    describe_counter!(
        WATCHER_ADVISORIES_MALFORMED_TOTAL,
        "Feed records dropped for missing CVE id"
    );
    describe_counter!(
        WATCHER_PRODUCT_FAILURES_TOTAL,
        "Poll cycle failures by product keyword"
    );
    describe_histogram!(WATCHER_CYCLE_DURATION_SECONDS, "Poll cycle duration");
    describe_gauge!(WATCHER_PRODUCTS_WATCHED, "Product keywords on the watch list");

    describe_counter!(FEED_REQUESTS_TOTAL, "Feed fetch requests by result");
    describe_counter!(FEED_RECORDS_TOTAL, "Raw records returned by the feed");

    describe_counter!(NOTIFY_SENT_TOTAL, "Notifications delivered");
    describe_counter!(NOTIFY_FAILURES_TOTAL, "Notification delivery failures");

    describe_gauge!(DAEMON_UPTIME_SECONDS, "Daemon uptime in seconds");
    describe_gauge!(DAEMON_MODULES_RUNNING, "Modules currently running");
}
