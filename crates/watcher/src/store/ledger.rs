//! 확인 이력 접근자

use sqlx::SqlitePool;
use tracing::debug;

use cvewatch_core::types::SeenRecord;

use crate::error::WatcherError;

/// CVE 확인 이력 원장
///
/// `seen` 테이블을 감쌉니다. `cve_id`가 PRIMARY KEY이므로
/// 삽입 성공 여부가 곧 "처음 본 레코드인가"의 판정이 됩니다.
#[derive(Debug, Clone)]
pub struct SeenLedger {
    pool: SqlitePool,
}

impl SeenLedger {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 레코드를 확인 이력에 기록합니다.
    ///
    /// 처음 보는 `cve_id`면 행을 삽입하고 `Ok(true)`를 반환합니다.
    /// 이미 기록된 `cve_id`면 아무것도 바꾸지 않고 `Ok(false)`를 반환합니다.
    /// 이 반환값이 알림 여부를 결정하는 유일한 판정입니다.
    pub async fn mark_seen(&self, record: &SeenRecord) -> Result<bool, WatcherError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO seen (cve_id, product, published) VALUES (?1, ?2, ?3)",
        )
        .bind(&record.cve_id)
        .bind(&record.product)
        .bind(&record.published)
        .execute(&self.pool)
        .await
        .map_err(|e| WatcherError::Storage(format!("seen insert failed: {e}")))?;

        let fresh = result.rows_affected() == 1;
        debug!(cve_id = %record.cve_id, product = %record.product, fresh, "mark seen");
        Ok(fresh)
    }

    /// 해당 `cve_id`가 이미 기록되어 있는지 확인합니다.
    pub async fn is_seen(&self, cve_id: &str) -> Result<bool, WatcherError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM seen WHERE cve_id = ?1 LIMIT 1")
            .bind(cve_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WatcherError::Storage(format!("seen select failed: {e}")))?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn record(cve_id: &str, product: &str) -> SeenRecord {
        SeenRecord {
            cve_id: cve_id.to_owned(),
            product: product.to_owned(),
            published: "2024-06-01T12:00:00".to_owned(),
        }
    }

    async fn ledger() -> SeenLedger {
        let store = Store::in_memory().await.unwrap();
        store.run_migrations().await.unwrap();
        store.ledger()
    }

    #[tokio::test]
    async fn first_mark_returns_true() {
        let ledger = ledger().await;
        assert!(ledger.mark_seen(&record("CVE-2024-0001", "openssl")).await.unwrap());
    }

    #[tokio::test]
    async fn second_mark_returns_false() {
        let ledger = ledger().await;
        let rec = record("CVE-2024-0001", "openssl");
        assert!(ledger.mark_seen(&rec).await.unwrap());
        assert!(!ledger.mark_seen(&rec).await.unwrap());
    }

    #[tokio::test]
    async fn same_cve_under_different_product_is_still_duplicate() {
        // cve_id가 PRIMARY KEY이므로 제품이 달라도 첫 기록만 유효함
        let ledger = ledger().await;
        assert!(ledger.mark_seen(&record("CVE-2024-0002", "openssl")).await.unwrap());
        assert!(!ledger.mark_seen(&record("CVE-2024-0002", "nginx")).await.unwrap());
    }

    #[tokio::test]
    async fn is_seen_reflects_marks() {
        let ledger = ledger().await;
        assert!(!ledger.is_seen("CVE-2024-0003").await.unwrap());
        ledger.mark_seen(&record("CVE-2024-0003", "curl")).await.unwrap();
        assert!(ledger.is_seen("CVE-2024-0003").await.unwrap());
    }
}
