//! 감시 목록 접근자

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::WatcherError;

/// 감시 대상 제품 키워드 목록
///
/// `watch` 테이블을 감쌉니다. 키워드는 앞뒤 공백을 제거한 형태로 저장되며
/// `UNIQUE` 제약으로 중복을 거릅니다.
#[derive(Debug, Clone)]
pub struct WatchRegistry {
    pool: SqlitePool,
}

impl WatchRegistry {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 키워드를 감시 목록에 추가합니다.
    ///
    /// 공백 제거 후 빈 문자열이면 `InvalidKeyword`를 반환합니다.
    /// 이미 등록된 키워드는 no-op이며 `Ok(false)`를 반환합니다.
    pub async fn add(&self, keyword: &str) -> Result<bool, WatcherError> {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            return Err(WatcherError::InvalidKeyword {
                reason: "keyword is empty after trimming".to_owned(),
            });
        }

        let result = sqlx::query("INSERT OR IGNORE INTO watch (product) VALUES (?1)")
            .bind(trimmed)
            .execute(&self.pool)
            .await
            .map_err(|e| WatcherError::Storage(format!("watch insert failed: {e}")))?;

        let inserted = result.rows_affected() == 1;
        debug!(keyword = %trimmed, inserted, "watch add");
        Ok(inserted)
    }

    /// 감시 목록 전체를 사전순으로 반환합니다.
    pub async fn list(&self) -> Result<Vec<String>, WatcherError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT product FROM watch ORDER BY product")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| WatcherError::Storage(format!("watch select failed: {e}")))?;
        Ok(rows.into_iter().map(|(product,)| product).collect())
    }
}
