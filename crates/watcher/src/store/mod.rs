//! SQLite 저장소
//!
//! 감시 목록(`watch`)과 확인 이력(`seen`) 두 테이블을 하나의 SQLite
//! 데이터베이스에 보관합니다. [`Store`]가 커넥션 풀과 마이그레이션을
//! 소유하고, 테이블별 접근은 [`WatchRegistry`]와 [`SeenLedger`]가 담당합니다.

mod ledger;
mod registry;

pub use ledger::SeenLedger;
pub use registry::WatchRegistry;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use crate::error::WatcherError;

/// 동시 커넥션 상한
const MAX_CONNECTIONS: u32 = 5;

/// SQLite 저장소 핸들
///
/// 커넥션 풀을 소유하며, clone 시 동일한 풀을 공유합니다.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// 파일 기반 데이터베이스에 연결합니다. 파일이 없으면 생성합니다.
    pub async fn connect(db_path: &str) -> Result<Self, WatcherError> {
        let url = format!("sqlite://{db_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(&url)
            .await
            .map_err(|e| WatcherError::Storage(format!("connect failed: {db_path}: {e}")))?;
        info!(db_path = %db_path, "sqlite store connected");
        Ok(Self { pool })
    }

    /// 인메모리 데이터베이스에 연결합니다. 테스트 용도입니다.
    pub async fn in_memory() -> Result<Self, WatcherError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| WatcherError::Storage(format!("in-memory connect failed: {e}")))?;
        Ok(Self { pool })
    }

    /// 테이블 스키마를 생성합니다. 이미 존재하면 no-op입니다.
    pub async fn run_migrations(&self) -> Result<(), WatcherError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS watch (
                id INTEGER PRIMARY KEY,
                product TEXT UNIQUE NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| WatcherError::Storage(format!("migration failed: watch: {e}")))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS seen (
                cve_id TEXT PRIMARY KEY,
                product TEXT,
                published TEXT
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| WatcherError::Storage(format!("migration failed: seen: {e}")))?;

        Ok(())
    }

    /// 감시 목록 접근자를 생성합니다.
    pub fn registry(&self) -> WatchRegistry {
        WatchRegistry::new(self.pool.clone())
    }

    /// 확인 이력 접근자를 생성합니다.
    pub fn ledger(&self) -> SeenLedger {
        SeenLedger::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let store = Store::in_memory().await.unwrap();
        store.run_migrations().await.unwrap();
        store.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn connect_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cvewatch.db");
        let store = Store::connect(db_path.to_str().unwrap()).await.unwrap();
        store.run_migrations().await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn registry_and_ledger_share_the_pool() {
        let store = Store::in_memory().await.unwrap();
        store.run_migrations().await.unwrap();

        let registry = store.registry();
        let ledger = store.ledger();
        assert!(registry.add("openssl").await.unwrap());

        let record = cvewatch_core::types::SeenRecord {
            cve_id: "CVE-2024-0001".to_owned(),
            product: "openssl".to_owned(),
            published: "2024-01-01T00:00:00".to_owned(),
        };
        assert!(ledger.mark_seen(&record).await.unwrap());
    }
}
