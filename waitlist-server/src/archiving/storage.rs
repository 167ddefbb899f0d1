//! redb-based archive of closed business days
//!
//! 键为 `(store_id, closed_at)`，同一门店的记录按关闭时间有序，
//! 查询历史时倒序扫描即可得到最新记录。

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::BusinessDaySummary;
use thiserror::Error;

/// Summaries table: key = (store_id, closed_at), value = JSON-serialized BusinessDaySummary
const SUMMARIES_TABLE: TableDefinition<(i64, i64), &[u8]> = TableDefinition::new("business_days");

/// Archive errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Business day archive backed by redb
#[derive(Clone)]
pub struct DayArchive {
    db: Arc<Database>,
}

impl std::fmt::Debug for DayArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DayArchive").finish_non_exhaustive()
    }
}

impl DayArchive {
    /// Open or create the archive at the given path (parent directories are created)
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// In-memory archive (tests / oneshot servers)
    pub fn open_in_memory() -> ArchiveResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> ArchiveResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SUMMARIES_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// 追加一条营业日汇总
    pub fn append(&self, summary: &BusinessDaySummary) -> ArchiveResult<()> {
        let value = serde_json::to_vec(summary)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SUMMARIES_TABLE)?;
            table.insert((summary.store_id, summary.closed_at), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// 门店的营业日历史，最新在前
    pub fn history(&self, store_id: i64, limit: usize) -> ArchiveResult<Vec<BusinessDaySummary>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUMMARIES_TABLE)?;

        let mut summaries = Vec::new();
        for result in table.range((store_id, i64::MIN)..=(store_id, i64::MAX))?.rev() {
            if summaries.len() >= limit {
                break;
            }
            let (_, value) = result?;
            summaries.push(serde_json::from_slice(value.value())?);
        }
        Ok(summaries)
    }

    /// 已归档的营业日总数 (所有门店)
    pub fn count(&self) -> ArchiveResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUMMARIES_TABLE)?;
        let mut count = 0;
        for result in table.iter()? {
            result?;
            count += 1;
        }
        Ok(count)
    }
}
