//! 营业日归档
//!
//! - **storage**: DayArchive (redb，每个营业日关闭时追加一条汇总)

mod storage;

pub use storage::{ArchiveError, ArchiveResult, DayArchive};
