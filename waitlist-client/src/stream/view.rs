//! 本地队列视图
//!
//! [`QueueView`] 是推送事件的落点：补丁事件直接应用，结构性事件触发
//! 重新拉取。[`BoardMirror`] 是基于 HTTP 的默认实现，最新快照通过
//! `watch` 通道发布给界面层。

use async_trait::async_trait;
use shared::message::QueueEvent;
use shared::models::{BoardSnapshot, WaitingEntry};
use tokio::sync::watch;

use crate::{ClientResult, QueueHttpClient};

#[async_trait]
pub trait QueueView: Send + Sync {
    /// 应用单个条目的补丁 (new_user / user_called / status_changed ...)
    async fn apply_patch(&self, event: &QueueEvent) -> ClientResult<()>;

    /// 重新拉取一个班级的队列
    async fn refetch_class(&self, store_id: i64, class_id: i64) -> ClientResult<()>;

    /// 重新拉取全店快照 (每次 (重)连接后、营业日开/关时)
    async fn refetch_all(&self, store_id: i64) -> ClientResult<()>;
}

/// 通过 HTTP 维护的看板镜像
pub struct BoardMirror {
    http: QueueHttpClient,
    snapshot: watch::Sender<Option<BoardSnapshot>>,
}

impl BoardMirror {
    pub fn new(http: QueueHttpClient) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self { http, snapshot }
    }

    /// 订阅快照变化
    pub fn subscribe(&self) -> watch::Receiver<Option<BoardSnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Option<BoardSnapshot> {
        self.snapshot.borrow().clone()
    }
}

/// 按条目 ID 更新或移除，保持 class_order 连续
fn upsert_entry(board: &mut BoardSnapshot, entry: WaitingEntry) -> bool {
    if !board.classes.iter().any(|c| c.class_id == entry.class_id) {
        return false;
    }
    for class in board.classes.iter_mut() {
        class.entries.retain(|e| e.id != entry.id);
        if class.class_id == entry.class_id && entry.is_live() {
            class.entries.push(entry.clone());
            class.entries.sort_by_key(|e| e.class_order);
        }
    }
    for class in board.classes.iter_mut() {
        for (index, e) in class.entries.iter_mut().enumerate() {
            e.class_order = index as u32 + 1;
        }
        class.occupancy = class.entries.len() as u32;
    }
    true
}

#[async_trait]
impl QueueView for BoardMirror {
    async fn apply_patch(&self, event: &QueueEvent) -> ClientResult<()> {
        let Some(entry_id) = event.entry_id() else {
            return Ok(());
        };
        let entry = self.http.entry(event.store_id(), entry_id).await?;
        let mut applied = false;
        self.snapshot.send_if_modified(|snapshot| match snapshot {
            Some(board) => {
                applied = upsert_entry(board, entry);
                applied
            }
            None => false,
        });
        if !applied {
            // 快照里没有该班级：直接拉全量
            return self.refetch_all(event.store_id()).await;
        }
        Ok(())
    }

    async fn refetch_class(&self, store_id: i64, class_id: i64) -> ClientResult<()> {
        let entries = self.http.class_entries(store_id, class_id).await?;
        let mut found = false;
        self.snapshot.send_if_modified(|snapshot| {
            let Some(class) = snapshot
                .as_mut()
                .and_then(|b| b.classes.iter_mut().find(|c| c.class_id == class_id))
            else {
                return false;
            };
            class.occupancy = entries.len() as u32;
            class.entries = entries;
            found = true;
            true
        });
        if !found {
            return self.refetch_all(store_id).await;
        }
        Ok(())
    }

    async fn refetch_all(&self, store_id: i64) -> ClientResult<()> {
        let board = self.http.board(store_id).await?;
        self.snapshot.send_replace(Some(board));
        Ok(())
    }
}
