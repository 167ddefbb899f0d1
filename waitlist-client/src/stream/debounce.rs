//! 按班级防抖的重新拉取
//!
//! 每个班级最多一个待执行任务；同一班级的新事件会取消旧任务并重新计时。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

use super::view::QueueView;

type PendingMap = Arc<Mutex<HashMap<i64, (u64, AbortHandle)>>>;

pub struct ClassRefetchDebouncer {
    delay: Duration,
    view: Arc<dyn QueueView>,
    pending: PendingMap,
    generation: AtomicU64,
}

impl ClassRefetchDebouncer {
    pub fn new(delay: Duration, view: Arc<dyn QueueView>) -> Self {
        Self {
            delay,
            view,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// 安排 `delay` 后重新拉取该班级，取消之前尚未执行的同班级任务
    pub fn schedule(&self, store_id: i64, class_id: i64) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay;
        let view = self.view.clone();
        let pending = self.pending.clone();

        // 先持锁再 spawn，保证任务移除自身时条目已写入
        let mut guard = self.pending.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = pending.lock();
                if pending.get(&class_id).is_some_and(|(g, _)| *g == generation) {
                    pending.remove(&class_id);
                }
            }
            if let Err(e) = view.refetch_class(store_id, class_id).await {
                tracing::warn!(store_id, class_id, error = %e, "Class refetch failed");
            }
        });
        if let Some((_, previous)) = guard.insert(class_id, (generation, handle.abort_handle())) {
            previous.abort();
        }
    }

    /// 取消所有待执行任务 (全量拉取会覆盖它们)
    pub fn cancel_all(&self) {
        for (_, (_, handle)) in self.pending.lock().drain() {
            handle.abort();
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Drop for ClassRefetchDebouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
