//! 事件分发
//!
//! 按 [`EventKind`] 分类：
//!
//! | 分类 | 事件 | 处理 |
//! |------|------|------|
//! | Control | connected, ping | 只用于保活 |
//! | Patch | new_user, user_called, status_changed, name_updated, member_updated | 立即应用单条补丁 |
//! | Refetch | order_changed, class_moved, empty_seat_inserted, class_closed, class_reopened, batch_attendance | 防抖后重新拉取班级 |
//! | FullRefetch | business_opened, business_closed | 立即拉取全店快照 |
//!
//! 分类处理完成后，再依次调用为该事件注册的回调。

use std::collections::HashMap;
use std::sync::Arc;

use shared::message::{EventKind, QueueEvent};

use super::debounce::ClassRefetchDebouncer;
use super::view::QueueView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Control,
    Patch,
    Refetch,
    FullRefetch,
}

impl EventClass {
    pub fn of(kind: EventKind) -> Self {
        match kind {
            EventKind::Connected | EventKind::Ping => EventClass::Control,
            EventKind::NewUser
            | EventKind::UserCalled
            | EventKind::StatusChanged
            | EventKind::NameUpdated
            | EventKind::MemberUpdated => EventClass::Patch,
            EventKind::OrderChanged
            | EventKind::ClassMoved
            | EventKind::EmptySeatInserted
            | EventKind::ClassClosed
            | EventKind::ClassReopened
            | EventKind::BatchAttendance => EventClass::Refetch,
            EventKind::BusinessOpened | EventKind::BusinessClosed => EventClass::FullRefetch,
        }
    }
}

/// 事件回调
pub type EventHandler = Arc<dyn Fn(&QueueEvent) + Send + Sync>;

pub struct EventDispatcher {
    view: Arc<dyn QueueView>,
    debouncer: ClassRefetchDebouncer,
    handlers: HashMap<EventKind, Vec<EventHandler>>,
}

impl EventDispatcher {
    pub fn new(view: Arc<dyn QueueView>, debounce: std::time::Duration) -> Self {
        Self {
            debouncer: ClassRefetchDebouncer::new(debounce, view.clone()),
            view,
            handlers: HashMap::new(),
        }
    }

    /// 注册回调
    pub fn on<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        self.handlers.entry(kind).or_default().push(Arc::new(handler));
    }

    pub fn debouncer(&self) -> &ClassRefetchDebouncer {
        &self.debouncer
    }

    /// 全量拉取，并取消被覆盖的班级任务
    pub async fn refetch_all(&self, store_id: i64) {
        self.debouncer.cancel_all();
        if let Err(e) = self.view.refetch_all(store_id).await {
            tracing::warn!(store_id, error = %e, "Full refetch failed");
        }
    }

    fn schedule_class(&self, event: &QueueEvent) -> bool {
        let Some(class_id) = event.class_id() else {
            return false;
        };
        self.debouncer.schedule(event.store_id(), class_id);
        // 移动同时改变了来源班级
        if let Some(from) = event.extra_i64("from_class_id").filter(|from| *from != class_id) {
            self.debouncer.schedule(event.store_id(), from);
        }
        true
    }

    pub async fn dispatch(&self, event: &QueueEvent) -> EventClass {
        let class = EventClass::of(event.event);
        let store_id = event.store_id();
        match class {
            EventClass::Control => {}
            EventClass::Patch => {
                if let Err(e) = self.view.apply_patch(event).await {
                    tracing::warn!(store_id, event = %event.event, error = %e, "Patch failed, scheduling class refetch");
                    if !self.schedule_class(event) {
                        self.refetch_all(store_id).await;
                    }
                }
            }
            EventClass::Refetch => {
                if !self.schedule_class(event) {
                    self.refetch_all(store_id).await;
                }
            }
            EventClass::FullRefetch => self.refetch_all(store_id).await,
        }

        if let Some(handlers) = self.handlers.get(&event.event) {
            for handler in handlers {
                handler(event);
            }
        }
        class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::debounce::tests::RecordingView;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn dispatcher() -> (EventDispatcher, Arc<RecordingView>) {
        let view = Arc::new(RecordingView::default());
        (
            EventDispatcher::new(view.clone(), Duration::from_millis(300)),
            view,
        )
    }

    #[test]
    fn test_every_kind_is_classified() {
        let refetch: Vec<_> = EventKind::ALL
            .iter()
            .filter(|k| EventClass::of(**k) == EventClass::Refetch)
            .collect();
        assert_eq!(refetch.len(), 6);
        assert_eq!(EventClass::of(EventKind::Ping), EventClass::Control);
        assert_eq!(EventClass::of(EventKind::StatusChanged), EventClass::Patch);
        assert_eq!(
            EventClass::of(EventKind::BusinessClosed),
            EventClass::FullRefetch
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_patch_applied_immediately() {
        let (dispatcher, view) = dispatcher();
        let event = QueueEvent::new(EventKind::NewUser, 1).class(10).entry(99);
        assert_eq!(dispatcher.dispatch(&event).await, EventClass::Patch);
        assert_eq!(*view.patches.lock(), vec![99]);
        assert_eq!(dispatcher.debouncer().pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_events_are_debounced_per_class() {
        let (dispatcher, view) = dispatcher();
        let swap = QueueEvent::new(EventKind::OrderChanged, 1).class(10);
        let seat = QueueEvent::new(EventKind::EmptySeatInserted, 1).class(10).entry(5);

        dispatcher.dispatch(&swap).await;
        dispatcher.dispatch(&seat).await;
        dispatcher.dispatch(&swap).await;
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*view.class_refetches.lock(), vec![10]);
        assert!(view.patches.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_class_moved_refetches_both_classes() {
        let (dispatcher, view) = dispatcher();
        let moved = QueueEvent::new(EventKind::ClassMoved, 1)
            .class(20)
            .entry(5)
            .with("from_class_id", 10);
        dispatcher.dispatch(&moved).await;
        tokio::time::sleep(Duration::from_millis(400)).await;

        let mut refetched = view.class_refetches.lock().clone();
        refetched.sort_unstable();
        assert_eq!(refetched, vec![10, 20]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_business_events_refetch_everything() {
        let (dispatcher, view) = dispatcher();
        dispatcher
            .dispatch(&QueueEvent::new(EventKind::OrderChanged, 1).class(10))
            .await;
        dispatcher
            .dispatch(&QueueEvent::new(EventKind::BusinessClosed, 1))
            .await;
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*view.full_refetches.lock(), 1);
        // 全量拉取取消了待执行的班级任务
        assert!(view.class_refetches.lock().is_empty());
    }

    #[tokio::test]
    async fn test_handlers_run_after_classification() {
        let (mut dispatcher, _view) = dispatcher();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        dispatcher.on(EventKind::Ping, move |event| {
            assert_eq!(event.event, EventKind::Ping);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.dispatch(&QueueEvent::ping(1)).await;
        dispatcher.dispatch(&QueueEvent::ping(1)).await;
        dispatcher
            .dispatch(&QueueEvent::new(EventKind::NewUser, 1).class(1).entry(1))
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
