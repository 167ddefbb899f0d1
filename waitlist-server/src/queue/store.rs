//! Queue store - 所有候位条目变更的唯一入口
//!
//! # 锁粒度
//!
//! ```text
//! QueueStore
//!   └─ stores: DashMap<store_id, StoreQueues>
//!        ├─ day: RwLock<Option<OpenDay>>     变更操作持读锁，开/关营业日持写锁
//!        ├─ classes: DashMap<class_id, Mutex<ClassQueue>>   每个班级一把锁
//!        ├─ entry_index: DashMap<entry_id, class_id>
//!        └─ closed: DashMap<class_id, closed_at>            仅在班级锁内写入
//! ```
//!
//! 同一班级的变更严格串行，不同班级互不阻塞。跨班级移动按 class_id
//! 升序加锁。事件在释放班级锁之前发布 (非阻塞)，因此同一班级的事件
//! 顺序与提交顺序一致。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::message::{EventKind, QueueEvent};
use shared::models::{
    BoardClass, BoardSnapshot, BusinessDay, BusinessDaySummary, BusinessDayTotals,
    BusinessStatus, CloseCheck, CloseClassResult, CustomerRef, MemberPatch, PartyBreakdown,
    SlotStatus, StoreSettings, WaitingEntry, WaitingStatus,
};
use shared::util::{now_millis, snowflake_id};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard};

use super::class_queue::ClassQueue;
use super::error::{QueueError, QueueResult};
use super::EventPublisher;
use crate::scheduler::{self, ClassLoad, SlotQuery};

/// 条目所在班级在加锁期间被移动时的重试次数
const RELOCATE_ATTEMPTS: usize = 8;

/// 当前营业日
struct OpenDay {
    day: BusinessDay,
    /// 下一个 waiting_number
    next_waiting: AtomicU64,
}

/// 单个门店的队列状态
struct StoreQueues {
    store_id: i64,
    settings: parking_lot::RwLock<Arc<StoreSettings>>,
    day: RwLock<Option<OpenDay>>,
    classes: DashMap<i64, Arc<Mutex<ClassQueue>>>,
    entry_index: DashMap<i64, i64>,
    closed: DashMap<i64, i64>,
}

impl StoreQueues {
    fn new(settings: StoreSettings) -> Self {
        Self {
            store_id: settings.store_id,
            settings: parking_lot::RwLock::new(Arc::new(settings)),
            day: RwLock::new(None),
            classes: DashMap::new(),
            entry_index: DashMap::new(),
            closed: DashMap::new(),
        }
    }

    fn settings(&self) -> Arc<StoreSettings> {
        self.settings.read().clone()
    }

    /// 获取营业日读锁，未开业返回 `BusinessNotOpen`
    async fn open_day(&self) -> QueueResult<RwLockReadGuard<'_, OpenDay>> {
        let guard = self.day.read().await;
        RwLockReadGuard::try_map(guard, |day| day.as_ref())
            .map_err(|_| QueueError::BusinessNotOpen(self.store_id))
    }

    fn class_capacity(&self, class_id: i64) -> QueueResult<u32> {
        self.settings()
            .class(class_id)
            .map(|c| c.max_capacity)
            .ok_or(QueueError::ClassNotFound(class_id))
    }

    fn class_queue(&self, class_id: i64) -> Arc<Mutex<ClassQueue>> {
        self.classes
            .entry(class_id)
            .or_insert_with(|| Arc::new(Mutex::new(ClassQueue::new(class_id))))
            .clone()
    }

    async fn lock_class(&self, class_id: i64) -> OwnedMutexGuard<ClassQueue> {
        self.class_queue(class_id).lock_owned().await
    }

    /// 按 class_id 升序加锁，返回顺序与参数一致
    async fn lock_pair(
        &self,
        first: i64,
        second: i64,
    ) -> (OwnedMutexGuard<ClassQueue>, OwnedMutexGuard<ClassQueue>) {
        if first < second {
            let a = self.lock_class(first).await;
            let b = self.lock_class(second).await;
            (a, b)
        } else {
            let b = self.lock_class(second).await;
            let a = self.lock_class(first).await;
            (a, b)
        }
    }

    fn class_of(&self, entry_id: i64) -> QueueResult<i64> {
        self.entry_index
            .get(&entry_id)
            .map(|class_id| *class_id)
            .ok_or(QueueError::EntryNotFound(entry_id))
    }

    /// 锁定条目所在班级
    async fn lock_entry(&self, entry_id: i64) -> QueueResult<OwnedMutexGuard<ClassQueue>> {
        for _ in 0..RELOCATE_ATTEMPTS {
            let class_id = self.class_of(entry_id)?;
            let queue = self.lock_class(class_id).await;
            if queue.contains(entry_id) {
                return Ok(queue);
            }
        }
        tracing::warn!(store_id = self.store_id, entry_id, "Entry kept moving while locking");
        Err(QueueError::EntryNotFound(entry_id))
    }

    fn is_closed(&self, class_id: i64) -> bool {
        self.closed.contains_key(&class_id)
    }

    fn closed_set(&self) -> HashSet<i64> {
        self.closed.iter().map(|e| *e.key()).collect()
    }

    async fn business_day(&self) -> Option<BusinessDay> {
        self.day.read().await.as_ref().map(|d| d.day.clone())
    }
}

fn invalid_status(entry: &WaitingEntry) -> QueueError {
    QueueError::InvalidStatus {
        entry_id: entry.id,
        status: entry.status,
    }
}

/// 仍在队列中的真实顾客条目；空位和已结算条目返回 `InvalidStatus`
fn live_customer_mut(queue: &mut ClassQueue, entry_id: i64) -> QueueResult<&mut WaitingEntry> {
    match queue.get(entry_id) {
        Some(entry) if entry.is_live() && !entry.is_empty_seat => {}
        Some(entry) => return Err(invalid_status(entry)),
        None => return Err(QueueError::EntryNotFound(entry_id)),
    }
    queue
        .get_live_mut(entry_id)
        .ok_or(QueueError::EntryNotFound(entry_id))
}

/// 候位队列存储
///
/// 克隆成本低 (内部 Arc)，可在 HTTP handler 间共享。
#[derive(Clone)]
pub struct QueueStore {
    stores: Arc<DashMap<i64, Arc<StoreQueues>>>,
    entry_ids: Arc<AtomicI64>,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("stores", &self.stores.len())
            .finish()
    }
}

impl QueueStore {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            stores: Arc::new(DashMap::new()),
            entry_ids: Arc::new(AtomicI64::new(snowflake_id())),
            publisher,
        }
    }

    fn store(&self, store_id: i64) -> QueueResult<Arc<StoreQueues>> {
        self.stores
            .get(&store_id)
            .map(|s| s.clone())
            .ok_or(QueueError::StoreNotFound(store_id))
    }

    fn next_entry_id(&self) -> i64 {
        self.entry_ids.fetch_add(1, Ordering::Relaxed)
    }

    fn publish(&self, event: QueueEvent) {
        self.publisher.publish(event);
    }

    // ========== Settings ==========

    /// 新增或替换门店配置，返回是否为新门店
    ///
    /// 替换配置不影响现有条目。
    pub fn configure_store(&self, settings: StoreSettings) -> bool {
        let store_id = settings.store_id;
        match self.stores.entry(store_id) {
            Entry::Occupied(store) => {
                *store.get().settings.write() = Arc::new(settings);
                tracing::info!(store_id, "Store settings replaced");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(StoreQueues::new(settings)));
                tracing::info!(store_id, "Store configured");
                true
            }
        }
    }

    pub fn settings(&self, store_id: i64) -> QueueResult<Arc<StoreSettings>> {
        Ok(self.store(store_id)?.settings())
    }

    pub fn store_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.stores.iter().map(|s| *s.key()).collect();
        ids.sort_unstable();
        ids
    }

    // ========== Scheduler ==========

    /// 解析下一个可登记时段 (只读)
    ///
    /// 营业日开启时按营业日日期选取班级，与 [`Self::board`] 一致；
    /// `now` 只在未开启营业日时用于计算当天班级的占用。
    pub async fn resolve_next_slot(
        &self,
        store_id: i64,
        now: NaiveDateTime,
    ) -> QueueResult<SlotStatus> {
        let store = self.store(store_id)?;
        let settings = store.settings();
        let business_date = store.business_day().await.map(|d| d.business_date);
        let closed = store.closed_set();

        let mut loads = HashMap::new();
        for class in settings.classes_on(business_date.unwrap_or(now.date())) {
            let occupancy = match store.classes.get(&class.id).map(|q| q.clone()) {
                Some(queue) => queue.lock().await.occupancy(),
                None => 0,
            };
            loads.insert(class.id, ClassLoad { occupancy });
        }

        let status = match scheduler::resolve_next_slot(&SlotQuery {
            settings: &settings,
            business_date,
            closed: &closed,
            loads: &loads,
        }) {
            Ok(slot) => SlotStatus::Available(slot),
            Err(reason) => reason.into(),
        };
        Ok(status)
    }

    // ========== Registration ==========

    /// 登记到指定班级
    ///
    /// 容量检查、waiting_number 分配和入队在同一班级锁内完成。
    pub async fn register(
        &self,
        store_id: i64,
        class_id: i64,
        customer: CustomerRef,
        party_size: u32,
        party_breakdown: Option<PartyBreakdown>,
    ) -> QueueResult<WaitingEntry> {
        if party_size == 0 {
            return Err(QueueError::Validation("party_size must be at least 1".into()));
        }
        let store = self.store(store_id)?;
        let day = store.open_day().await?;
        let capacity = store.class_capacity(class_id)?;

        let mut queue = store.lock_class(class_id).await;
        if store.is_closed(class_id) {
            return Err(QueueError::ClassClosed(class_id));
        }
        if queue.occupancy() >= capacity {
            return Err(QueueError::ClassFull { class_id, capacity });
        }

        let waiting_number = day.next_waiting.fetch_add(1, Ordering::SeqCst);
        let entry = queue.push_back(WaitingEntry {
            id: self.next_entry_id(),
            store_id,
            class_id,
            waiting_number,
            class_order: 0,
            status: WaitingStatus::Waiting,
            party_size,
            party_breakdown,
            name: customer.name,
            phone: customer.phone,
            is_empty_seat: false,
            revisit_count: customer.revisit_count,
            registered_at: now_millis(),
            called_at: None,
            call_count: 0,
            settled_at: None,
        });
        store.entry_index.insert(entry.id, class_id);

        self.publish(
            QueueEvent::new(EventKind::NewUser, store_id)
                .class(class_id)
                .entry(entry.id)
                .with("waiting_number", waiting_number)
                .with("class_order", entry.class_order),
        );
        drop(queue);

        tracing::info!(
            store_id,
            class_id,
            entry_id = entry.id,
            waiting_number,
            class_order = entry.class_order,
            "Waiting entry registered"
        );
        Ok(entry)
    }

    /// 插入空位占位条目
    ///
    /// 空位不占用 waiting_number (为 0)，也不受容量限制。
    pub async fn insert_empty_seat(
        &self,
        store_id: i64,
        class_id: i64,
        position: u32,
    ) -> QueueResult<WaitingEntry> {
        if position == 0 {
            return Err(QueueError::Validation("position is 1-based".into()));
        }
        let store = self.store(store_id)?;
        let _day = store.open_day().await?;
        store.class_capacity(class_id)?;

        let mut queue = store.lock_class(class_id).await;
        if store.is_closed(class_id) {
            return Err(QueueError::ClassClosed(class_id));
        }
        let seat = queue.insert_at(
            position,
            WaitingEntry {
                id: self.next_entry_id(),
                store_id,
                class_id,
                waiting_number: 0,
                class_order: 0,
                status: WaitingStatus::Waiting,
                party_size: 0,
                party_breakdown: None,
                name: None,
                phone: None,
                is_empty_seat: true,
                revisit_count: 0,
                registered_at: now_millis(),
                called_at: None,
                call_count: 0,
                settled_at: None,
            },
        );
        store.entry_index.insert(seat.id, class_id);

        self.publish(
            QueueEvent::new(EventKind::EmptySeatInserted, store_id)
                .class(class_id)
                .entry(seat.id)
                .with("class_order", seat.class_order),
        );
        drop(queue);

        tracing::info!(store_id, class_id, entry_id = seat.id, class_order = seat.class_order, "Empty seat inserted");
        Ok(seat)
    }

    // ========== Entry operations ==========

    /// 呼叫 (waiting → called)，重复呼叫只更新呼叫次数
    pub async fn call(&self, store_id: i64, entry_id: i64) -> QueueResult<WaitingEntry> {
        let store = self.store(store_id)?;
        let _day = store.open_day().await?;
        let mut queue = store.lock_entry(entry_id).await?;
        let class_id = queue.class_id();

        match queue.get(entry_id) {
            Some(entry) if entry.is_live() && !entry.is_empty_seat => {}
            Some(entry) => return Err(invalid_status(entry)),
            None => return Err(QueueError::EntryNotFound(entry_id)),
        }
        let entry = queue
            .get_live_mut(entry_id)
            .ok_or(QueueError::EntryNotFound(entry_id))?;
        entry.status = WaitingStatus::Called;
        entry.called_at = Some(now_millis());
        entry.call_count += 1;
        let entry = entry.clone();

        self.publish(
            QueueEvent::new(EventKind::UserCalled, store_id)
                .class(class_id)
                .entry(entry_id)
                .with("waiting_number", entry.waiting_number)
                .with("call_count", entry.call_count),
        );
        drop(queue);

        tracing::info!(store_id, class_id, entry_id, call_count = entry.call_count, "Waiting entry called");
        Ok(entry)
    }

    /// 结算条目 (attended / cancelled) 并压缩班级顺序
    pub async fn set_status(
        &self,
        store_id: i64,
        entry_id: i64,
        status: WaitingStatus,
    ) -> QueueResult<WaitingEntry> {
        if status.is_live() {
            return Err(QueueError::Validation(format!(
                "status must be attended or cancelled, got {}",
                status.as_str()
            )));
        }
        let store = self.store(store_id)?;
        let _day = store.open_day().await?;
        let mut queue = store.lock_entry(entry_id).await?;
        let class_id = queue.class_id();

        let Some(entry) = queue.settle(entry_id, status, now_millis()) else {
            return Err(queue
                .get(entry_id)
                .map(invalid_status)
                .unwrap_or(QueueError::EntryNotFound(entry_id)));
        };

        self.publish(
            QueueEvent::new(EventKind::StatusChanged, store_id)
                .class(class_id)
                .entry(entry_id)
                .with("status", status.as_str()),
        );
        drop(queue);

        tracing::info!(store_id, class_id, entry_id, status = status.as_str(), "Waiting entry settled");
        Ok(entry)
    }

    /// 交换同一班级内两个条目的顺序，返回交换后的班级队列
    pub async fn swap_order(
        &self,
        store_id: i64,
        entry_a: i64,
        entry_b: i64,
    ) -> QueueResult<Vec<WaitingEntry>> {
        if entry_a == entry_b {
            return Err(QueueError::Validation("cannot swap an entry with itself".into()));
        }
        let store = self.store(store_id)?;
        let _day = store.open_day().await?;

        for _ in 0..RELOCATE_ATTEMPTS {
            let class_a = store.class_of(entry_a)?;
            let class_b = store.class_of(entry_b)?;
            if class_a != class_b {
                return Err(QueueError::CrossClassSwap { entry_a, entry_b });
            }

            let mut queue = store.lock_class(class_a).await;
            if !queue.contains(entry_a) || !queue.contains(entry_b) {
                continue;
            }
            for id in [entry_a, entry_b] {
                if let Some(entry) = queue.get(id).filter(|e| !e.is_live()) {
                    return Err(invalid_status(entry));
                }
            }
            queue.swap(entry_a, entry_b);
            let live = queue.live().to_vec();

            self.publish(
                QueueEvent::new(EventKind::OrderChanged, store_id)
                    .class(class_a)
                    .with("entry_ids", vec![entry_a, entry_b]),
            );
            drop(queue);

            tracing::info!(store_id, class_id = class_a, entry_a, entry_b, "Class order swapped");
            return Ok(live);
        }
        Err(QueueError::EntryNotFound(entry_a))
    }

    /// 移动条目到另一个班级的队尾
    pub async fn move_to_class(
        &self,
        store_id: i64,
        entry_id: i64,
        target_class_id: i64,
    ) -> QueueResult<WaitingEntry> {
        let store = self.store(store_id)?;
        let _day = store.open_day().await?;
        let capacity = store.class_capacity(target_class_id)?;

        for _ in 0..RELOCATE_ATTEMPTS {
            let source_class_id = store.class_of(entry_id)?;
            if source_class_id == target_class_id {
                return Err(QueueError::Validation(format!(
                    "entry {} is already in class {}",
                    entry_id, target_class_id
                )));
            }

            let (mut source, mut target) = store.lock_pair(source_class_id, target_class_id).await;
            if !source.contains(entry_id) {
                continue;
            }
            if let Some(entry) = source.get(entry_id).filter(|e| !e.is_live()) {
                return Err(invalid_status(entry));
            }
            if store.is_closed(target_class_id) {
                return Err(QueueError::ClassClosed(target_class_id));
            }
            if target.occupancy() >= capacity {
                return Err(QueueError::ClassFull {
                    class_id: target_class_id,
                    capacity,
                });
            }

            let Some(entry) = source.take_live(entry_id) else {
                return Err(QueueError::EntryNotFound(entry_id));
            };
            let moved = target.push_back(entry);
            store.entry_index.insert(entry_id, target_class_id);

            self.publish(
                QueueEvent::new(EventKind::ClassMoved, store_id)
                    .class(target_class_id)
                    .entry(entry_id)
                    .with("from_class_id", source_class_id)
                    .with("class_order", moved.class_order),
            );
            drop(target);
            drop(source);

            tracing::info!(
                store_id,
                entry_id,
                from_class_id = source_class_id,
                class_id = target_class_id,
                class_order = moved.class_order,
                "Waiting entry moved"
            );
            return Ok(moved);
        }
        Err(QueueError::EntryNotFound(entry_id))
    }

    /// 修改显示名称 (仅限 waiting/called 的真实顾客)
    pub async fn rename_entry(
        &self,
        store_id: i64,
        entry_id: i64,
        name: String,
    ) -> QueueResult<WaitingEntry> {
        let store = self.store(store_id)?;
        let _day = store.open_day().await?;
        let mut queue = store.lock_entry(entry_id).await?;
        let class_id = queue.class_id();

        let entry = live_customer_mut(&mut queue, entry_id)?;
        entry.name = Some(name.clone());
        let entry = entry.clone();

        self.publish(
            QueueEvent::new(EventKind::NameUpdated, store_id)
                .class(class_id)
                .entry(entry_id)
                .with("name", name),
        );
        Ok(entry)
    }

    /// 更新会员信息 (电话、人数)，同样不接受空位和已结算条目
    pub async fn update_member(
        &self,
        store_id: i64,
        entry_id: i64,
        patch: MemberPatch,
    ) -> QueueResult<WaitingEntry> {
        if patch.is_empty() {
            return Err(QueueError::Validation("nothing to update".into()));
        }
        if patch.party_size == Some(0) {
            return Err(QueueError::Validation("party_size must be at least 1".into()));
        }
        let store = self.store(store_id)?;
        let _day = store.open_day().await?;
        let mut queue = store.lock_entry(entry_id).await?;
        let class_id = queue.class_id();

        let entry = live_customer_mut(&mut queue, entry_id)?;
        if let Some(phone) = patch.phone {
            entry.phone = Some(phone);
        }
        if let Some(party_size) = patch.party_size {
            entry.party_size = party_size;
        }
        if let Some(breakdown) = patch.party_breakdown {
            entry.party_breakdown = Some(breakdown);
        }
        let entry = entry.clone();

        self.publish(
            QueueEvent::new(EventKind::MemberUpdated, store_id)
                .class(class_id)
                .entry(entry_id)
                .with("party_size", entry.party_size),
        );
        Ok(entry)
    }

    // ========== Class operations ==========

    /// 顺序关闭预检查 (advisory)
    pub async fn check_close_class(&self, store_id: i64, class_id: i64) -> QueueResult<CloseCheck> {
        let store = self.store(store_id)?;
        let day = store.open_day().await?;
        let settings = store.settings();
        settings
            .class(class_id)
            .ok_or(QueueError::ClassNotFound(class_id))?;

        let open_earlier_classes = if settings.sequential_closing {
            scheduler::open_earlier_classes(
                &settings,
                day.day.business_date,
                class_id,
                &store.closed_set(),
            )
        } else {
            Vec::new()
        };
        Ok(CloseCheck {
            class_id,
            can_close: !store.is_closed(class_id) && open_earlier_classes.is_empty(),
            open_earlier_classes,
        })
    }

    /// 关闭班级：剩余 waiting/called 全部转为 attended
    ///
    /// 开启顺序关闭策略时，若更早的班级仍未关闭则返回
    /// `SequentialOrderViolation`，`force` 可跳过该检查。
    pub async fn close_class(
        &self,
        store_id: i64,
        class_id: i64,
        force: bool,
    ) -> QueueResult<CloseClassResult> {
        let store = self.store(store_id)?;
        let day = store.open_day().await?;
        let settings = store.settings();
        settings
            .class(class_id)
            .ok_or(QueueError::ClassNotFound(class_id))?;

        // 在获取班级锁之前检查，避免与跨班级移动交叉加锁
        if settings.sequential_closing && !force {
            let open_earlier = scheduler::open_earlier_classes(
                &settings,
                day.day.business_date,
                class_id,
                &store.closed_set(),
            );
            if !open_earlier.is_empty() {
                return Err(QueueError::SequentialOrderViolation {
                    class_id,
                    open_earlier,
                });
            }
        }

        let mut queue = store.lock_class(class_id).await;
        if store.is_closed(class_id) {
            return Err(QueueError::ClassClosed(class_id));
        }
        let now = now_millis();
        let attended_count = queue.settle_all(WaitingStatus::Attended, now);
        store.closed.insert(class_id, now);

        self.publish(
            QueueEvent::new(EventKind::ClassClosed, store_id)
                .class(class_id)
                .with("attended_count", attended_count),
        );
        drop(queue);

        tracing::info!(store_id, class_id, attended_count, forced = force, "Class closed");
        Ok(CloseClassResult {
            class_id,
            attended_count,
        })
    }

    /// 重新开放当天已关闭的班级
    pub async fn reopen_class(&self, store_id: i64, class_id: i64) -> QueueResult<()> {
        let store = self.store(store_id)?;
        let _day = store.open_day().await?;
        store.class_capacity(class_id)?;

        let queue = store.lock_class(class_id).await;
        if store.closed.remove(&class_id).is_none() {
            return Err(QueueError::Validation(format!("class {} is not closed", class_id)));
        }
        self.publish(QueueEvent::new(EventKind::ClassReopened, store_id).class(class_id));
        drop(queue);

        tracing::info!(store_id, class_id, "Class reopened");
        Ok(())
    }

    /// 批量出席：同一把锁内结算，只压缩一次、只发布一次事件
    pub async fn batch_attendance(
        &self,
        store_id: i64,
        class_id: i64,
        entry_ids: &[i64],
    ) -> QueueResult<Vec<i64>> {
        let mut ids: Vec<i64> = Vec::with_capacity(entry_ids.len());
        for id in entry_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        if ids.is_empty() {
            return Err(QueueError::Validation("entry_ids must not be empty".into()));
        }

        let store = self.store(store_id)?;
        let _day = store.open_day().await?;
        store.class_capacity(class_id)?;

        let mut queue = store.lock_class(class_id).await;
        let settled = match queue.settle_many(&ids, WaitingStatus::Attended, now_millis()) {
            Ok(settled) => settled,
            Err(missing) => {
                return Err(queue
                    .get(missing)
                    .map(invalid_status)
                    .unwrap_or(QueueError::EntryNotFound(missing)));
            }
        };
        let attended: Vec<i64> = settled.iter().map(|e| e.id).collect();

        self.publish(
            QueueEvent::new(EventKind::BatchAttendance, store_id)
                .class(class_id)
                .with("entry_ids", attended.clone())
                .with("attended_count", attended.len()),
        );
        drop(queue);

        tracing::info!(store_id, class_id, count = attended.len(), "Batch attendance recorded");
        Ok(attended)
    }

    // ========== Business day ==========

    /// 开启营业日：重置 waiting_number、清空队列与关闭标记
    pub async fn open_business_day(
        &self,
        store_id: i64,
        business_date: NaiveDate,
    ) -> QueueResult<BusinessDay> {
        let store = self.store(store_id)?;
        let mut day = store.day.write().await;
        if day.is_some() {
            return Err(QueueError::BusinessAlreadyOpen(store_id));
        }

        store.classes.clear();
        store.entry_index.clear();
        store.closed.clear();

        let business_day = BusinessDay {
            store_id,
            business_date,
            opened_at: now_millis(),
        };
        *day = Some(OpenDay {
            day: business_day.clone(),
            next_waiting: AtomicU64::new(1),
        });

        self.publish(
            QueueEvent::new(EventKind::BusinessOpened, store_id)
                .with("business_date", business_date.to_string()),
        );
        drop(day);

        tracing::info!(store_id, %business_date, "Business day opened");
        Ok(business_day)
    }

    /// 关闭营业日：强制结算所有未结算条目并汇总
    ///
    /// 持有写锁，等待所有进行中的班级操作完成。
    pub async fn close_business_day(&self, store_id: i64) -> QueueResult<BusinessDaySummary> {
        let store = self.store(store_id)?;
        let mut day = store.day.write().await;
        let open = day.take().ok_or(QueueError::BusinessNotOpen(store_id))?;

        let now = now_millis();
        let queues: Vec<Arc<Mutex<ClassQueue>>> =
            store.classes.iter().map(|q| q.value().clone()).collect();

        let mut totals = BusinessDayTotals::default();
        let mut force_settled = 0;
        for queue in queues {
            let mut queue = queue.lock().await;
            force_settled += queue.settle_all(WaitingStatus::Attended, now);
            for entry in queue.all_entries().filter(|e| !e.is_empty_seat) {
                totals.total_waiting += 1;
                match entry.status {
                    WaitingStatus::Attended => totals.total_attended += 1,
                    WaitingStatus::Cancelled => totals.total_cancelled += 1,
                    WaitingStatus::Waiting | WaitingStatus::Called => {}
                }
            }
        }

        let summary = BusinessDaySummary {
            store_id,
            business_date: open.day.business_date,
            opened_at: open.day.opened_at,
            closed_at: now,
            totals,
        };

        self.publish(
            QueueEvent::new(EventKind::BusinessClosed, store_id)
                .with("business_date", summary.business_date.to_string())
                .with("total_waiting", totals.total_waiting)
                .with("total_attended", totals.total_attended)
                .with("total_cancelled", totals.total_cancelled),
        );
        drop(day);

        tracing::info!(
            store_id,
            business_date = %summary.business_date,
            total_waiting = totals.total_waiting,
            total_attended = totals.total_attended,
            total_cancelled = totals.total_cancelled,
            force_settled,
            "Business day closed"
        );
        Ok(summary)
    }

    pub async fn business_status(&self, store_id: i64) -> QueueResult<BusinessStatus> {
        let store = self.store(store_id)?;
        let business_day = store.business_day().await;
        Ok(BusinessStatus {
            store_id,
            is_open: business_day.is_some(),
            business_day,
        })
    }

    // ========== Reads ==========

    pub async fn get_entry(&self, store_id: i64, entry_id: i64) -> QueueResult<WaitingEntry> {
        let store = self.store(store_id)?;
        let queue = store.lock_entry(entry_id).await?;
        queue
            .get(entry_id)
            .cloned()
            .ok_or(QueueError::EntryNotFound(entry_id))
    }

    /// 班级当前队列 (按 class_order)
    pub async fn list_class(&self, store_id: i64, class_id: i64) -> QueueResult<Vec<WaitingEntry>> {
        let store = self.store(store_id)?;
        let queue = match store.classes.get(&class_id).map(|q| q.clone()) {
            Some(queue) => queue,
            None => {
                store.class_capacity(class_id)?;
                return Ok(Vec::new());
            }
        };
        let live = queue.lock().await.live().to_vec();
        Ok(live)
    }

    /// 全店快照：营业日状态 + 每个班级的队列
    ///
    /// 包含当天适用的班级，以及不适用但仍有条目的班级。
    pub async fn board(&self, store_id: i64, today: NaiveDate) -> QueueResult<BoardSnapshot> {
        let store = self.store(store_id)?;
        let settings = store.settings();
        let business_day = store.business_day().await;
        let date = business_day
            .as_ref()
            .map(|d| d.business_date)
            .unwrap_or(today);

        let mut sessions = settings.classes_on(date);
        let mut extra: Vec<_> = settings
            .classes
            .iter()
            .filter(|c| !sessions.iter().any(|s| s.id == c.id))
            .filter(|c| store.classes.contains_key(&c.id))
            .collect();
        extra.sort_by_key(|c| c.class_number);

        let mut classes = Vec::with_capacity(sessions.len() + extra.len());
        sessions.extend(extra);
        for session in sessions {
            let entries = match store.classes.get(&session.id).map(|q| q.clone()) {
                Some(queue) => queue.lock().await.live().to_vec(),
                None => Vec::new(),
            };
            classes.push(BoardClass {
                class_id: session.id,
                name: session.name.clone(),
                class_number: session.class_number,
                max_capacity: session.max_capacity,
                closed: store.is_closed(session.id),
                occupancy: entries.len() as u32,
                entries,
            });
        }

        Ok(BoardSnapshot {
            store_id,
            business_day,
            classes,
        })
    }
}
