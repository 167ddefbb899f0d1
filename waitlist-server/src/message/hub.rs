//! 事件广播中心
//!
//! # 架构
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      BroadcastHub                         │
//! │  stores: DashMap<store_id, DashMap<subscriber_id, Sub>>   │
//! └───────────────┬──────────────────────────────────────────┘
//!                 │ try_send (不等待)
//!     ┌───────────┼───────────┐
//!     ▼           ▼           ▼
//!  mpsc(64)    mpsc(64)    mpsc(64)     每个订阅者一个有界队列
//!     │           │           │
//!  SSE 连接    SSE 连接    SSE 连接
//! ```
//!
//! 发布路径从不等待网络写入：队列已满记一次 miss，连续 miss 达到上限
//! 或接收端已关闭时移除该订阅者。单个订阅者的失败不影响其他订阅者，
//! 也不会回传给触发事件的队列操作。

use std::pin::Pin;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use dashmap::DashMap;
use futures::Stream;
use serde::Serialize;
use shared::message::{QueueEvent, SubscriberRole};
use shared::util::now_millis;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::queue::EventPublisher;

/// 广播中心配置
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// 每个订阅者的缓冲区大小
    pub subscriber_buffer: usize,
    /// 连续投递失败 (含心跳) 达到该次数后移除订阅者
    pub max_missed: u32,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: 64,
            max_missed: 3,
        }
    }
}

/// 单个订阅者
struct Subscriber {
    role: SubscriberRole,
    tx: mpsc::Sender<Arc<QueueEvent>>,
    connected_at: i64,
    last_delivery: AtomicI64,
    missed: AtomicU32,
}

/// 订阅者快照 (用于健康检查)
#[derive(Debug, Clone, Serialize)]
pub struct SubscriberInfo {
    pub id: Uuid,
    pub role: SubscriberRole,
    pub connected_at: i64,
    pub last_delivery: i64,
    pub missed: u32,
}

/// 单次投递结果
enum Delivery {
    Sent,
    Missed,
    Evict(&'static str),
}

struct HubInner {
    config: HubConfig,
    stores: DashMap<i64, DashMap<Uuid, Arc<Subscriber>>>,
}

/// 广播中心 - 按门店扇出队列事件
///
/// 克隆成本低 (内部 Arc)。订阅表只由广播中心持有和修改。
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("stores", &self.inner.stores.len())
            .field("subscribers", &self.total_subscribers())
            .finish()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl BroadcastHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                config,
                stores: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    /// 注册订阅者，并立即推送 `connected` 事件
    ///
    /// 返回的 [`Subscription`] 被 drop 时自动取消订阅。
    pub fn subscribe(&self, store_id: i64, role: SubscriberRole) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.inner.config.subscriber_buffer.max(1));
        let now = now_millis();

        // 新通道必有空位
        let _ = tx.try_send(Arc::new(QueueEvent::connected(
            store_id,
            &id.to_string(),
            role,
        )));

        self.inner.stores.entry(store_id).or_default().insert(
            id,
            Arc::new(Subscriber {
                role,
                tx,
                connected_at: now,
                last_delivery: AtomicI64::new(now),
                missed: AtomicU32::new(0),
            }),
        );
        tracing::info!(store_id, subscriber_id = %id, role = %role, "Subscriber connected");

        Subscription {
            id,
            store_id,
            role,
            receiver: rx,
            _guard: SubscriptionGuard {
                hub: Arc::downgrade(&self.inner),
                store_id,
                id,
            },
        }
    }

    /// 移除订阅者 (幂等)，返回是否确实移除
    pub fn unsubscribe(&self, store_id: i64, subscriber_id: Uuid) -> bool {
        remove_subscriber(&self.inner, store_id, subscriber_id, "unsubscribed")
    }

    /// 向门店所有订阅者投递事件，返回成功投递数
    ///
    /// 没有订阅者时为空操作。
    pub fn publish(&self, event: QueueEvent) -> usize {
        self.deliver(Arc::new(event))
    }

    /// 向门店所有订阅者发送 `ping`，返回成功投递数
    pub fn heartbeat(&self, store_id: i64) -> usize {
        self.deliver(Arc::new(QueueEvent::ping(store_id)))
    }

    /// 对所有有订阅者的门店发送心跳
    pub fn heartbeat_all(&self) -> usize {
        self.store_ids()
            .into_iter()
            .map(|store_id| self.heartbeat(store_id))
            .sum()
    }

    fn deliver(&self, event: Arc<QueueEvent>) -> usize {
        let store_id = event.store_id();
        let max_missed = self.inner.config.max_missed.max(1);

        let mut delivered = 0;
        let mut evicted: Vec<(Uuid, &'static str)> = Vec::new();
        {
            let Some(subscribers) = self.inner.stores.get(&store_id) else {
                return 0;
            };
            for entry in subscribers.iter() {
                match try_deliver(entry.value(), &event, max_missed) {
                    Delivery::Sent => delivered += 1,
                    Delivery::Missed => {
                        tracing::debug!(
                            store_id,
                            subscriber_id = %entry.key(),
                            event = %event.event,
                            "Subscriber buffer full, event dropped"
                        );
                    }
                    Delivery::Evict(reason) => evicted.push((*entry.key(), reason)),
                }
            }
        }

        for (id, reason) in evicted {
            remove_subscriber(&self.inner, store_id, id, reason);
        }
        delivered
    }

    pub fn subscriber_count(&self, store_id: i64) -> usize {
        self.inner
            .stores
            .get(&store_id)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    pub fn total_subscribers(&self) -> usize {
        self.inner.stores.iter().map(|s| s.len()).sum()
    }

    /// 当前有订阅者的门店
    pub fn store_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .inner
            .stores
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| *s.key())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn subscribers(&self, store_id: i64) -> Vec<SubscriberInfo> {
        let Some(subscribers) = self.inner.stores.get(&store_id) else {
            return Vec::new();
        };
        subscribers
            .iter()
            .map(|entry| {
                let sub = entry.value();
                SubscriberInfo {
                    id: *entry.key(),
                    role: sub.role,
                    connected_at: sub.connected_at,
                    last_delivery: sub.last_delivery.load(Ordering::Relaxed),
                    missed: sub.missed.load(Ordering::Relaxed),
                }
            })
            .collect()
    }
}

impl EventPublisher for BroadcastHub {
    fn publish(&self, event: QueueEvent) {
        BroadcastHub::publish(self, event);
    }
}

fn try_deliver(sub: &Subscriber, event: &Arc<QueueEvent>, max_missed: u32) -> Delivery {
    match sub.tx.try_send(event.clone()) {
        Ok(()) => {
            sub.missed.store(0, Ordering::Relaxed);
            sub.last_delivery.store(now_millis(), Ordering::Relaxed);
            Delivery::Sent
        }
        Err(TrySendError::Closed(_)) => Delivery::Evict("connection closed"),
        Err(TrySendError::Full(_)) => {
            let missed = sub.missed.fetch_add(1, Ordering::Relaxed) + 1;
            if missed >= max_missed {
                Delivery::Evict("too many missed deliveries")
            } else {
                Delivery::Missed
            }
        }
    }
}

fn remove_subscriber(inner: &HubInner, store_id: i64, id: Uuid, reason: &str) -> bool {
    let removed = inner
        .stores
        .get(&store_id)
        .and_then(|subscribers| subscribers.remove(&id))
        .is_some();
    // 外层读引用已释放，此处才能获取写锁
    inner.stores.remove_if(&store_id, |_, subscribers| subscribers.is_empty());

    if removed {
        tracing::info!(store_id, subscriber_id = %id, reason, "Subscriber removed");
    }
    removed
}

/// 订阅句柄
///
/// 作为 [`Stream`] 产出该门店的事件，第一条始终是 `connected`。
/// drop 时取消订阅。
pub struct Subscription {
    id: Uuid,
    store_id: i64,
    role: SubscriberRole,
    receiver: mpsc::Receiver<Arc<QueueEvent>>,
    _guard: SubscriptionGuard,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store_id(&self) -> i64 {
        self.store_id
    }

    pub fn role(&self) -> SubscriberRole {
        self.role
    }

    /// 接收下一条事件；被移除后返回 `None`
    pub async fn recv(&mut self) -> Option<Arc<QueueEvent>> {
        self.receiver.recv().await
    }
}

impl Stream for Subscription {
    type Item = Arc<QueueEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

struct SubscriptionGuard {
    hub: Weak<HubInner>,
    store_id: i64,
    id: Uuid,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            remove_subscriber(&inner, self.store_id, self.id, "disconnected");
        }
    }
}
