use super::*;
use chrono::{NaiveDate, NaiveTime};
use parking_lot::Mutex;
use shared::message::EventKind;
use shared::models::{ClassSession, CustomerRef, DayType, StoreSettings, WaitingEntry};
use std::sync::Arc;

mod test_business;
mod test_concurrency;
mod test_core;

const STORE: i64 = 1;
const OTHER_STORE: i64 = 2;

/// 1교시 (cap 2), 2교시 (cap 5), 3교시 (cap 5)
const CLASS_1: i64 = 101;
const CLASS_2: i64 = 102;
const CLASS_3: i64 = 103;

/// 记录所有发布的事件
#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<QueueEvent>>,
}

impl RecordingPublisher {
    fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|e| e.event).collect()
    }

    fn last(&self) -> Option<QueueEvent> {
        self.events.lock().last().cloned()
    }

    fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: QueueEvent) {
        self.events.lock().push(event);
    }
}

/// 2026-10-19 (Monday)
fn business_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn class(id: i64, number: u32, capacity: u32) -> ClassSession {
    ClassSession {
        id,
        name: format!("{}교시", number),
        class_number: number,
        start_time: NaiveTime::from_hms_opt(8 + number, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(9 + number, 0, 0).unwrap(),
        max_capacity: capacity,
        weekdays: None,
        day_type: DayType::Weekday,
    }
}

fn test_settings(store_id: i64, sequential_closing: bool) -> StoreSettings {
    StoreSettings {
        store_id,
        name: format!("Store {}", store_id),
        timezone: "Asia/Seoul".to_string(),
        sequential_closing,
        holidays: vec![],
        classes: vec![class(CLASS_1, 1, 2), class(CLASS_2, 2, 5), class(CLASS_3, 3, 5)],
    }
}

fn create_test_store() -> (QueueStore, Arc<RecordingPublisher>) {
    let publisher = Arc::new(RecordingPublisher::default());
    let store = QueueStore::new(publisher.clone());
    store.configure_store(test_settings(STORE, false));
    (store, publisher)
}

async fn create_open_store() -> (QueueStore, Arc<RecordingPublisher>) {
    let (store, publisher) = create_test_store();
    store.open_business_day(STORE, business_date()).await.unwrap();
    publisher.clear();
    (store, publisher)
}

fn customer(name: &str) -> CustomerRef {
    CustomerRef {
        name: Some(name.to_string()),
        phone: None,
        revisit_count: 0,
    }
}

async fn register(store: &QueueStore, class_id: i64, name: &str) -> WaitingEntry {
    store
        .register(STORE, class_id, customer(name), 2, None)
        .await
        .unwrap()
}

/// (name, class_order) of live entries
async fn orders(store: &QueueStore, class_id: i64) -> Vec<(String, u32)> {
    store
        .list_class(STORE, class_id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.name.unwrap_or_else(|| "<seat>".to_string()), e.class_order))
        .collect()
}

fn assert_dense(entries: &[WaitingEntry]) {
    let mut actual: Vec<u32> = entries.iter().map(|e| e.class_order).collect();
    actual.sort_unstable();
    let expected: Vec<u32> = (1..=entries.len() as u32).collect();
    assert_eq!(actual, expected, "class_order must be dense 1..N");
}
