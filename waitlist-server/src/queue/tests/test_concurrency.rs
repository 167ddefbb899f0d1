use super::*;
use shared::models::WaitingStatus;
use std::collections::HashSet;

fn wide_settings() -> StoreSettings {
    let mut settings = test_settings(STORE, false);
    for class in &mut settings.classes {
        class.max_capacity = 500;
    }
    settings
}

async fn create_wide_store() -> QueueStore {
    let store = QueueStore::new(Arc::new(RecordingPublisher::default()));
    store.configure_store(wide_settings());
    store.open_business_day(STORE, business_date()).await.unwrap();
    store
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_stay_dense_and_unique() {
    let store = create_wide_store().await;

    let mut handles = Vec::new();
    for i in 0..150 {
        let store = store.clone();
        let class_id = [CLASS_1, CLASS_2, CLASS_3][i % 3];
        handles.push(tokio::spawn(async move {
            store
                .register(STORE, class_id, customer(&format!("C{}", i)), 1, None)
                .await
                .unwrap()
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let entry = handle.await.unwrap();
        assert!(numbers.insert(entry.waiting_number), "waiting_number reused");
    }
    assert_eq!(numbers, (1..=150).collect::<HashSet<u64>>());

    for class_id in [CLASS_1, CLASS_2, CLASS_3] {
        let live = store.list_class(STORE, class_id).await.unwrap();
        assert_eq!(live.len(), 50);
        assert_dense(&live);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capacity_holds_under_contention() {
    let (store, _) = create_open_store().await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .register(STORE, CLASS_1, customer(&format!("C{}", i)), 1, None)
                .await
        }));
    }

    let mut accepted = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(QueueError::ClassFull { .. }) => full += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(accepted, 2);
    assert_eq!(full, 18);
    assert_dense(&store.list_class(STORE, CLASS_1).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_mutations_keep_orders_dense() {
    let store = create_wide_store().await;
    let mut entries = Vec::new();
    for i in 0..60 {
        let class_id = if i % 2 == 0 { CLASS_2 } else { CLASS_3 };
        entries.push(register(&store, class_id, &format!("C{}", i)).await);
    }

    let mut handles = Vec::new();
    for (i, entry) in entries.into_iter().enumerate() {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            match i % 4 {
                0 => {
                    let _ = store
                        .set_status(STORE, entry.id, WaitingStatus::Cancelled)
                        .await;
                }
                1 => {
                    let target = if entry.class_id == CLASS_2 { CLASS_3 } else { CLASS_2 };
                    let _ = store.move_to_class(STORE, entry.id, target).await;
                }
                2 => {
                    let _ = store.call(STORE, entry.id).await;
                }
                _ => {
                    let _ = store.register(STORE, CLASS_1, customer("late"), 1, None).await;
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut live_total = 0;
    for class_id in [CLASS_1, CLASS_2, CLASS_3] {
        let live = store.list_class(STORE, class_id).await.unwrap();
        assert_dense(&live);
        assert!(live.iter().all(|e| e.class_id == class_id));
        live_total += live.len();
    }
    // 60 registered, 15 cancelled, 15 late registrations
    assert_eq!(live_total, 60);
}

#[tokio::test]
async fn test_stores_are_isolated() {
    let publisher = Arc::new(RecordingPublisher::default());
    let store = QueueStore::new(publisher.clone());
    store.configure_store(test_settings(STORE, false));
    store.configure_store(test_settings(OTHER_STORE, false));
    store.open_business_day(STORE, business_date()).await.unwrap();
    store
        .open_business_day(OTHER_STORE, business_date())
        .await
        .unwrap();

    let a = register(&store, CLASS_2, "A").await;
    let b = store
        .register(OTHER_STORE, CLASS_2, customer("B"), 1, None)
        .await
        .unwrap();
    assert_eq!(a.waiting_number, 1);
    assert_eq!(b.waiting_number, 1);
    assert_ne!(a.id, b.id);

    // entry ids are scoped to their store
    assert_eq!(
        store.get_entry(OTHER_STORE, a.id).await.unwrap_err(),
        QueueError::EntryNotFound(a.id)
    );
    assert_eq!(store.store_ids(), vec![STORE, OTHER_STORE]);
}
