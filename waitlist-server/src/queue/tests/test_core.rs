use super::*;
use shared::models::{MemberPatch, WaitingStatus};

#[tokio::test]
async fn test_register_assigns_order_and_number() {
    let (store, publisher) = create_open_store().await;

    let a = register(&store, CLASS_2, "A").await;
    let b = register(&store, CLASS_2, "B").await;
    let c = register(&store, CLASS_3, "C").await;

    assert_eq!((a.class_order, a.waiting_number), (1, 1));
    assert_eq!((b.class_order, b.waiting_number), (2, 2));
    // waiting_number is store-wide, class_order per class
    assert_eq!((c.class_order, c.waiting_number), (1, 3));
    assert_eq!(a.status, WaitingStatus::Waiting);

    assert_eq!(publisher.kinds(), vec![EventKind::NewUser; 3]);
    let last = publisher.last().unwrap();
    assert_eq!(last.store_id(), STORE);
    assert_eq!(last.class_id(), Some(CLASS_3));
    assert_eq!(last.entry_id(), Some(c.id));
    assert_eq!(last.extra_i64("waiting_number"), Some(3));
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let (store, publisher) = create_open_store().await;

    let err = store
        .register(STORE, CLASS_1, customer("A"), 0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::Validation(_)));

    let err = store
        .register(STORE, 999, customer("A"), 1, None)
        .await
        .unwrap_err();
    assert_eq!(err, QueueError::ClassNotFound(999));

    let err = store
        .register(42, CLASS_1, customer("A"), 1, None)
        .await
        .unwrap_err();
    assert_eq!(err, QueueError::StoreNotFound(42));

    assert!(publisher.kinds().is_empty());
}

#[tokio::test]
async fn test_register_requires_open_business_day() {
    let (store, _) = create_test_store();
    let err = store
        .register(STORE, CLASS_1, customer("A"), 1, None)
        .await
        .unwrap_err();
    assert_eq!(err, QueueError::BusinessNotOpen(STORE));
}

#[tokio::test]
async fn test_call_is_idempotent() {
    let (store, publisher) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;

    let called = store.call(STORE, a.id).await.unwrap();
    assert_eq!(called.status, WaitingStatus::Called);
    assert_eq!(called.call_count, 1);
    assert!(called.called_at.is_some());

    let again = store.call(STORE, a.id).await.unwrap();
    assert_eq!(again.status, WaitingStatus::Called);
    assert_eq!(again.call_count, 2);
    assert_eq!(again.class_order, 1);

    let kinds = publisher.kinds();
    assert_eq!(&kinds[1..], &[EventKind::UserCalled, EventKind::UserCalled]);
}

#[tokio::test]
async fn test_call_settled_entry_fails() {
    let (store, _) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;
    store
        .set_status(STORE, a.id, WaitingStatus::Attended)
        .await
        .unwrap();

    let err = store.call(STORE, a.id).await.unwrap_err();
    assert_eq!(
        err,
        QueueError::InvalidStatus {
            entry_id: a.id,
            status: WaitingStatus::Attended
        }
    );
    assert_eq!(
        store.call(STORE, 12345).await.unwrap_err(),
        QueueError::EntryNotFound(12345)
    );
}

#[tokio::test]
async fn test_cancel_compacts_remaining() {
    let (store, publisher) = create_open_store().await;
    register(&store, CLASS_2, "A").await;
    let b = register(&store, CLASS_2, "B").await;
    register(&store, CLASS_2, "C").await;
    register(&store, CLASS_2, "D").await;

    let cancelled = store
        .set_status(STORE, b.id, WaitingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, WaitingStatus::Cancelled);
    assert!(cancelled.settled_at.is_some());

    assert_eq!(
        orders(&store, CLASS_2).await,
        vec![("A".into(), 1), ("C".into(), 2), ("D".into(), 3)]
    );

    let event = publisher.last().unwrap();
    assert_eq!(event.event, EventKind::StatusChanged);
    assert_eq!(event.entry_id(), Some(b.id));
    assert_eq!(event.data.extra["status"], "cancelled");

    // settled entries stay readable
    let fetched = store.get_entry(STORE, b.id).await.unwrap();
    assert_eq!(fetched.status, WaitingStatus::Cancelled);
}

#[tokio::test]
async fn test_set_status_rejects_live_target() {
    let (store, _) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;
    let err = store
        .set_status(STORE, a.id, WaitingStatus::Called)
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::Validation(_)));
}

#[tokio::test]
async fn test_swap_is_its_own_inverse() {
    let (store, publisher) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;
    register(&store, CLASS_2, "B").await;
    let c = register(&store, CLASS_2, "C").await;

    let live = store.swap_order(STORE, a.id, c.id).await.unwrap();
    assert_eq!(live[0].id, c.id);
    assert_eq!(
        orders(&store, CLASS_2).await,
        vec![("C".into(), 1), ("B".into(), 2), ("A".into(), 3)]
    );

    store.swap_order(STORE, a.id, c.id).await.unwrap();
    assert_eq!(
        orders(&store, CLASS_2).await,
        vec![("A".into(), 1), ("B".into(), 2), ("C".into(), 3)]
    );

    let event = publisher.last().unwrap();
    assert_eq!(event.event, EventKind::OrderChanged);
    assert_eq!(event.class_id(), Some(CLASS_2));
}

#[tokio::test]
async fn test_swap_across_classes_fails() {
    let (store, publisher) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;
    let b = register(&store, CLASS_3, "B").await;
    publisher.clear();

    let err = store.swap_order(STORE, a.id, b.id).await.unwrap_err();
    assert_eq!(
        err,
        QueueError::CrossClassSwap {
            entry_a: a.id,
            entry_b: b.id
        }
    );
    assert!(publisher.kinds().is_empty());
    assert_eq!(orders(&store, CLASS_2).await, vec![("A".into(), 1)]);
}

#[tokio::test]
async fn test_swap_with_settled_entry_fails() {
    let (store, _) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;
    let b = register(&store, CLASS_2, "B").await;
    store
        .set_status(STORE, b.id, WaitingStatus::Attended)
        .await
        .unwrap();

    let err = store.swap_order(STORE, a.id, b.id).await.unwrap_err();
    assert!(matches!(err, QueueError::InvalidStatus { .. }));
}

#[tokio::test]
async fn test_move_appends_to_target_tail() {
    let (store, publisher) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;
    register(&store, CLASS_2, "B").await;
    register(&store, CLASS_3, "X").await;

    let moved = store.move_to_class(STORE, a.id, CLASS_3).await.unwrap();
    assert_eq!(moved.class_id, CLASS_3);
    assert_eq!(moved.class_order, 2);
    assert_eq!(moved.waiting_number, a.waiting_number);

    assert_eq!(orders(&store, CLASS_2).await, vec![("B".into(), 1)]);
    assert_eq!(
        orders(&store, CLASS_3).await,
        vec![("X".into(), 1), ("A".into(), 2)]
    );

    let event = publisher.last().unwrap();
    assert_eq!(event.event, EventKind::ClassMoved);
    assert_eq!(event.class_id(), Some(CLASS_3));
    assert_eq!(event.extra_i64("from_class_id"), Some(CLASS_2));

    // entry operations follow the entry to its new class
    let called = store.call(STORE, a.id).await.unwrap();
    assert_eq!(called.class_id, CLASS_3);
}

#[tokio::test]
async fn test_move_into_full_class_leaves_source_unchanged() {
    let (store, _) = create_open_store().await;
    register(&store, CLASS_1, "F1").await;
    register(&store, CLASS_1, "F2").await;
    register(&store, CLASS_2, "A").await;
    let b = register(&store, CLASS_2, "B").await;

    let err = store.move_to_class(STORE, b.id, CLASS_1).await.unwrap_err();
    assert_eq!(
        err,
        QueueError::ClassFull {
            class_id: CLASS_1,
            capacity: 2
        }
    );
    assert_eq!(
        orders(&store, CLASS_2).await,
        vec![("A".into(), 1), ("B".into(), 2)]
    );
    assert_eq!(store.get_entry(STORE, b.id).await.unwrap().class_id, CLASS_2);
}

#[tokio::test]
async fn test_insert_empty_seat_shifts_entries() {
    let (store, publisher) = create_open_store().await;
    register(&store, CLASS_2, "A").await;
    register(&store, CLASS_2, "B").await;

    let seat = store.insert_empty_seat(STORE, CLASS_2, 1).await.unwrap();
    assert!(seat.is_empty_seat);
    assert_eq!(seat.class_order, 1);
    assert_eq!(seat.waiting_number, 0);

    assert_eq!(
        orders(&store, CLASS_2).await,
        vec![("<seat>".into(), 1), ("A".into(), 2), ("B".into(), 3)]
    );
    assert_eq!(publisher.last().unwrap().event, EventKind::EmptySeatInserted);

    // next registrant still gets the next ticket number
    let c = register(&store, CLASS_2, "C").await;
    assert_eq!((c.waiting_number, c.class_order), (3, 4));

    // empty seats cannot be called but can be removed
    assert!(matches!(
        store.call(STORE, seat.id).await.unwrap_err(),
        QueueError::InvalidStatus { .. }
    ));
    store
        .set_status(STORE, seat.id, WaitingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(
        orders(&store, CLASS_2).await,
        vec![("A".into(), 1), ("B".into(), 2), ("C".into(), 3)]
    );
}

#[tokio::test]
async fn test_insert_empty_seat_position_validation() {
    let (store, _) = create_open_store().await;
    register(&store, CLASS_2, "A").await;

    assert!(matches!(
        store.insert_empty_seat(STORE, CLASS_2, 0).await.unwrap_err(),
        QueueError::Validation(_)
    ));
    let seat = store.insert_empty_seat(STORE, CLASS_2, 10).await.unwrap();
    assert_eq!(seat.class_order, 2);
}

#[tokio::test]
async fn test_rename_and_update_member() {
    let (store, publisher) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;

    let renamed = store
        .rename_entry(STORE, a.id, "Alice".to_string())
        .await
        .unwrap();
    assert_eq!(renamed.name.as_deref(), Some("Alice"));
    assert_eq!(publisher.last().unwrap().event, EventKind::NameUpdated);

    let updated = store
        .update_member(
            STORE,
            a.id,
            MemberPatch {
                phone: Some("010-0000-0000".into()),
                party_size: Some(4),
                party_breakdown: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.party_size, 4);
    assert_eq!(updated.phone.as_deref(), Some("010-0000-0000"));
    assert_eq!(updated.name.as_deref(), Some("Alice"));
    assert_eq!(publisher.last().unwrap().event, EventKind::MemberUpdated);

    assert!(matches!(
        store
            .update_member(STORE, a.id, MemberPatch::default())
            .await
            .unwrap_err(),
        QueueError::Validation(_)
    ));
}

#[tokio::test]
async fn test_rename_and_update_member_reject_seats_and_settled() {
    let (store, publisher) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;
    let seat = store.insert_empty_seat(STORE, CLASS_2, 1).await.unwrap();
    store
        .set_status(STORE, a.id, WaitingStatus::Cancelled)
        .await
        .unwrap();
    publisher.clear();

    let patch = MemberPatch {
        phone: None,
        party_size: Some(3),
        party_breakdown: None,
    };
    for entry_id in [seat.id, a.id] {
        assert!(matches!(
            store
                .rename_entry(STORE, entry_id, "X".to_string())
                .await
                .unwrap_err(),
            QueueError::InvalidStatus { .. }
        ));
        assert!(matches!(
            store
                .update_member(STORE, entry_id, patch.clone())
                .await
                .unwrap_err(),
            QueueError::InvalidStatus { .. }
        ));
    }

    // 已结算条目保持原样，且没有发布任何事件
    let settled = store.get_entry(STORE, a.id).await.unwrap();
    assert_eq!(settled.name.as_deref(), Some("A"));
    assert_eq!(settled.party_size, 2);
    assert!(publisher.kinds().is_empty());
}
