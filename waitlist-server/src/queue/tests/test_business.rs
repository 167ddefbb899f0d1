use super::*;
use shared::models::{SlotStatus, SlotUnavailable, WaitingStatus};

#[tokio::test]
async fn test_open_twice_fails() {
    let (store, publisher) = create_test_store();
    let day = store.open_business_day(STORE, business_date()).await.unwrap();
    assert_eq!(day.business_date, business_date());
    assert_eq!(publisher.kinds(), vec![EventKind::BusinessOpened]);

    assert_eq!(
        store
            .open_business_day(STORE, business_date())
            .await
            .unwrap_err(),
        QueueError::BusinessAlreadyOpen(STORE)
    );
}

#[tokio::test]
async fn test_close_without_open_fails() {
    let (store, _) = create_test_store();
    assert_eq!(
        store.close_business_day(STORE).await.unwrap_err(),
        QueueError::BusinessNotOpen(STORE)
    );
}

#[tokio::test]
async fn test_capacity_scenario() {
    // Class "1st" has max_capacity=2
    let (store, _) = create_open_store().await;

    let a = register(&store, CLASS_1, "A").await;
    assert_eq!((a.class_order, a.waiting_number), (1, 1));
    let b = register(&store, CLASS_1, "B").await;
    assert_eq!((b.class_order, b.waiting_number), (2, 2));

    let err = store
        .register(STORE, CLASS_1, customer("C"), 2, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        QueueError::ClassFull {
            class_id: CLASS_1,
            capacity: 2
        }
    );

    store
        .set_status(STORE, a.id, WaitingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(store.get_entry(STORE, b.id).await.unwrap().class_order, 1);

    let c = register(&store, CLASS_1, "C").await;
    assert_eq!((c.class_order, c.waiting_number), (2, 3));
}

#[tokio::test]
async fn test_close_business_day_totals_and_reset() {
    let (store, publisher) = create_open_store().await;
    register(&store, CLASS_2, "A").await;
    register(&store, CLASS_2, "B").await;
    register(&store, CLASS_3, "C").await;
    let d = register(&store, CLASS_3, "D").await;
    store.call(STORE, d.id).await.unwrap();
    // placeholders are not customers
    store.insert_empty_seat(STORE, CLASS_2, 1).await.unwrap();

    let summary = store.close_business_day(STORE).await.unwrap();
    assert_eq!(summary.totals.total_waiting, 4);
    assert_eq!(summary.totals.total_attended, 4);
    assert_eq!(summary.totals.total_cancelled, 0);
    assert_eq!(summary.business_date, business_date());
    assert!(summary.closed_at >= summary.opened_at);

    let event = publisher.last().unwrap();
    assert_eq!(event.event, EventKind::BusinessClosed);
    assert_eq!(event.extra_i64("total_attended"), Some(4));

    // every entry was force-settled
    assert_eq!(
        store.get_entry(STORE, d.id).await.unwrap().status,
        WaitingStatus::Attended
    );
    assert!(!store.business_status(STORE).await.unwrap().is_open);

    // next day starts at waiting_number 1 with empty queues
    store.open_business_day(STORE, business_date()).await.unwrap();
    let first = register(&store, CLASS_2, "Z").await;
    assert_eq!((first.waiting_number, first.class_order), (1, 1));
    assert!(store.get_entry(STORE, d.id).await.is_err());
}

#[tokio::test]
async fn test_close_business_day_counts_cancellations() {
    let (store, _) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;
    register(&store, CLASS_2, "B").await;
    store
        .set_status(STORE, a.id, WaitingStatus::Cancelled)
        .await
        .unwrap();

    let summary = store.close_business_day(STORE).await.unwrap();
    assert_eq!(summary.totals.total_waiting, 2);
    assert_eq!(summary.totals.total_attended, 1);
    assert_eq!(summary.totals.total_cancelled, 1);
}

#[tokio::test]
async fn test_closed_classes_reset_on_new_day() {
    let (store, _) = create_open_store().await;
    store.close_class(STORE, CLASS_2, false).await.unwrap();
    store.close_business_day(STORE).await.unwrap();
    store.open_business_day(STORE, business_date()).await.unwrap();

    let a = register(&store, CLASS_2, "A").await;
    assert_eq!(a.class_order, 1);
}

#[tokio::test]
async fn test_resolve_next_slot_tracks_occupancy() {
    let (store, _) = create_test_store();
    let now = business_date().and_hms_opt(10, 0, 0).unwrap();

    assert_eq!(
        store.resolve_next_slot(STORE, now).await.unwrap(),
        SlotStatus::from(SlotUnavailable::BusinessNotOpen)
    );

    store.open_business_day(STORE, business_date()).await.unwrap();
    let SlotStatus::Available(slot) = store.resolve_next_slot(STORE, now).await.unwrap() else {
        panic!("expected an available slot");
    };
    assert_eq!((slot.class_id, slot.class_order), (CLASS_1, 1));

    register(&store, CLASS_1, "A").await;
    register(&store, CLASS_1, "B").await;
    let SlotStatus::Available(slot) = store.resolve_next_slot(STORE, now).await.unwrap() else {
        panic!("expected an available slot");
    };
    assert_eq!((slot.class_id, slot.class_order), (CLASS_2, 1));

    store.close_class(STORE, CLASS_2, false).await.unwrap();
    store.close_class(STORE, CLASS_3, false).await.unwrap();
    assert_eq!(
        store.resolve_next_slot(STORE, now).await.unwrap(),
        SlotStatus::from(SlotUnavailable::AllClassesFull)
    );

    store.close_class(STORE, CLASS_1, false).await.unwrap();
    assert_eq!(
        store.resolve_next_slot(STORE, now).await.unwrap(),
        SlotStatus::from(SlotUnavailable::AllClassesClosed)
    );

    // Saturday: no weekend classes configured
    store.close_business_day(STORE).await.unwrap();
    let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    store.open_business_day(STORE, saturday).await.unwrap();
    assert_eq!(
        store
            .resolve_next_slot(STORE, saturday.and_hms_opt(10, 0, 0).unwrap())
            .await
            .unwrap(),
        SlotStatus::from(SlotUnavailable::NoClassScheduled)
    );
}

#[tokio::test]
async fn test_slot_follows_business_date_past_midnight() {
    let (store, _) = create_test_store();
    let mut settings = test_settings(STORE, false);
    let mut weekend = class(201, 1, 5);
    weekend.day_type = DayType::Weekend;
    settings.classes.push(weekend);
    store.configure_store(settings);

    // 周日开店，营业到周一 00:30
    let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    store.open_business_day(STORE, sunday).await.unwrap();
    let after_midnight = business_date().and_hms_opt(0, 30, 0).unwrap();

    let SlotStatus::Available(slot) = store
        .resolve_next_slot(STORE, after_midnight)
        .await
        .unwrap()
    else {
        panic!("expected an available slot");
    };
    assert_eq!(slot.class_id, 201);

    let board = store.board(STORE, after_midnight.date()).await.unwrap();
    let board_classes: Vec<i64> = board.classes.iter().map(|c| c.class_id).collect();
    assert_eq!(board_classes, vec![201]);
}

#[tokio::test]
async fn test_settings_replacement_keeps_entries() {
    let (store, _) = create_open_store().await;
    let a = register(&store, CLASS_2, "A").await;

    let mut settings = test_settings(STORE, false);
    settings.classes.retain(|c| c.id != CLASS_3);
    settings.classes[0].max_capacity = 3;
    assert!(!store.configure_store(settings));

    assert_eq!(store.get_entry(STORE, a.id).await.unwrap().class_order, 1);
    assert_eq!(store.settings(STORE).unwrap().classes.len(), 2);
    assert_eq!(
        store
            .register(STORE, CLASS_3, customer("B"), 1, None)
            .await
            .unwrap_err(),
        QueueError::ClassNotFound(CLASS_3)
    );
}
