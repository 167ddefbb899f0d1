//! 推送流客户端集成测试：在随机端口上启动真实的服务端路由

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use shared::models::{
    ClassSession, CustomerRef, DayType, RegisterRequest, StoreSettings, WaitingStatus,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use waitlist_client::{
    BoardMirror, ClientError, ConnectionState, QueueHttpClient, QueueStreamClient,
    StreamClientConfig,
};
use waitlist_server::{Config, ServerState, build_router};

const STORE: i64 = 1;
const WAIT: Duration = Duration::from_secs(5);

struct TestServer {
    base_url: String,
    state: ServerState,
}

async fn start_server() -> TestServer {
    let state = ServerState::in_memory(Config::with_overrides("/tmp/waitlist-client-test", 0)).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

fn settings() -> StoreSettings {
    let class = |id: i64, number: u32, day_type: DayType| ClassSession {
        id,
        name: format!("{}교시", number),
        class_number: number,
        start_time: NaiveTime::from_hms_opt(9 + number, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10 + number, 0, 0).unwrap(),
        max_capacity: 10,
        weekdays: None,
        day_type,
    };
    StoreSettings {
        store_id: STORE,
        name: "Gangnam".into(),
        timezone: "Asia/Seoul".into(),
        sequential_closing: false,
        holidays: vec![],
        classes: vec![class(11, 1, DayType::Weekday), class(12, 2, DayType::Weekday)],
    }
}

async fn prepare_store(http: &QueueHttpClient) {
    http.put_settings(&settings()).await.unwrap();
    // 2026-10-19 是周一
    http.open_business_day(STORE, NaiveDate::from_ymd_opt(2026, 10, 19))
        .await
        .unwrap();
}

fn register_request(class_id: i64, name: &str) -> RegisterRequest {
    RegisterRequest {
        class_id: Some(class_id),
        customer: CustomerRef {
            name: Some(name.to_string()),
            phone: None,
            revisit_count: 0,
        },
        party_size: 1,
        party_breakdown: None,
    }
}

fn fast_config(base_url: &str) -> StreamClientConfig {
    StreamClientConfig::lan(base_url, STORE)
        .with_backoff(Duration::from_millis(20), Duration::from_millis(100))
        .with_max_attempts(5)
        .with_refetch_debounce(Duration::from_millis(50))
        .with_request_timeout(Duration::from_secs(2))
}

/// 等待镜像中某个班级的条目名称满足条件
async fn wait_for_names(mirror: &BoardMirror, class_id: i64, expected: &[&str]) {
    let mut rx = mirror.subscribe();
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    tokio::time::timeout(
        WAIT,
        rx.wait_for(|snapshot| {
            snapshot
                .as_ref()
                .and_then(|b| b.classes.iter().find(|c| c.class_id == class_id))
                .map(|c| {
                    c.entries
                        .iter()
                        .map(|e| e.name.clone().unwrap_or_default())
                        .collect::<Vec<_>>()
                })
                == Some(expected.clone())
        }),
    )
    .await
    .expect("mirror did not converge")
    .unwrap();
}

#[tokio::test]
async fn test_mirror_follows_queue_mutations() {
    let server = start_server().await;
    let http = QueueHttpClient::new(&server.base_url, Duration::from_secs(2)).unwrap();
    prepare_store(&http).await;
    http.register(STORE, &register_request(11, "A")).await.unwrap();

    let mirror = Arc::new(BoardMirror::new(http.clone()));
    let client = QueueStreamClient::new(fast_config(&server.base_url), mirror.clone()).unwrap();
    let mut state = client.state();
    let shutdown = CancellationToken::new();
    let task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { client.run(shutdown).await }
    });

    tokio::time::timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Connected))
        .await
        .unwrap()
        .unwrap();
    // 连接后的全量拉取包含已有条目
    wait_for_names(&mirror, 11, &["A"]).await;

    // 补丁事件
    let b = http.register(STORE, &register_request(11, "B")).await.unwrap();
    let c = http.register(STORE, &register_request(11, "C")).await.unwrap();
    wait_for_names(&mirror, 11, &["A", "B", "C"]).await;

    http.set_status(STORE, b.id, WaitingStatus::Cancelled).await.unwrap();
    wait_for_names(&mirror, 11, &["A", "C"]).await;

    http.call(STORE, c.id).await.unwrap();
    let mut rx = mirror.subscribe();
    tokio::time::timeout(
        WAIT,
        rx.wait_for(|s| {
            s.as_ref()
                .and_then(|b| b.classes[0].entries.iter().find(|e| e.id == c.id))
                .is_some_and(|e| e.status == WaitingStatus::Called)
        }),
    )
    .await
    .unwrap()
    .unwrap();

    shutdown.cancel();
    assert!(task.await.unwrap().is_ok());
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_reconnects_and_refetches_after_drop() {
    let server = start_server().await;
    let http = QueueHttpClient::new(&server.base_url, Duration::from_secs(2)).unwrap();
    prepare_store(&http).await;

    let mirror = Arc::new(BoardMirror::new(http.clone()));
    let client = QueueStreamClient::new(fast_config(&server.base_url), mirror.clone()).unwrap();
    let mut state = client.state();
    let shutdown = CancellationToken::new();
    let task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { client.run(shutdown).await }
    });
    tokio::time::timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Connected))
        .await
        .unwrap()
        .unwrap();
    wait_for_names(&mirror, 12, &[]).await;

    // 服务端移除订阅者：连接中断，期间的变更只能靠重连后的全量拉取
    let subscriber = server.state.hub.subscribers(STORE)[0].id;
    assert!(server.state.hub.unsubscribe(STORE, subscriber));
    http.register(STORE, &register_request(12, "Missed")).await.unwrap();

    wait_for_names(&mirror, 12, &["Missed"]).await;
    tokio::time::timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Connected))
        .await
        .unwrap()
        .unwrap();
    tokio::time::timeout(WAIT, async {
        while server.state.hub.subscriber_count(STORE) != 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    shutdown.cancel();
    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    // 绑定后立即释放，得到一个无人监听的端口
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base_url = format!("http://{}", addr);

    let http = QueueHttpClient::new(&base_url, Duration::from_secs(1)).unwrap();
    let mirror = Arc::new(BoardMirror::new(http));
    let config = fast_config(&base_url).with_max_attempts(2);
    let client = QueueStreamClient::new(config, mirror).unwrap();
    let state = client.state();

    let result = tokio::time::timeout(WAIT, client.run(CancellationToken::new()))
        .await
        .unwrap();
    assert!(matches!(result, Err(ClientError::ReconnectExhausted(2))));
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_api_errors_carry_server_codes() {
    let server = start_server().await;
    let http = QueueHttpClient::new(&server.base_url, Duration::from_secs(2)).unwrap();

    let err = http.board(99).await.unwrap_err();
    assert_eq!(err.api_code(), Some(3001));

    prepare_store(&http).await;
    let err = http
        .register(STORE, &register_request(99, "X"))
        .await
        .unwrap_err();
    assert_eq!(err.api_code(), Some(5001));
}
