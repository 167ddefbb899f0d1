//! 推送流消息类型定义
//!
//! 服务端每次成功提交一次队列变更，都会向该门店的所有订阅者推送一条
//! [`QueueEvent`]。线上格式为单个 JSON 对象：
//!
//! ```json
//! {"event": "new_user", "data": {"store_id": 1, "class_id": 2, "entry_id": 3, "waiting_number": 7}}
//! ```
//!
//! 所有类型分发都基于 `event` 字段，传输层只使用通用的 message 帧。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// 订阅成功 (仅发给新订阅者)
    Connected,
    /// 心跳
    Ping,
    NewUser,
    UserCalled,
    StatusChanged,
    OrderChanged,
    ClassMoved,
    EmptySeatInserted,
    ClassClosed,
    ClassReopened,
    MemberUpdated,
    BatchAttendance,
    NameUpdated,
    BusinessOpened,
    BusinessClosed,
}

impl EventKind {
    pub const ALL: [EventKind; 15] = [
        EventKind::Connected,
        EventKind::Ping,
        EventKind::NewUser,
        EventKind::UserCalled,
        EventKind::StatusChanged,
        EventKind::OrderChanged,
        EventKind::ClassMoved,
        EventKind::EmptySeatInserted,
        EventKind::ClassClosed,
        EventKind::ClassReopened,
        EventKind::MemberUpdated,
        EventKind::BatchAttendance,
        EventKind::NameUpdated,
        EventKind::BusinessOpened,
        EventKind::BusinessClosed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Ping => "ping",
            EventKind::NewUser => "new_user",
            EventKind::UserCalled => "user_called",
            EventKind::StatusChanged => "status_changed",
            EventKind::OrderChanged => "order_changed",
            EventKind::ClassMoved => "class_moved",
            EventKind::EmptySeatInserted => "empty_seat_inserted",
            EventKind::ClassClosed => "class_closed",
            EventKind::ClassReopened => "class_reopened",
            EventKind::MemberUpdated => "member_updated",
            EventKind::BatchAttendance => "batch_attendance",
            EventKind::NameUpdated => "name_updated",
            EventKind::BusinessOpened => "business_opened",
            EventKind::BusinessClosed => "business_closed",
        }
    }

    /// 连接控制类事件 (不携带业务数据)
    pub fn is_control(&self) -> bool {
        matches!(self, EventKind::Connected | EventKind::Ping)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 订阅者角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberRole {
    /// 公共大屏
    #[default]
    Board,
    /// 前台
    Reception,
    /// 店长移动端
    Manage,
}

impl SubscriberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberRole::Board => "board",
            SubscriberRole::Reception => "reception",
            SubscriberRole::Manage => "manage",
        }
    }
}

impl fmt::Display for SubscriberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "board" => Ok(SubscriberRole::Board),
            "reception" => Ok(SubscriberRole::Reception),
            "manage" => Ok(SubscriberRole::Manage),
            other => Err(format!("unknown subscriber role: {}", other)),
        }
    }
}

/// 事件负载：门店 ID 必填，班级/条目 ID 视事件而定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub store_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<i64>,
    /// 其余字段 (waiting_number, from_class_id, attended_count ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 推送流中的一条消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEvent {
    pub event: EventKind,
    pub data: EventData,
}

impl QueueEvent {
    pub fn new(event: EventKind, store_id: i64) -> Self {
        Self {
            event,
            data: EventData {
                store_id,
                class_id: None,
                entry_id: None,
                extra: Map::new(),
            },
        }
    }

    pub fn class(mut self, class_id: i64) -> Self {
        self.data.class_id = Some(class_id);
        self
    }

    pub fn entry(mut self, entry_id: i64) -> Self {
        self.data.entry_id = Some(entry_id);
        self
    }

    /// 附加字段
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn ping(store_id: i64) -> Self {
        Self::new(EventKind::Ping, store_id)
    }

    pub fn connected(store_id: i64, subscriber_id: &str, role: SubscriberRole) -> Self {
        Self::new(EventKind::Connected, store_id)
            .with("subscriber_id", subscriber_id)
            .with("role", role.as_str())
    }

    pub fn store_id(&self) -> i64 {
        self.data.store_id
    }

    pub fn class_id(&self) -> Option<i64> {
        self.data.class_id
    }

    pub fn entry_id(&self) -> Option<i64> {
        self.data.entry_id
    }

    /// 读取附加字段中的整数
    pub fn extra_i64(&self, key: &str) -> Option<i64> {
        self.data.extra.get(key).and_then(Value::as_i64)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
