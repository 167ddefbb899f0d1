//! Waitlist Server - 多门店候位队列服务
//!
//! # 架构概述
//!
//! - **队列** (`queue`): 按 (门店, 班级) 加锁的候位队列，所有变更的唯一入口
//! - **时段解析** (`scheduler`): 根据当地时间、星期与节假日选择登记班级
//! - **广播** (`message`): 按门店扇出队列事件，SSE 推送给大屏/前台/店长端
//! - **归档** (`archiving`): 营业日汇总写入 redb
//! - **HTTP API** (`api`): RESTful API 与推送流
//!
//! # 模块结构
//!
//! ```text
//! waitlist-server/src/
//! ├── core/          # 配置、状态、后台任务、错误
//! ├── queue/         # 候位队列存储
//! ├── scheduler.rs   # 班级时段解析
//! ├── message/       # 广播中心、心跳
//! ├── archiving/     # 营业日归档 (redb)
//! ├── services/      # 路由组装、中间件
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误映射、日志、时区、校验
//! ```

pub mod api;
pub mod archiving;
pub mod core;
pub mod message;
pub mod queue;
pub mod scheduler;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use message::BroadcastHub;
pub use queue::{EventPublisher, QueueError, QueueStore};
pub use services::build_router;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 `.env`、准备工作目录并初始化日志
pub fn setup_environment() -> std::io::Result<Config> {
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    init_logger_with_file(Some(config.log_level.as_str()), config.log_dir.as_deref());
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
 _       __      _ __  ___      __
| |     / /___ _(_) /_/ (_)____/ /_
| | /| / / __ `/ / __/ / / ___/ __/
| |/ |/ / /_/ / / /_/ / (__  ) /_
|__/|__/\__,_/_/\__/_/_/____/\__/
    "#
    );
}
