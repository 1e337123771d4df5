//! 通讯调度核心
//!
//! 负责把一次通讯请求分发给募捐项目的捐赠人群体：解析收件人、
//! 选择渠道适配器、按收件人隔离失败、聚合批次结果并写入可查询的
//! 通讯历史。单个收件人的发送失败不会中断批次，结构性错误
//! （请求不合法、项目不存在）才会向调用方传播。

pub mod audit;
pub mod channels;
pub mod engine;
pub mod memory;
pub mod ports;
pub mod resolver;
pub mod templates;
pub mod triggers;
pub mod types;

pub use audit::AuditRecorder;
pub use engine::DispatchEngine;
pub use resolver::RecipientResolver;
pub use triggers::{ManualSendRequest, TriggerFacade};
pub use types::{
    DispatchOutcome, DispatchRequest, DispatchResult, HistoryRecord, OutcomeStatus,
    RecipientSelector,
};
