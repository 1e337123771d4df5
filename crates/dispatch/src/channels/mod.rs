//! 渠道适配器
//!
//! 定义渠道适配器 trait 并提供各渠道的具体实现。
//!
//! ## 支持的渠道
//!
//! - **Email**: 邮件通知，经注入的邮件传输发送 HTML 内容
//! - **SMS**: 短信通知（当前为模拟实现）
//! - **Chat**: 即时消息通知（当前为模拟实现）

mod chat;
mod email;
mod sms;

pub use chat::ChatAdapter;
pub use email::{EmailAdapter, LogMailTransport};
pub use sms::SmsAdapter;

use async_trait::async_trait;

use comms_shared::error::Result;
use comms_shared::types::{Appeal, Channel, Donor};

/// 一次批次内发送给所有收件人的消息内容
///
/// 在批次开始时渲染一次，所有收件人共享；项目上下文可选，
/// 缺失时邮件按无项目详情块渲染。
#[derive(Debug, Clone)]
pub struct MessageContent {
    /// 邮件主题（EMAIL 渠道必填，其他渠道忽略）
    pub subject: Option<String>,
    pub body: String,
    /// 项目上下文，用于邮件内容渲染
    pub appeal: Option<Appeal>,
}

/// 单次发送回执
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// 外部渠道返回的消息标识，用于追踪投递状态
    pub external_message_id: Option<String>,
}

/// 渠道适配器 trait
///
/// 所有投递渠道都实现此 trait，提供统一的发送接口。
/// 适配器应当是无状态的，便于并发调用。发送失败通过 Err 返回：
/// 缺少联系方式用 `UnreachableRecipient`，传输失败用 `Delivery`，
/// 两者都由调度引擎折算进批次结果，不会中断批次。
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// 渠道类型标识
    fn channel(&self) -> Channel;

    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 向单个收件人发送消息
    async fn send(&self, donor: &Donor, content: &MessageContent) -> Result<SendReceipt>;
}
