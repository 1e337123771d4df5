//! 外部协作方接口定义
//!
//! 捐赠人目录、项目登记、通讯历史存储与邮件传输都是本系统的外部
//! 协作方，在此定义为接口，便于服务层依赖抽象而非具体实现，
//! 支持 mock 测试。

use async_trait::async_trait;

use comms_shared::error::Result;
use comms_shared::types::{Appeal, Donor};

use crate::types::HistoryRecord;

/// 捐赠人目录接口
///
/// 捐赠人的增删改由外部目录服务负责，本系统只做查询。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonorDirectory: Send + Sync {
    /// 按 ID 批量查询捐赠人，未找到的 ID 直接缺席于结果
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Donor>>;

    /// 查询与募捐项目关联的全部捐赠人
    async fn find_by_appeal(&self, appeal_id: i64) -> Result<Vec<Donor>>;
}

/// 募捐项目登记接口（只读）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppealRegistry: Send + Sync {
    async fn get(&self, appeal_id: i64) -> Result<Option<Appeal>>;
}

/// 通讯历史存储接口
///
/// 追加写入，记录一经写入不可变更。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: HistoryRecord) -> Result<()>;

    async fn list_all(&self) -> Result<Vec<HistoryRecord>>;

    async fn list_by_appeal(&self, appeal_id: i64) -> Result<Vec<HistoryRecord>>;
}

/// 邮件传输接口
///
/// 实际的 SMTP/邮件服务商对接由实现方负责；发送成功返回外部
/// 消息标识，用于追踪投递状态。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String>;
}
