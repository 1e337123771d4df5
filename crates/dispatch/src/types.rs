//! 调度类型定义
//!
//! 定义一次通讯批次涉及的请求、收件人选择器、单收件人结果、
//! 批次聚合结果以及通讯历史记录。请求对象按调用构造、不持久化；
//! 历史记录是唯一的持久产物，每个非空批次恰好一条。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use comms_shared::error::{CommsError, Result};
use comms_shared::types::{Channel, DeliveryStatus, TriggerType};

// ---------------------------------------------------------------------------
// RecipientSelector — 收件人选择器
// ---------------------------------------------------------------------------

/// 收件人选择器
///
/// 两种互斥的圈选方式：项目关联的全部捐赠人，或显式指定的 ID 列表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientSelector {
    /// 募捐项目关联的全部捐赠人
    AllDonors,
    /// 显式指定的捐赠人 ID 列表
    Selected(Vec<i64>),
}

// ---------------------------------------------------------------------------
// DispatchRequest — 调度请求
// ---------------------------------------------------------------------------

/// 调度请求
///
/// 描述一次批量通讯的全部输入，按调用构造，从不持久化。
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub appeal_id: i64,
    pub channel: Channel,
    /// 邮件主题，EMAIL 渠道必填
    pub subject: Option<String>,
    pub body: String,
    pub selector: RecipientSelector,
    pub trigger: TriggerType,
    /// 发起人标识，随历史记录保存
    pub initiated_by: Option<String>,
}

impl DispatchRequest {
    pub fn new(
        appeal_id: i64,
        channel: Channel,
        body: impl Into<String>,
        selector: RecipientSelector,
        trigger: TriggerType,
    ) -> Self {
        Self {
            appeal_id,
            channel,
            subject: None,
            body: body.into(),
            selector,
            trigger,
            initiated_by: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_initiator(mut self, initiated_by: impl Into<String>) -> Self {
        self.initiated_by = Some(initiated_by.into());
        self
    }

    /// 校验请求形状
    ///
    /// 校验失败属于结构性错误：不发送任何通知，也不写历史。
    pub fn validate(&self) -> Result<()> {
        if self.body.trim().is_empty() {
            return Err(CommsError::Validation("消息内容不能为空".to_string()));
        }

        if self.channel.requires_subject()
            && self.subject.as_deref().is_none_or(|s| s.trim().is_empty())
        {
            return Err(CommsError::Validation(
                "EMAIL 渠道必须提供非空的邮件主题".to_string(),
            ));
        }

        if let RecipientSelector::Selected(ids) = &self.selector {
            if ids.is_empty() {
                return Err(CommsError::Validation(
                    "指定收件人时 ID 列表不能为空".to_string(),
                ));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DispatchOutcome — 单收件人结果
// ---------------------------------------------------------------------------

/// 单收件人发送状态
///
/// Unreachable 与 Failed 都计入批次失败数，区别在于前者是数据问题
/// （缺少联系方式），后者是传输失败，只有后者值得未来重试。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    /// 发送成功
    Delivered,
    /// 收件人缺少该渠道要求的联系方式
    Unreachable,
    /// 传输层失败
    Failed,
}

/// 单收件人发送结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub donor_id: i64,
    pub status: OutcomeStatus,
    /// 失败原因（成功时为 None）
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn delivered(donor_id: i64) -> Self {
        Self {
            donor_id,
            status: OutcomeStatus::Delivered,
            error: None,
        }
    }

    pub fn unreachable(donor_id: i64, reason: impl Into<String>) -> Self {
        Self {
            donor_id,
            status: OutcomeStatus::Unreachable,
            error: Some(reason.into()),
        }
    }

    pub fn failed(donor_id: i64, reason: impl Into<String>) -> Self {
        Self {
            donor_id,
            status: OutcomeStatus::Failed,
            error: Some(reason.into()),
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.status == OutcomeStatus::Delivered
    }
}

// ---------------------------------------------------------------------------
// DispatchResult — 批次聚合结果
// ---------------------------------------------------------------------------

/// 批次聚合结果
///
/// 不变量：`delivered + failed == requested`。解析阶段被丢弃的
/// 无效 ID 不计入 requested。outcomes 保持 resolver 产出的顺序。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub requested: usize,
    pub delivered: usize,
    pub failed: usize,
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchResult {
    /// 从单收件人结果序列聚合
    pub fn from_outcomes(outcomes: Vec<DispatchOutcome>) -> Self {
        let delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
        Self {
            requested: outcomes.len(),
            delivered,
            failed: outcomes.len() - delivered,
            outcomes,
        }
    }

    /// 空批次结果（收件人集合为空时的零效果返回）
    pub fn empty() -> Self {
        Self {
            requested: 0,
            delivered: 0,
            failed: 0,
            outcomes: Vec::new(),
        }
    }

    /// 本次调度是否未触达任何收件人
    pub fn is_noop(&self) -> bool {
        self.requested == 0
    }

    /// 推导批次状态
    ///
    /// 空批次没有状态（也不会写历史），返回 None。
    pub fn status(&self) -> Option<DeliveryStatus> {
        if self.requested == 0 {
            return None;
        }
        Some(if self.failed == 0 {
            DeliveryStatus::Sent
        } else if self.delivered == 0 {
            DeliveryStatus::Failed
        } else {
            DeliveryStatus::Partial
        })
    }

    /// 汇总去重后的失败原因，用于历史记录
    pub fn error_summary(&self) -> Option<String> {
        let mut seen = Vec::new();
        for outcome in &self.outcomes {
            if let Some(err) = &outcome.error {
                if !seen.iter().any(|s| s == err) {
                    seen.push(err.clone());
                }
            }
        }
        if seen.is_empty() {
            None
        } else {
            Some(seen.join("; "))
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryRecord — 通讯历史记录
// ---------------------------------------------------------------------------

/// 通讯历史记录
///
/// 以批次为粒度：一次调度引擎调用恰好产生一条记录，单收件人的
/// 成败聚合为计数与状态。写入后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// 记录唯一标识（UUID v7，时间有序便于排序展示）
    pub id: String,
    pub appeal_id: i64,
    pub trigger: TriggerType,
    pub channel: Channel,
    pub recipient_count: usize,
    pub delivered_count: usize,
    pub status: DeliveryStatus,
    /// 发送的消息正文
    pub content: String,
    pub initiated_by: Option<String>,
    pub error_summary: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// 由请求与批次结果构建历史记录
    ///
    /// 调用方需保证批次非空（status() 为 Some）。
    pub fn from_dispatch(request: &DispatchRequest, result: &DispatchResult) -> Option<Self> {
        let status = result.status()?;
        Some(Self {
            id: Uuid::now_v7().to_string(),
            appeal_id: request.appeal_id,
            trigger: request.trigger,
            channel: request.channel,
            recipient_count: result.requested,
            delivered_count: result.delivered,
            status,
            content: request.body.clone(),
            initiated_by: request.initiated_by.clone(),
            error_summary: result.error_summary(),
            sent_at: Utc::now(),
        })
    }
}
