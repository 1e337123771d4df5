//! 领域模型定义
//!
//! 定义通讯调度系统的核心领域类型：投递渠道、触发类型、批次状态、
//! 捐赠人与募捐项目。渠道与触发类型在请求边界以封闭枚举解析，
//! 未识别的取值立即报错，不会以字符串形态进入核心流程。

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommsError;

// ---------------------------------------------------------------------------
// Channel — 投递渠道
// ---------------------------------------------------------------------------

/// 投递渠道枚举
///
/// EMAIL 要求请求携带非空 subject；SMS 与 CHAT 只使用正文。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
    Chat,
}

impl Channel {
    /// 该渠道是否要求邮件主题
    pub fn requires_subject(&self) -> bool {
        matches!(self, Self::Email)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 与 serde 的 SCREAMING_SNAKE_CASE 保持一致，
        // 便于在日志、历史记录和 API 响应中统一引用
        let s = match self {
            Self::Email => "EMAIL",
            Self::Sms => "SMS",
            Self::Chat => "CHAT",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Channel {
    type Err = CommsError;

    /// 边界解析：大小写不敏感，未识别的渠道立即拒绝
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EMAIL" => Ok(Self::Email),
            "SMS" => Ok(Self::Sms),
            "CHAT" => Ok(Self::Chat),
            other => Err(CommsError::Validation(format!("无效的渠道: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// TriggerType — 触发类型
// ---------------------------------------------------------------------------

/// 触发类型枚举
///
/// 标识一次批量通讯由哪类业务事件引起，随历史记录持久化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    /// 管理员手动发起
    Manual,
    /// 募捐项目审批通过
    Approval,
    /// 募捐项目被驳回
    Rejection,
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Manual => "MANUAL",
            Self::Approval => "APPROVAL",
            Self::Rejection => "REJECTION",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// DeliveryStatus — 批次投递状态
// ---------------------------------------------------------------------------

/// 批次投递状态
///
/// 以批次为粒度聚合单收件人的成败：全部成功为 SENT，
/// 部分成功为 PARTIAL，全部失败为 FAILED。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Sent,
    Partial,
    Failed,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sent => "SENT",
            Self::Partial => "PARTIAL",
            Self::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Donor — 捐赠人
// ---------------------------------------------------------------------------

/// 捐赠人
///
/// 联系方式均为可选：缺少所选渠道要求的联系方式时该收件人视为
/// 不可达，计入批次失败数但不会中断整个批次。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: i64,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Donor {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// 返回指定渠道所需的联系方式
    ///
    /// EMAIL 使用邮箱，SMS/CHAT 使用手机号。返回 None 表示该收件人
    /// 在此渠道上不可达。
    pub fn contact_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Sms | Channel::Chat => self.phone.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Appeal — 募捐项目
// ---------------------------------------------------------------------------

/// 募捐项目（只读登记记录）
///
/// 项目元数据由外部登记服务维护，本系统只读取标题、描述和
/// 批准金额用于邮件内容渲染。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appeal {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// 批准金额（元）
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!("EMAIL".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!("sms".parse::<Channel>().unwrap(), Channel::Sms);
        assert_eq!(" Chat ".parse::<Channel>().unwrap(), Channel::Chat);
    }

    #[test]
    fn test_channel_parse_rejects_unknown() {
        // 未识别的渠道必须在边界立即失败，不能以字符串形态进入核心
        let err = "WHATSAPP".parse::<Channel>().unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("WHATSAPP"));
    }

    #[test]
    fn test_channel_serde_roundtrip() {
        let json = serde_json::to_string(&Channel::Email).unwrap();
        assert_eq!(json, "\"EMAIL\"");

        let parsed: Channel = serde_json::from_str("\"CHAT\"").unwrap();
        assert_eq!(parsed, Channel::Chat);
    }

    #[test]
    fn test_channel_requires_subject() {
        assert!(Channel::Email.requires_subject());
        assert!(!Channel::Sms.requires_subject());
        assert!(!Channel::Chat.requires_subject());
    }

    #[test]
    fn test_trigger_type_display() {
        assert_eq!(TriggerType::Manual.to_string(), "MANUAL");
        assert_eq!(TriggerType::Approval.to_string(), "APPROVAL");
        assert_eq!(TriggerType::Rejection.to_string(), "REJECTION");
    }

    #[test]
    fn test_delivery_status_serde() {
        let json = serde_json::to_string(&DeliveryStatus::Partial).unwrap();
        assert_eq!(json, "\"PARTIAL\"");
    }

    #[test]
    fn test_donor_contact_for() {
        let donor = Donor::new(1, "张三")
            .with_email("zhangsan@example.com")
            .with_phone("13800138000");

        assert_eq!(
            donor.contact_for(Channel::Email),
            Some("zhangsan@example.com")
        );
        assert_eq!(donor.contact_for(Channel::Sms), Some("13800138000"));
        assert_eq!(donor.contact_for(Channel::Chat), Some("13800138000"));
    }

    #[test]
    fn test_donor_missing_contact() {
        // 只有手机号的捐赠人在 EMAIL 渠道上不可达
        let donor = Donor::new(2, "李四").with_phone("13900139000");

        assert_eq!(donor.contact_for(Channel::Email), None);
        assert!(donor.contact_for(Channel::Sms).is_some());
    }
}
