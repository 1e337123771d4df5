//! SMS 短信渠道适配器
//!
//! 当前为模拟实现（仅记录日志），便于在无外部依赖的情况下验证
//! 调度管道的完整性。接入真实短信服务商时只需替换本实现，
//! 调用方无需改动。

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use comms_shared::error::{CommsError, Result};
use comms_shared::types::{Channel, Donor};

use super::{ChannelAdapter, MessageContent, SendReceipt};

/// 模拟短信渠道适配器
///
/// 要求收件人绑定手机号；接口允许未来实现返回传输失败，
/// 调用点无需变化。
pub struct SmsAdapter;

#[async_trait]
impl ChannelAdapter for SmsAdapter {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn name(&self) -> &str {
        "SMS"
    }

    async fn send(&self, donor: &Donor, content: &MessageContent) -> Result<SendReceipt> {
        let Some(phone) = donor.contact_for(Channel::Sms) else {
            warn!(donor_id = donor.id, "捐赠人未绑定手机号，跳过 SMS");
            return Err(CommsError::UnreachableRecipient {
                donor_id: donor.id,
                reason: "未绑定手机号".to_string(),
            });
        };

        let message_id = format!("sms_{}", Uuid::new_v4());

        info!(
            donor_id = donor.id,
            phone = %phone,
            message_id = %message_id,
            body = %content.body,
            "模拟发送短信通知"
        );

        Ok(SendReceipt {
            external_message_id: Some(message_id),
        })
    }
}
