//! 即时消息渠道适配器
//!
//! 当前为模拟实现（仅记录日志）。生产环境替换为即时通讯平台
//! （如企业微信、WhatsApp Business）的 API 调用。

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use comms_shared::error::{CommsError, Result};
use comms_shared::types::{Channel, Donor};

use super::{ChannelAdapter, MessageContent, SendReceipt};

/// 模拟即时消息渠道适配器
pub struct ChatAdapter;

#[async_trait]
impl ChannelAdapter for ChatAdapter {
    fn channel(&self) -> Channel {
        Channel::Chat
    }

    fn name(&self) -> &str {
        "Chat"
    }

    async fn send(&self, donor: &Donor, content: &MessageContent) -> Result<SendReceipt> {
        let Some(phone) = donor.contact_for(Channel::Chat) else {
            warn!(donor_id = donor.id, "捐赠人未绑定手机号，跳过即时消息");
            return Err(CommsError::UnreachableRecipient {
                donor_id: donor.id,
                reason: "未绑定手机号".to_string(),
            });
        };

        let message_id = format!("chat_{}", Uuid::new_v4());

        info!(
            donor_id = donor.id,
            phone = %phone,
            message_id = %message_id,
            body = %content.body,
            "模拟发送即时消息通知"
        );

        Ok(SendReceipt {
            external_message_id: Some(message_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> MessageContent {
        MessageContent {
            subject: None,
            body: "消息内容".to_string(),
            appeal: None,
        }
    }

    #[tokio::test]
    async fn test_chat_send_success() {
        let donor = Donor::new(1, "张三").with_phone("13800138000");

        let receipt = ChatAdapter.send(&donor, &content()).await.unwrap();
        assert!(receipt.external_message_id.unwrap().starts_with("chat_"));
    }

    #[tokio::test]
    async fn test_chat_missing_phone_is_unreachable() {
        let donor = Donor::new(2, "李四");

        let err = ChatAdapter.send(&donor, &content()).await.unwrap_err();
        assert_eq!(err.code(), "UNREACHABLE_RECIPIENT");
    }

    #[test]
    fn test_chat_channel_type() {
        assert_eq!(ChatAdapter.channel(), Channel::Chat);
        assert_eq!(ChatAdapter.name(), "Chat");
    }
}
