//! Email 邮件渠道适配器
//!
//! 把消息正文包装为 HTML 邮件，经注入的邮件传输发送。
//! 发件人信息来自显式注入的 MailConfig，不读取任何全局状态。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use comms_shared::config::MailConfig;
use comms_shared::error::{CommsError, Result};
use comms_shared::types::{Channel, Donor};

use super::{ChannelAdapter, MessageContent, SendReceipt};
use crate::ports::MailTransport;

/// Email 邮件渠道适配器
///
/// 要求收件人绑定邮箱；未绑定视为不可达，计入批次失败但不中断批次。
pub struct EmailAdapter {
    transport: Arc<dyn MailTransport>,
    mail: MailConfig,
}

impl EmailAdapter {
    pub fn new(transport: Arc<dyn MailTransport>, mail: MailConfig) -> Self {
        Self { transport, mail }
    }

    /// 构建 HTML 邮件内容
    ///
    /// 正文外包一层固定信封；携带项目上下文时追加项目详情块
    /// （标题 / 描述 / 批准金额）。
    fn build_html_content(&self, content: &MessageContent) -> String {
        let appeal_block = match &content.appeal {
            Some(appeal) => format!(
                r#"<div class="details">
            <div class="details-row"><span class="label">项目：</span><span class="value">{}</span></div>
            <div class="details-row"><span class="label">简介：</span><span class="value">{}</span></div>
            <div class="details-row"><span class="label">批准金额：</span><span class="value">¥{}</span></div>
        </div>"#,
                appeal.title, appeal.description, appeal.amount
            ),
            None => String::new(),
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 20px auto; background: white; padding: 20px; border-radius: 8px; }}
        .content {{ padding: 20px 0; }}
        .details {{ background-color: #ecf0f1; padding: 15px; border-radius: 5px; margin: 15px 0; }}
        .details-row {{ margin: 10px 0; }}
        .label {{ font-weight: bold; color: #2c3e50; }}
        .value {{ color: #34495e; margin-left: 10px; }}
        .footer {{ text-align: center; margin-top: 30px; color: #7f8c8d; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="content">
            <p>{}</p>
        </div>
        {}
        <div class="footer">
            <p>此邮件由{}自动发送，请勿直接回复。</p>
        </div>
    </div>
</body>
</html>"#,
            content.body, appeal_block, self.mail.from_name
        )
    }
}

#[async_trait]
impl ChannelAdapter for EmailAdapter {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn name(&self) -> &str {
        "Email"
    }

    async fn send(&self, donor: &Donor, content: &MessageContent) -> Result<SendReceipt> {
        let Some(to) = donor.contact_for(Channel::Email) else {
            warn!(donor_id = donor.id, "捐赠人未绑定邮箱，跳过 Email");
            return Err(CommsError::UnreachableRecipient {
                donor_id: donor.id,
                reason: "未绑定邮箱".to_string(),
            });
        };

        // 主题由请求校验保证存在；缺失说明调用链被绕过，按校验失败处理
        let Some(subject) = content.subject.as_deref() else {
            return Err(CommsError::Validation("邮件缺少主题".to_string()));
        };

        let html = self.build_html_content(content);
        debug!(
            donor_id = donor.id,
            to = %to,
            from = %self.mail.from_address,
            subject = %subject,
            content_length = html.len(),
            "Email 发送中..."
        );

        let message_id = self
            .transport
            .send(to, subject, &html)
            .await
            .map_err(|e| CommsError::Delivery {
                channel: Channel::Email.to_string(),
                reason: e.to_string(),
            })?;

        info!(
            donor_id = donor.id,
            message_id = %message_id,
            "Email 发送成功"
        );

        Ok(SendReceipt {
            external_message_id: Some(message_id),
        })
    }
}

// ---------------------------------------------------------------------------
// LogMailTransport — 模拟邮件传输
// ---------------------------------------------------------------------------

/// 模拟邮件传输
///
/// 只记录日志并返回合成消息标识，用于开发与测试环境。
/// 生产环境替换为 SMTP 或邮件服务商（如 SendGrid）的实现。
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String> {
        let message_id = format!("email_{}", Uuid::new_v4());

        info!(
            to = %to,
            subject = %subject,
            content_length = html_body.len(),
            message_id = %message_id,
            "模拟发送邮件"
        );

        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comms_shared::types::Appeal;

    fn adapter() -> EmailAdapter {
        EmailAdapter::new(Arc::new(LogMailTransport), MailConfig::default())
    }

    fn content_with_appeal() -> MessageContent {
        MessageContent {
            subject: Some("测试主题".to_string()),
            body: "测试内容".to_string(),
            appeal: Some(Appeal {
                id: 10,
                title: "乡村图书馆".to_string(),
                description: "为山区小学筹建图书馆".to_string(),
                amount: 50_000,
            }),
        }
    }

    #[tokio::test]
    async fn test_email_send_success() {
        let adapter = adapter();
        let donor = Donor::new(1, "张三").with_email("zhangsan@example.com");

        let receipt = adapter.send(&donor, &content_with_appeal()).await.unwrap();
        let message_id = receipt.external_message_id.expect("应返回消息标识");
        assert!(message_id.starts_with("email_"));
    }

    #[tokio::test]
    async fn test_email_missing_address_is_unreachable() {
        let adapter = adapter();
        let donor = Donor::new(2, "李四").with_phone("13800138000");

        let err = adapter
            .send(&donor, &content_with_appeal())
            .await
            .unwrap_err();

        // 缺少邮箱是数据问题，不可重试
        assert_eq!(err.code(), "UNREACHABLE_RECIPIENT");
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_email_missing_subject_rejected() {
        let adapter = adapter();
        let donor = Donor::new(1, "张三").with_email("zhangsan@example.com");

        let mut content = content_with_appeal();
        content.subject = None;

        let err = adapter.send(&donor, &content).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_build_html_with_appeal_context() {
        let adapter = adapter();
        let html = adapter.build_html_content(&content_with_appeal());

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("测试内容"));
        assert!(html.contains("乡村图书馆"));
        assert!(html.contains("¥50000"));
        assert!(html.contains("募捐通讯中心"));
    }

    #[test]
    fn test_build_html_without_appeal_context() {
        // 没有项目上下文时不渲染详情块
        let adapter = adapter();
        let content = MessageContent {
            subject: Some("主题".to_string()),
            body: "正文".to_string(),
            appeal: None,
        };

        let html = adapter.build_html_content(&content);
        assert!(html.contains("正文"));
        assert!(!html.contains("批准金额"));
    }
}
