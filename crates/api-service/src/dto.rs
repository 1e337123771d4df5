//! REST 请求与响应 DTO 定义
//!
//! 入站载荷在此完成字段级校验；跨字段规则（EMAIL 必须有主题、
//! SELECTED_DONORS 必须有 donorIds）由触发入口统一拦截，
//! 以保证非 HTTP 调用方享有相同的校验。

use serde::{Deserialize, Serialize};
use validator::Validate;

use comms_dispatch::triggers::ManualSendRequest;

/// 发送通讯请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendCommunicationRequest {
    pub appeal_id: i64,
    /// EMAIL / SMS / CHAT，由核心层按封闭枚举解析
    #[validate(length(min = 1, message = "渠道不能为空"))]
    pub channel: String,
    /// EMAIL 渠道必填
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "消息内容不能为空"))]
    pub message: String,
    /// ALL_DONORS 或 SELECTED_DONORS
    #[validate(length(min = 1, message = "收件人类型不能为空"))]
    pub recipient_type: String,
    /// recipientType = SELECTED_DONORS 时必填且非空
    pub donor_ids: Option<Vec<i64>>,
}

impl From<SendCommunicationRequest> for ManualSendRequest {
    fn from(req: SendCommunicationRequest) -> Self {
        Self {
            appeal_id: req.appeal_id,
            channel: req.channel,
            subject: req.subject,
            message: req.message,
            recipient_type: req.recipient_type,
            donor_ids: req.donor_ids,
            // 发起人来自已被排除的认证层，REST 演示环境不记录
            initiated_by: None,
        }
    }
}

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialize_camel_case() {
        let json = r#"{
            "appealId": 10,
            "channel": "EMAIL",
            "subject": "项目进展",
            "message": "感谢您的支持",
            "recipientType": "SELECTED_DONORS",
            "donorIds": [1, 2, 999]
        }"#;

        let req: SendCommunicationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.appeal_id, 10);
        assert_eq!(req.channel, "EMAIL");
        assert_eq!(req.recipient_type, "SELECTED_DONORS");
        assert_eq!(req.donor_ids, Some(vec![1, 2, 999]));

        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_validation_rejects_empty_message() {
        let json = r#"{
            "appealId": 10,
            "channel": "SMS",
            "message": "",
            "recipientType": "ALL_DONORS"
        }"#;

        let req: SendCommunicationRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_conversion_to_manual_send_request() {
        let req = SendCommunicationRequest {
            appeal_id: 10,
            channel: "SMS".to_string(),
            subject: None,
            message: "内容".to_string(),
            recipient_type: "ALL_DONORS".to_string(),
            donor_ids: None,
        };

        let manual: ManualSendRequest = req.into();
        assert_eq!(manual.appeal_id, 10);
        assert_eq!(manual.recipient_type, "ALL_DONORS");
        assert!(manual.initiated_by.is_none());
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::success_with_message(42, "通讯已处理");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["code"], "SUCCESS");
        assert_eq!(json["message"], "通讯已处理");
        assert_eq!(json["data"], 42);
    }
}
