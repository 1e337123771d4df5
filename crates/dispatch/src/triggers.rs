//! 触发入口
//!
//! 把业务事件（审批通过、审批驳回、手动发送）转换为填充完整的
//! 调度请求并交给调度引擎。手动发送入口负责把请求边界的字符串
//! 字段解析为封闭枚举，未识别的取值在此立即拒绝。

use std::sync::Arc;

use tracing::{info, instrument};

use comms_shared::error::{CommsError, Result};
use comms_shared::types::{Channel, TriggerType};

use crate::engine::DispatchEngine;
use crate::ports::AppealRegistry;
use crate::templates;
use crate::types::{DispatchRequest, DispatchResult, RecipientSelector};

/// 手动发送请求
///
/// 对应入站 HTTP 请求的载荷；字符串字段在 `send_manual` 中解析为
/// 封闭枚举。
#[derive(Debug, Clone)]
pub struct ManualSendRequest {
    pub appeal_id: i64,
    pub channel: String,
    pub subject: Option<String>,
    pub message: String,
    /// ALL_DONORS 或 SELECTED_DONORS
    pub recipient_type: String,
    /// recipient_type = SELECTED_DONORS 时必填且非空
    pub donor_ids: Option<Vec<i64>>,
    pub initiated_by: Option<String>,
}

/// 触发入口
///
/// 业务服务只与本结构交互，不直接构造调度请求。
pub struct TriggerFacade {
    engine: Arc<DispatchEngine>,
    registry: Arc<dyn AppealRegistry>,
}

impl TriggerFacade {
    pub fn new(engine: Arc<DispatchEngine>, registry: Arc<dyn AppealRegistry>) -> Self {
        Self { engine, registry }
    }

    /// 审批通过后通知项目的全体捐赠人
    #[instrument(skip(self))]
    pub async fn on_approval(&self, appeal_id: i64, approver_id: &str) -> Result<DispatchResult> {
        let appeal = self
            .registry
            .get(appeal_id)
            .await?
            .ok_or(CommsError::AppealNotFound(appeal_id))?;

        info!(appeal_title = %appeal.title, "发送审批通过通知");

        let request = DispatchRequest::new(
            appeal_id,
            Channel::Email,
            templates::approval_body(&appeal),
            RecipientSelector::AllDonors,
            TriggerType::Approval,
        )
        .with_subject(templates::approval_subject(&appeal))
        .with_initiator(approver_id);

        self.engine.dispatch(&request).await
    }

    /// 审批驳回后通知项目的全体捐赠人
    #[instrument(skip(self, reason))]
    pub async fn on_rejection(
        &self,
        appeal_id: i64,
        reason: &str,
        rejector_id: &str,
    ) -> Result<DispatchResult> {
        let appeal = self
            .registry
            .get(appeal_id)
            .await?
            .ok_or(CommsError::AppealNotFound(appeal_id))?;

        info!(appeal_title = %appeal.title, "发送审批驳回通知");

        let request = DispatchRequest::new(
            appeal_id,
            Channel::Email,
            templates::rejection_body(&appeal, reason),
            RecipientSelector::AllDonors,
            TriggerType::Rejection,
        )
        .with_subject(templates::rejection_subject(&appeal))
        .with_initiator(rejector_id);

        self.engine.dispatch(&request).await
    }

    /// 手动发送
    ///
    /// 解析收件人类型与渠道字符串，构造 MANUAL 触发的调度请求。
    /// EMAIL 渠道缺少主题等形状问题由 `DispatchRequest::validate`
    /// 统一拦截。
    #[instrument(skip(self, request), fields(appeal_id = request.appeal_id))]
    pub async fn send_manual(&self, request: ManualSendRequest) -> Result<DispatchResult> {
        let channel: Channel = request.channel.parse()?;

        let selector = match request.recipient_type.as_str() {
            "ALL_DONORS" => RecipientSelector::AllDonors,
            "SELECTED_DONORS" => {
                let ids = request.donor_ids.unwrap_or_default();
                if ids.is_empty() {
                    return Err(CommsError::Validation(
                        "SELECTED_DONORS 必须提供非空的 donorIds".to_string(),
                    ));
                }
                RecipientSelector::Selected(ids)
            }
            other => {
                return Err(CommsError::Validation(format!(
                    "无效的收件人类型: {other}"
                )));
            }
        };

        let mut dispatch_request = DispatchRequest::new(
            request.appeal_id,
            channel,
            request.message,
            selector,
            TriggerType::Manual,
        );
        dispatch_request.subject = request.subject;
        dispatch_request.initiated_by = request.initiated_by;

        self.engine.dispatch(&dispatch_request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_request() -> ManualSendRequest {
        ManualSendRequest {
            appeal_id: 10,
            channel: "EMAIL".to_string(),
            subject: Some("主题".to_string()),
            message: "内容".to_string(),
            recipient_type: "ALL_DONORS".to_string(),
            donor_ids: None,
            initiated_by: Some("admin-01".to_string()),
        }
    }

    // send_manual 的解析分支不依赖引擎状态，完整链路在集成测试覆盖；
    // 这里只验证边界解析的拒绝路径。

    fn facade_without_data() -> TriggerFacade {
        use crate::audit::AuditRecorder;
        use crate::memory::{InMemoryAppealRegistry, InMemoryDirectory, InMemoryHistoryStore};
        use crate::resolver::RecipientResolver;
        use comms_shared::config::DispatchConfig;

        let directory = Arc::new(InMemoryDirectory::new());
        let registry: Arc<InMemoryAppealRegistry> = Arc::new(InMemoryAppealRegistry::new());
        let recorder = Arc::new(AuditRecorder::new(Arc::new(InMemoryHistoryStore::new())));
        let resolver = RecipientResolver::new(directory, registry.clone());
        let engine = Arc::new(DispatchEngine::new(
            resolver,
            registry.clone(),
            recorder,
            DispatchConfig::default(),
        ));
        TriggerFacade::new(engine, registry)
    }

    #[tokio::test]
    async fn test_send_manual_rejects_unknown_channel() {
        let facade = facade_without_data();

        let mut request = manual_request();
        request.channel = "WHATSAPP".to_string();

        let err = facade.send_manual(request).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("WHATSAPP"));
    }

    #[tokio::test]
    async fn test_send_manual_rejects_unknown_recipient_type() {
        let facade = facade_without_data();

        let mut request = manual_request();
        request.recipient_type = "EVERYONE".to_string();

        let err = facade.send_manual(request).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("EVERYONE"));
    }

    #[tokio::test]
    async fn test_send_manual_selected_requires_donor_ids() {
        let facade = facade_without_data();

        let mut request = manual_request();
        request.recipient_type = "SELECTED_DONORS".to_string();
        request.donor_ids = Some(vec![]);

        let err = facade.send_manual(request).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        // donorIds 完全缺失同样拒绝
        let mut request = manual_request();
        request.recipient_type = "SELECTED_DONORS".to_string();
        request.donor_ids = None;

        assert!(facade.send_manual(request).await.is_err());
    }

    #[tokio::test]
    async fn test_on_approval_missing_appeal() {
        let facade = facade_without_data();

        let err = facade.on_approval(99, "admin-01").await.unwrap_err();
        assert!(matches!(err, CommsError::AppealNotFound(99)));
    }
}
