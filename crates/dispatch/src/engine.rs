//! 调度引擎
//!
//! 编排一次批量通讯的完整流程：校验请求 → 解析收件人 → 按收件人
//! 并发发送 → 聚合结果 → 写入历史。失败隔离是本组件的核心不变量：
//! 单个收件人的发送失败绝不阻止后续收件人的尝试。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use comms_shared::config::DispatchConfig;
use comms_shared::error::{CommsError, Result};
use comms_shared::types::{Channel, DeliveryStatus, Donor};

use crate::audit::AuditRecorder;
use crate::channels::{ChannelAdapter, MessageContent};
use crate::ports::AppealRegistry;
use crate::resolver::RecipientResolver;
use crate::types::{DispatchOutcome, DispatchRequest, DispatchResult};

/// 调度引擎
///
/// 持有收件人解析器、按渠道注册的适配器、审计记录器与并发配置。
/// 适配器无状态且可并发调用，引擎按配置上限并发发送。
pub struct DispatchEngine {
    resolver: RecipientResolver,
    registry: Arc<dyn AppealRegistry>,
    adapters: HashMap<Channel, Arc<dyn ChannelAdapter>>,
    recorder: Arc<AuditRecorder>,
    config: DispatchConfig,
}

impl DispatchEngine {
    pub fn new(
        resolver: RecipientResolver,
        registry: Arc<dyn AppealRegistry>,
        recorder: Arc<AuditRecorder>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            resolver,
            registry,
            adapters: HashMap::new(),
            recorder,
            config,
        }
    }

    /// 注册渠道适配器
    pub fn register_adapter(&mut self, adapter: Arc<dyn ChannelAdapter>) {
        info!(
            channel = %adapter.channel(),
            adapter_name = adapter.name(),
            "注册渠道适配器"
        );
        self.adapters.insert(adapter.channel(), adapter);
    }

    /// 已注册的渠道列表
    pub fn registered_channels(&self) -> Vec<Channel> {
        self.adapters.keys().copied().collect()
    }

    /// 执行一次批量通讯
    ///
    /// 只有结构性问题（请求不合法、项目不存在、目录故障）返回 Err；
    /// 单收件人的发送失败被吸收进批次结果。收件人集合为空时返回
    /// 零效果结果，不写历史。
    #[instrument(
        skip(self, request),
        fields(
            appeal_id = request.appeal_id,
            channel = %request.channel,
            trigger = %request.trigger
        )
    )]
    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResult> {
        request.validate()?;

        let donors = match self
            .resolver
            .resolve(&request.selector, request.appeal_id)
            .await
        {
            Ok(donors) => donors,
            Err(CommsError::NoRecipients) => {
                warn!("没有可用的收件人，按空批次返回");
                return Ok(DispatchResult::empty());
            }
            Err(e) => return Err(e),
        };

        // 适配器缺失属于装配问题，必须在接触任何收件人之前失败
        let adapter = self
            .adapters
            .get(&request.channel)
            .cloned()
            .ok_or_else(|| {
                CommsError::Validation(format!("渠道 {} 未注册适配器", request.channel))
            })?;

        // 项目上下文仅用于内容渲染，读取失败降级为无上下文发送
        let appeal = match self.registry.get(request.appeal_id).await {
            Ok(appeal) => appeal,
            Err(e) => {
                warn!(error = %e, "读取项目详情失败，按无项目上下文发送");
                None
            }
        };

        let content = MessageContent {
            subject: request.subject.clone(),
            body: request.body.clone(),
            appeal,
        };

        info!(recipient_count = donors.len(), "开始分发通讯批次");

        let timeout_ms = self.config.send_timeout_ms;
        let send_timeout = Duration::from_millis(timeout_ms);
        let concurrency = self.config.max_concurrent_sends.max(1);

        // buffered 在限制并发的同时保持 resolver 产出的顺序，
        // 结果聚合因此是确定性的
        let outcomes: Vec<DispatchOutcome> = stream::iter(donors)
            .map(|donor| {
                let adapter = Arc::clone(&adapter);
                let content = &content;
                async move {
                    send_to_donor(adapter, &donor, content, send_timeout, timeout_ms).await
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let result = DispatchResult::from_outcomes(outcomes);
        self.log_result(&result);

        // 每个非空批次恰好一条历史记录；写入失败由 recorder 内部降级
        self.recorder.record(request, &result).await;

        Ok(result)
    }

    /// 按批次状态分级记录汇总日志
    fn log_result(&self, result: &DispatchResult) {
        match result.status() {
            Some(DeliveryStatus::Sent) => info!(
                requested = result.requested,
                delivered = result.delivered,
                "通讯批次处理完成（全部成功）"
            ),
            Some(DeliveryStatus::Partial) => warn!(
                requested = result.requested,
                delivered = result.delivered,
                failed = result.failed,
                "通讯批次处理完成（部分成功）"
            ),
            Some(DeliveryStatus::Failed) => error!(
                requested = result.requested,
                failed = result.failed,
                "通讯批次处理完成（全部失败）"
            ),
            None => {}
        }
    }
}

/// 向单个收件人发送并折算为单收件人结果
///
/// 提取为独立异步函数以便编译器正确推导其生命周期，从而满足上层
/// （axum handler）对 future 的 `Send` 约束；行为与内联实现一致。
async fn send_to_donor(
    adapter: Arc<dyn ChannelAdapter>,
    donor: &Donor,
    content: &MessageContent,
    send_timeout: Duration,
    timeout_ms: u64,
) -> DispatchOutcome {
    match tokio::time::timeout(send_timeout, adapter.send(donor, content)).await {
        Ok(Ok(receipt)) => {
            debug!(
                donor_id = donor.id,
                message_id = ?receipt.external_message_id,
                "发送成功"
            );
            DispatchOutcome::delivered(donor.id)
        }
        Ok(Err(CommsError::UnreachableRecipient { reason, .. })) => {
            warn!(donor_id = donor.id, reason = %reason, "收件人不可达，跳过");
            DispatchOutcome::unreachable(donor.id, reason)
        }
        Ok(Err(e)) => {
            error!(donor_id = donor.id, error = %e, "发送失败");
            DispatchOutcome::failed(donor.id, e.to_string())
        }
        Err(_) => {
            error!(donor_id = donor.id, timeout_ms, "发送超时");
            DispatchOutcome::failed(donor.id, format!("发送超时（{timeout_ms}ms）"))
        }
    }
}
