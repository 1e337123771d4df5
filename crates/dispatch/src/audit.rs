//! 通讯历史审计
//!
//! 每个非空批次恰好写入一条历史记录。历史写入是次要关注点：
//! 写入失败只记录日志，不会把一次成功的调度变成失败结果。

use std::sync::Arc;

use tracing::{debug, error};

use comms_shared::error::Result;

use crate::ports::HistoryStore;
use crate::types::{DispatchRequest, DispatchResult, HistoryRecord};

/// 审计记录器
pub struct AuditRecorder {
    store: Arc<dyn HistoryStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// 记录一次调度批次
    ///
    /// 空批次（未触达任何收件人）不写历史；写入失败降级为日志。
    pub async fn record(&self, request: &DispatchRequest, result: &DispatchResult) {
        let Some(record) = HistoryRecord::from_dispatch(request, result) else {
            debug!(appeal_id = request.appeal_id, "空批次不写入通讯历史");
            return;
        };

        let record_id = record.id.clone();
        if let Err(e) = self.store.append(record).await {
            error!(
                appeal_id = request.appeal_id,
                record_id = %record_id,
                error = %e,
                "通讯历史写入失败，本次调度结果不受影响"
            );
        } else {
            debug!(
                appeal_id = request.appeal_id,
                record_id = %record_id,
                "通讯历史已写入"
            );
        }
    }

    /// 查询全部历史记录
    pub async fn list_all(&self) -> Result<Vec<HistoryRecord>> {
        self.store.list_all().await
    }

    /// 查询指定项目的历史记录
    pub async fn list_by_appeal(&self, appeal_id: i64) -> Result<Vec<HistoryRecord>> {
        self.store.list_by_appeal(appeal_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comms_shared::error::CommsError;
    use comms_shared::types::{Channel, DeliveryStatus, TriggerType};

    use crate::memory::InMemoryHistoryStore;
    use crate::ports::MockHistoryStore;
    use crate::types::{DispatchOutcome, RecipientSelector};

    fn request() -> DispatchRequest {
        DispatchRequest::new(
            10,
            Channel::Email,
            "测试内容",
            RecipientSelector::AllDonors,
            TriggerType::Approval,
        )
        .with_subject("测试主题")
    }

    #[tokio::test]
    async fn test_record_writes_one_row_per_batch() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let recorder = AuditRecorder::new(store.clone());

        let result = DispatchResult::from_outcomes(vec![
            DispatchOutcome::delivered(1),
            DispatchOutcome::failed(2, "超时"),
        ]);
        recorder.record(&request(), &result).await;

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].recipient_count, 2);
        assert_eq!(records[0].delivered_count, 1);
        assert_eq!(records[0].status, DeliveryStatus::Partial);
        assert_eq!(records[0].trigger, TriggerType::Approval);
    }

    #[tokio::test]
    async fn test_record_skips_empty_batch() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let recorder = AuditRecorder::new(store.clone());

        recorder.record(&request(), &DispatchResult::empty()).await;

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_swallows_store_failure() {
        // 历史写入失败不能向上传播
        let mut store = MockHistoryStore::new();
        store
            .expect_append()
            .returning(|_| Err(CommsError::AuditWrite("磁盘已满".to_string())));

        let recorder = AuditRecorder::new(Arc::new(store));
        let result = DispatchResult::from_outcomes(vec![DispatchOutcome::delivered(1)]);

        // 不 panic、不返回错误即为通过
        recorder.record(&request(), &result).await;
    }
}
