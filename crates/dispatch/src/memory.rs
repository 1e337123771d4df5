//! 内存版外部协作方实现
//!
//! 用于测试与演示环境：捐赠人目录、项目登记和通讯历史都保存在
//! 进程内存中。生产部署时替换为对接真实目录服务与审计存储的实现。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use comms_shared::error::Result;
use comms_shared::types::{Appeal, Donor};

use crate::ports::{AppealRegistry, DonorDirectory, HistoryStore};
use crate::types::HistoryRecord;

// ---------------------------------------------------------------------------
// InMemoryDirectory — 捐赠人目录
// ---------------------------------------------------------------------------

/// 内存版捐赠人目录
///
/// 除捐赠人本身外还维护项目与捐赠人的关联关系；
/// `find_by_appeal` 按关联建立的顺序返回。
#[derive(Default)]
pub struct InMemoryDirectory {
    donors: RwLock<HashMap<i64, Donor>>,
    /// 项目 ID -> 按加入顺序排列的捐赠人 ID
    appeal_links: RwLock<HashMap<i64, Vec<i64>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记捐赠人
    pub async fn add_donor(&self, donor: Donor) {
        self.donors.write().await.insert(donor.id, donor);
    }

    /// 将捐赠人关联到募捐项目
    pub async fn link_to_appeal(&self, appeal_id: i64, donor_id: i64) {
        let mut links = self.appeal_links.write().await;
        let ids = links.entry(appeal_id).or_default();
        if !ids.contains(&donor_id) {
            ids.push(donor_id);
        }
    }
}

#[async_trait]
impl DonorDirectory for InMemoryDirectory {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Donor>> {
        let donors = self.donors.read().await;
        // 按请求顺序返回，未登记的 ID 缺席于结果
        Ok(ids.iter().filter_map(|id| donors.get(id).cloned()).collect())
    }

    async fn find_by_appeal(&self, appeal_id: i64) -> Result<Vec<Donor>> {
        let links = self.appeal_links.read().await;
        let donors = self.donors.read().await;

        Ok(links
            .get(&appeal_id)
            .map(|ids| ids.iter().filter_map(|id| donors.get(id).cloned()).collect())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// InMemoryAppealRegistry — 项目登记
// ---------------------------------------------------------------------------

/// 内存版募捐项目登记
#[derive(Default)]
pub struct InMemoryAppealRegistry {
    appeals: RwLock<HashMap<i64, Appeal>>,
}

impl InMemoryAppealRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, appeal: Appeal) {
        self.appeals.write().await.insert(appeal.id, appeal);
    }
}

#[async_trait]
impl AppealRegistry for InMemoryAppealRegistry {
    async fn get(&self, appeal_id: i64) -> Result<Option<Appeal>> {
        Ok(self.appeals.read().await.get(&appeal_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// InMemoryHistoryStore — 通讯历史
// ---------------------------------------------------------------------------

/// 内存版通讯历史存储（仅追加）
#[derive(Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, record: HistoryRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn list_by_appeal(&self, appeal_id: i64) -> Result<Vec<HistoryRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.appeal_id == appeal_id)
            .cloned()
            .collect())
    }
}
