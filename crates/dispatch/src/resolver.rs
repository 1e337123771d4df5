//! 收件人解析
//!
//! 把收件人选择器解析为具体、去重后的捐赠人列表。显式 ID 列表中
//! 无法解析的 ID 被丢弃并记录差异（只要仍有至少一个可解析），
//! 不会令整个调用失败。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use comms_shared::error::{CommsError, Result};
use comms_shared::types::Donor;

use crate::ports::{AppealRegistry, DonorDirectory};
use crate::types::RecipientSelector;

/// 收件人解析器
pub struct RecipientResolver {
    directory: Arc<dyn DonorDirectory>,
    registry: Arc<dyn AppealRegistry>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn DonorDirectory>, registry: Arc<dyn AppealRegistry>) -> Self {
        Self {
            directory,
            registry,
        }
    }

    /// 解析收件人列表
    ///
    /// - `AllDonors`：校验项目存在后取项目关联的全部捐赠人，
    ///   项目不存在返回 `AppealNotFound`；
    /// - `Selected`：按 ID 查询目录，未解析的 ID 丢弃并告警。
    ///
    /// 结果为空时返回 `NoRecipients`；顺序为目录产出顺序，
    /// 去重保留首次出现。
    pub async fn resolve(
        &self,
        selector: &RecipientSelector,
        appeal_id: i64,
    ) -> Result<Vec<Donor>> {
        let donors = match selector {
            RecipientSelector::AllDonors => {
                // 全员圈选必须先确认项目存在，避免向不存在的项目"成功"发送零条通知
                self.registry
                    .get(appeal_id)
                    .await?
                    .ok_or(CommsError::AppealNotFound(appeal_id))?;

                self.directory.find_by_appeal(appeal_id).await?
            }
            RecipientSelector::Selected(ids) => {
                let found = self.directory.find_by_ids(ids).await?;
                if found.len() < ids.len() {
                    warn!(
                        appeal_id,
                        requested = ids.len(),
                        resolved = found.len(),
                        "部分捐赠人 ID 未能解析，已跳过"
                    );
                }
                found
            }
        };

        let donors = dedup_by_id(donors);

        if donors.is_empty() {
            return Err(CommsError::NoRecipients);
        }

        debug!(appeal_id, recipient_count = donors.len(), "收件人解析完成");
        Ok(donors)
    }
}

/// 按捐赠人 ID 去重，保留首次出现的顺序
fn dedup_by_id(donors: Vec<Donor>) -> Vec<Donor> {
    let mut seen = HashSet::new();
    donors
        .into_iter()
        .filter(|donor| seen.insert(donor.id))
        .collect()
}
