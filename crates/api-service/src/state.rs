//! 服务共享状态

use std::sync::Arc;

use comms_dispatch::audit::AuditRecorder;
use comms_dispatch::triggers::TriggerFacade;

/// REST 服务共享状态
///
/// 发送走触发入口，历史查询走审计记录器。
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<TriggerFacade>,
    pub recorder: Arc<AuditRecorder>,
}
