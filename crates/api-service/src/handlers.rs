//! REST 请求处理器
//!
//! 发送接口的响应策略：部分成功同样返回 200，调用方通过批次计数
//! 判断投递情况；收件人集合为空返回成功与解释性消息，而不是错误。

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;
use validator::Validate;

use comms_dispatch::types::{DispatchResult, HistoryRecord};

use crate::dto::{ApiResponse, SendCommunicationRequest};
use crate::error::Result;
use crate::state::AppState;

/// 发送通讯
pub async fn send_communication(
    State(state): State<AppState>,
    Json(request): Json<SendCommunicationRequest>,
) -> Result<Json<ApiResponse<DispatchResult>>> {
    request.validate()?;

    info!(
        appeal_id = request.appeal_id,
        channel = %request.channel,
        recipient_type = %request.recipient_type,
        "收到通讯发送请求"
    );

    let result = state.facade.send_manual(request.into()).await?;

    let message = if result.is_noop() {
        "没有匹配的收件人，未发送任何通知".to_string()
    } else {
        format!("通讯已处理：成功 {}/{}", result.delivered, result.requested)
    };

    Ok(Json(ApiResponse::success_with_message(result, message)))
}

/// 查询全部通讯历史
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<HistoryRecord>>>> {
    let records = state.recorder.list_all().await?;
    Ok(Json(ApiResponse::success(records)))
}

/// 查询指定项目的通讯历史
pub async fn list_history_by_appeal(
    State(state): State<AppState>,
    Path(appeal_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<HistoryRecord>>>> {
    let records = state.recorder.list_by_appeal(appeal_id).await?;
    Ok(Json(ApiResponse::success(records)))
}

/// 存活探针
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "comms-api-service"
    }))
}
