//! REST 层错误类型定义
//!
//! 把核心层的结构性错误映射为 HTTP 状态码与统一响应体。
//! 单收件人的发送失败已在核心层聚合进批次结果，不会以错误形态
//! 到达本层。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use comms_shared::error::CommsError;

/// REST 层错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("募捐项目不存在: {0}")]
    AppealNotFound(i64),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::AppealNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AppealNotFound(_) => "APPEAL_NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从核心层错误转换
///
/// NoRecipients 已由调度引擎折算为零效果结果，正常流程不会以错误
/// 形态到达这里；防御性地并入内部错误。
impl From<CommsError> for ApiError {
    fn from(err: CommsError) -> Self {
        match err {
            CommsError::Validation(msg) => Self::Validation(msg),
            CommsError::AppealNotFound(id) => Self::AppealNotFound(id),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// REST 层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
