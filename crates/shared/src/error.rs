//! 统一错误处理模块
//!
//! 定义通讯调度系统中所有共享的错误类型，使用 thiserror 提供良好的错误信息。
//! 错误分为两个层面：结构性错误（请求不合法、资源不存在）向调用方传播；
//! 单收件人级别的发送错误由调度引擎吸收进批次结果，不向上抛出。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum CommsError {
    // ==================== 请求校验错误 ====================
    #[error("参数验证失败: {0}")]
    Validation(String),

    // ==================== 资源错误 ====================
    #[error("募捐项目不存在: appeal_id={0}")]
    AppealNotFound(i64),

    #[error("没有可用的收件人")]
    NoRecipients,

    // ==================== 发送错误（单收件人级别） ====================
    #[error("收件人不可达: donor_id={donor_id}, 原因={reason}")]
    UnreachableRecipient { donor_id: i64, reason: String },

    #[error("发送失败: 渠道={channel}, 原因={reason}")]
    Delivery { channel: String, reason: String },

    // ==================== 审计错误 ====================
    #[error("通讯历史写入失败: {0}")]
    AuditWrite(String),

    // ==================== 通用错误 ====================
    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, CommsError>;

impl CommsError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AppealNotFound(_) => "APPEAL_NOT_FOUND",
            Self::NoRecipients => "NO_RECIPIENTS",
            Self::UnreachableRecipient { .. } => "UNREACHABLE_RECIPIENT",
            Self::Delivery { .. } => "DELIVERY_ERROR",
            Self::AuditWrite(_) => "AUDIT_WRITE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    ///
    /// 只有传输层失败值得重试；收件人缺少联系方式属于数据问题，
    /// 重试不会改变结果。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }
}

impl From<config::ConfigError> for CommsError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
