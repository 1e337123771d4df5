//! 通讯消息模板
//!
//! 根据触发类型生成邮件主题与正文。当前使用硬编码模板以降低
//! 外部依赖，未来可扩展为从配置中心动态加载。

use comms_shared::types::Appeal;

/// 审批通过通知的邮件主题
pub fn approval_subject(appeal: &Appeal) -> String {
    format!("募捐项目已获批准：{}", appeal.title)
}

/// 审批通过通知的正文
///
/// 以项目标题与批准金额参数化，面向该项目的全体捐赠人。
pub fn approval_body(appeal: &Appeal) -> String {
    format!(
        "好消息！您支持的募捐项目「{}」已通过审批，批准金额 ¥{}。\
         善款将按计划执行，我们会持续向您同步项目进展。感谢您的慷慨支持！",
        appeal.title, appeal.amount
    )
}

/// 审批驳回通知的邮件主题
pub fn rejection_subject(appeal: &Appeal) -> String {
    format!("募捐项目进度通知：{}", appeal.title)
}

/// 审批驳回通知的正文
pub fn rejection_body(appeal: &Appeal, reason: &str) -> String {
    format!(
        "很遗憾，您关注的募捐项目「{}」未能通过本次审批。原因：{}。\
         欢迎在调整方案后重新提交申请，感谢您的理解与支持。",
        appeal.title, reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_appeal() -> Appeal {
        Appeal {
            id: 10,
            title: "乡村图书馆".to_string(),
            description: "为山区小学筹建图书馆".to_string(),
            amount: 50_000,
        }
    }

    #[test]
    fn test_approval_template() {
        let appeal = test_appeal();

        let subject = approval_subject(&appeal);
        assert_eq!(subject, "募捐项目已获批准：乡村图书馆");

        let body = approval_body(&appeal);
        assert!(body.contains("「乡村图书馆」"));
        assert!(body.contains("¥50000"));
    }

    #[test]
    fn test_rejection_template() {
        let appeal = test_appeal();

        let subject = rejection_subject(&appeal);
        assert!(subject.contains("乡村图书馆"));

        let body = rejection_body(&appeal, "预算明细不完整");
        assert!(body.contains("「乡村图书馆」"));
        assert!(body.contains("预算明细不完整"));
    }
}
