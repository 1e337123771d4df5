//! 募捐通讯 REST 服务
//!
//! 提供手动发送通讯与查询通讯历史的 REST API。
//! 请求校验与错误到状态码的映射在本层完成，业务语义由
//! comms-dispatch 的触发入口承载。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
