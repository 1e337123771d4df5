//! 路由定义

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// 通讯相关 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/communications/send", post(handlers::send_communication))
        .route("/communications/history", get(handlers::list_history))
        .route(
            "/communications/history/appeal/{appeal_id}",
            get(handlers::list_history_by_appeal),
        )
}
