//! 募捐通讯 REST 服务入口
//!
//! 加载配置、初始化日志、装配调度引擎与内存版外部协作方，
//! 启动 HTTP 服务并支持优雅关闭。演示环境使用内存目录与历史
//! 存储，生产部署时替换为对接真实外部服务的实现。

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use comms_api_service::handlers::health_check;
use comms_api_service::routes;
use comms_api_service::state::AppState;
use comms_dispatch::audit::AuditRecorder;
use comms_dispatch::channels::{ChatAdapter, EmailAdapter, LogMailTransport, SmsAdapter};
use comms_dispatch::engine::DispatchEngine;
use comms_dispatch::memory::{InMemoryAppealRegistry, InMemoryDirectory, InMemoryHistoryStore};
use comms_dispatch::resolver::RecipientResolver;
use comms_dispatch::triggers::TriggerFacade;
use comms_shared::config::AppConfig;
use comms_shared::types::{Appeal, Donor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("comms-api-service").unwrap_or_default();
    init_tracing(&config);

    info!("Starting comms-api-service on {}", config.server_addr());

    // 装配内存版外部协作方并写入演示数据
    let directory = Arc::new(InMemoryDirectory::new());
    let registry = Arc::new(InMemoryAppealRegistry::new());
    let store = Arc::new(InMemoryHistoryStore::new());
    seed_demo_data(&directory, &registry).await;

    let resolver = RecipientResolver::new(directory.clone(), registry.clone());
    let recorder = Arc::new(AuditRecorder::new(store.clone()));

    let mut engine = DispatchEngine::new(
        resolver,
        registry.clone(),
        recorder.clone(),
        config.dispatch.clone(),
    );
    engine.register_adapter(Arc::new(EmailAdapter::new(
        Arc::new(LogMailTransport),
        config.mail.clone(),
    )));
    engine.register_adapter(Arc::new(SmsAdapter));
    engine.register_adapter(Arc::new(ChatAdapter));
    info!(channels = ?engine.registered_channels(), "渠道适配器装配完成");
    let engine = Arc::new(engine);

    let facade = Arc::new(TriggerFacade::new(engine.clone(), registry.clone()));
    let state = AppState { facade, recorder };

    // CORS 配置：通过 COMMS_CORS_ORIGINS 环境变量控制允许的来源
    // 默认允许本地开发地址，生产环境应设置为实际域名
    let allowed_origins = std::env::var("COMMS_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    let cors = if allowed_origins == "*" {
        if config.is_production() {
            warn!("COMMS_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM（K8s 停止 Pod）或 Ctrl+C 时，
    // 停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志订阅器
///
/// RUST_LOG 优先；未设置时回退到配置文件中的日志级别。
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log.level.clone()));

    if config.log.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 写入演示数据：一个募捐项目与三位捐赠人
///
/// 其中一位未绑定邮箱，便于演示 EMAIL 批次的部分成功路径。
async fn seed_demo_data(directory: &InMemoryDirectory, registry: &InMemoryAppealRegistry) {
    registry
        .insert(Appeal {
            id: 1,
            title: "乡村图书馆".to_string(),
            description: "为山区小学筹建图书馆".to_string(),
            amount: 50_000,
        })
        .await;

    let donors = vec![
        Donor::new(1, "张三")
            .with_email("zhangsan@example.com")
            .with_phone("13800138001"),
        Donor::new(2, "李四").with_email("lisi@example.com"),
        Donor::new(3, "王五").with_phone("13800138003"),
    ];

    for donor in donors {
        let donor_id = donor.id;
        directory.add_donor(donor).await;
        directory.link_to_appeal(1, donor_id).await;
    }

    info!("演示数据已写入：项目 1 关联 3 位捐赠人");
}

/// 监听关闭信号
///
/// K8s 通过 SIGTERM 通知 Pod 停止；本地开发通过 Ctrl+C。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
