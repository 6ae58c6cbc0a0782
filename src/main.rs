// voice-separator 主入口

use std::sync::Arc;
use tracing::{error, info, warn};

use voice_separator::api::system::check_dependencies;
use voice_separator::config::AppConfig;
use voice_separator::job::JobOrchestrator;
use voice_separator::process::{SystemRunner, ToolRunner};
use voice_separator::{build_router, logging, AppResult, AppState};

#[tokio::main]
async fn main() {
    let config_path = AppConfig::default_path();
    let (config, config_warning) = match AppConfig::load(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("配置加载失败 ({}): {}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    // guard 必须保持存活，否则异步日志线程会退出
    let _log_guard = logging::init_logging(&config.log_level, config.log_dir.as_deref());

    info!("voice-separator {} 启动中...", env!("CARGO_PKG_VERSION"));
    if let Some(warning) = config_warning {
        warn!("[CONFIG] {}", warning);
    }
    info!("[CONFIG] 配置已加载: {}", config_path.display());

    if let Err(e) = run(config).await {
        error!("服务异常退出: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    let runner: Arc<dyn ToolRunner> = Arc::new(SystemRunner);

    // 依赖缺失不阻止启动，请求时返回 503
    for check in check_dependencies(runner.as_ref(), &config.tools) {
        if check.available {
            info!("[SYSTEM] {}: {}", check.name, check.version.as_deref().unwrap_or("已安装"));
        } else {
            warn!("[SYSTEM] {}", check.message);
        }
    }

    let orchestrator = JobOrchestrator::new(&config, runner.clone())?;
    let state = AppState::new(orchestrator, runner, &config);
    let app = build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[HTTP] 监听 http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("voice-separator 已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("监听 Ctrl-C 失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("监听 SIGTERM 失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("收到退出信号，正在停止...");
}
