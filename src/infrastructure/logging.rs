//! 日志系统配置模块
//! 支持文本/JSON 两种输出，RUST_LOG 优先于配置中的级别

use tracing_subscriber::{
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::LoggingConfig;

/// 控制台时间格式
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 初始化日志系统
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(config);

    if config.format == "json" {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoLocal::new(TIME_FORMAT.to_string())),
            )
            .try_init()?;
    } else {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
                    .with_target(false)
                    .with_ansi(true),
            )
            .try_init()?;
    }

    Ok(())
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// 简化初始化（使用默认配置）
pub fn init_default_logging() {
    let config = LoggingConfig::default();
    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logging: {}", e);
        // 回退到最基本的日志初始化
        let _ = tracing_subscriber::fmt().try_init();
    });
}
