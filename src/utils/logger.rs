use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 依 verbose 旗標與設定檔的 log level 建立過濾器；RUST_LOG 優先
pub fn build_filter(verbose: bool, level: &str) -> EnvFilter {
    let directive = if verbose || level == "debug" || level == "trace" {
        format!("data_formatter={},info", if level == "trace" { "trace" } else { "debug" })
    } else {
        format!("data_formatter={}", level)
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

pub fn init_cli_logger(verbose: bool, level: &str) {
    tracing_subscriber::registry()
        .with(build_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
