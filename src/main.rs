use anyhow::Context;
use clap::Parser;
use wind_dashboard::core::ConfigProvider;
use wind_dashboard::utils::error::ErrorSeverity;
use wind_dashboard::utils::{logger, validation::Validate};
use wind_dashboard::{CliConfig, DashboardEngine, DashboardPipeline, LocalStorage};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🌬️ Starting wind-dashboard");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let config = cli
        .resolve()
        .context("failed to resolve dashboard configuration")?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let storage = LocalStorage::new(config.output_path());
    let title = config.title().to_string();
    let pipeline = DashboardPipeline::new(storage, config, &title, &generated_at);
    let engine = DashboardEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(report) => {
            for path in &report.outputs {
                println!("📁 {}", path);
            }
            if report.data_available {
                tracing::info!("✅ Dashboard built successfully");
                Ok(())
            } else {
                eprintln!("⚠️ Data could not be loaded; the diagnostic page was written instead");
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Dashboard build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}
