use apdups::utils::{logger, validation::Validate};
use apdups::{CliConfig, DedupEngine, DedupPipeline, LocalStorage, RunConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting apdups");
    tracing::debug!("CLI arguments: {:?}", cli);

    // 合併設定檔與命令列參數並驗證
    let config = match RunConfig::resolve(&cli).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("   for help use --help");
            std::process::exit(e.severity().exit_code());
        }
    };

    tracing::debug!(
        "Input: {}, threshold: {}, format: {}",
        config.input_path,
        config.threshold,
        config.format.as_str()
    );

    let monitor_enabled = config.monitor;
    let storage = LocalStorage::default();
    let pipeline = DedupPipeline::new(storage, config);
    let engine = DedupEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output) => {
            tracing::info!("✅ Report written to: {}", output);
        }
        Err(e) => {
            tracing::error!(
                "❌ Duplicate check failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
