use clap::Parser;
use lead_intake::adapters::http;
use lead_intake::utils::logger;
use lead_intake::{build_intake, AppConfig, IntakeError, ServerArgs, StorageBackend};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    // 初始化日誌
    logger::init_server_logger(args.verbose);

    tracing::info!("Starting lead-intake server");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 載入配置
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            AppConfig::from_file(path)?
        }
        None => AppConfig::from_env()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let backend = if args.in_memory {
        StorageBackend::Memory
    } else {
        StorageBackend::Supabase
    };

    let intake = match build_intake(&config, backend) {
        Ok(intake) => intake,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // 啟動時測試資料庫連線，失敗不中止
    match intake.check_storage().await {
        Ok(_) => tracing::info!("✓ Storage connection successful"),
        Err(e) => {
            tracing::error!("✗ Storage connection failed: {}", e);
            let suggestion = match &e {
                IntakeError::StorageError(storage) => storage.recovery_suggestion().to_string(),
                other => other.recovery_suggestion(),
            };
            tracing::error!("💡 {}", suggestion);
        }
    }

    let router = http::router(intake, &config.server);
    let listener = TcpListener::bind(("0.0.0.0", config.server.port)).await?;
    http::serve(listener, router).await?;

    Ok(())
}
