use lead_intake::adapters::SupabaseLeadRepository;
use lead_intake::domain::ports::LeadRepository;
use lead_intake::utils::validation::Validate;
use lead_intake::{AppConfig, IntakeError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("🔍 Testing storage connection...");

    // 可選的 TOML 設定檔路徑，否則讀取環境變數
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    println!("Configuration:");
    println!("  URL:   {}", config.storage.url.as_deref().unwrap_or("<not set>"));
    println!("  Table: {}", config.storage.table);
    println!(
        "  Key:   {}",
        if config.storage.service_key.is_some() { "set" } else { "<not set>" }
    );
    println!();

    if let Err(e) = config.storage.validate() {
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let repository = SupabaseLeadRepository::from_config(&config.storage)?;
    match repository.probe().await {
        Ok(rows) => {
            println!("✅ Storage connection successful!");
            println!("✓ {} table is accessible ({} row(s) sampled)", config.storage.table, rows);
            println!();
            println!("Storage is ready!");
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Storage connection failed!");
            eprintln!();
            match &e {
                IntakeError::StorageError(storage) => {
                    eprintln!("Error details:");
                    eprintln!("  Code:    {}", storage.code.as_deref().unwrap_or("-"));
                    eprintln!("  Message: {}", storage.message);
                    if let Some(hint) = &storage.hint {
                        eprintln!("  Hint:    {}", hint);
                    }
                    eprintln!();
                    eprintln!("💡 {}", storage.recovery_suggestion());
                }
                other => {
                    eprintln!("Error: {}", other);
                    eprintln!("💡 {}", other.recovery_suggestion());
                }
            }
            std::process::exit(1);
        }
    }
}
