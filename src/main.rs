use clap::Parser;
use otp_fetch::utils::{logger, validation::Validate};
use otp_fetch::{CliConfig, CodeFetcher, FetchOutcome, FetchSettings};

const CONFIG_ERROR_EXIT_CODE: i32 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting otp-fetch");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 解析並驗證配置
    let settings = match resolve_settings(&config) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(
                "❌ Configuration failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(CONFIG_ERROR_EXIT_CODE);
        }
    };

    let email = settings.email_address()?;
    let fetcher = CodeFetcher::from_settings(&settings)?;

    let outcome = fetcher.run(&email).await;
    match &outcome {
        FetchOutcome::Found(code) => {
            tracing::info!("✅ Verification code for {}: {}", email, code);
            println!("{}", code);
        }
        FetchOutcome::Unhealthy => {
            eprintln!("❌ Service at {} failed its health check", settings.server_url);
        }
        FetchOutcome::Exhausted => {
            eprintln!(
                "❌ No verification code for {} after {} attempts",
                email, settings.max_attempts
            );
        }
    }

    let exit_code = outcome.exit_code();
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

fn resolve_settings(config: &CliConfig) -> otp_fetch::Result<FetchSettings> {
    let settings = config.resolve()?;
    settings.validate()?;
    Ok(settings)
}
