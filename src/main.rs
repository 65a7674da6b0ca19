use anyhow::Result;
use promptwand_rs::input::{command_summary, parse_line, FormCommand};
use promptwand_rs::logging::ComposeTraceFormatter;
use promptwand_rs::{ConfigManager, MagicPromptApp};
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptwand=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().event_format(ComposeTraceFormatter::new()))
        .init();

    info!("🪄 promptwand-rs starting up!");
    info!("{}", "=".repeat(50));

    // Load configuration
    let config_manager = ConfigManager::load()?;
    config_manager.start_watching();
    let mut config_rx = config_manager.subscribe();
    let config = config_manager.get();
    info!("✅ Configuration loaded");
    info!("   Model: {}", config.model);
    info!("   Auto-copy: {}", config.auto_copy_clipboard);

    let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();

    // Initialize application
    let mut app = MagicPromptApp::new(&config_manager, api_key)?;

    info!("");
    info!("📝 Instructions:");
    for line in command_summary().lines() {
        info!("   {line}");
    }
    info!("");

    // Set up stdin reader
    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();

    // Set up signal handling
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Received SIGINT (Ctrl+C)");
        let _ = shutdown_tx.send(());
    });

    // Main loop
    loop {
        tokio::select! {
            line = reader.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        match parse_line(&line) {
                            Ok(FormCommand::Quit) => break,
                            Ok(command) => {
                                if let Err(e) = app.handle_command(command).await {
                                    warn!("Error handling command: {e:#}");
                                }
                            }
                            Err(message) => println!("{message}"),
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Error reading input: {e}");
                        break;
                    }
                }
            }
            result = config_rx.changed() => {
                match result {
                    Ok(()) => {
                        let updated = config_rx.borrow().clone();
                        if let Err(err) = app.apply_config_update(updated) {
                            warn!("Failed to apply config update: {err:#}");
                        }
                    }
                    Err(_) => {
                        info!("Configuration watcher closed");
                        break;
                    }
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("🛑 Shutting down promptwand-rs...");
    info!("✅ Shutdown complete");

    Ok(())
}
