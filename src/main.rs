use color_eyre::{eyre::eyre, Result};
use padsync::blocks::extension_info;
use padsync::config::BankConfig;
use padsync::monitor::{Initializing, PadMonitor};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    // usage: padsync [--blocks] [CONFIG]
    let mut print_blocks = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        if arg == "--blocks" {
            print_blocks = true;
        } else {
            config_path = Some(PathBuf::from(arg));
        }
    }

    let config = BankConfig::load_or_default(config_path.as_deref())
        .map_err(|e| eyre!("Failed to load config: {}", e))?;

    if print_blocks {
        let info = serde_json::to_string_pretty(&extension_info(config.slot_count))?;
        println!("{}", info);
        return Ok(());
    }

    setup_logging_env(config.level().unwrap_or(Level::INFO));
    info!("Starting padsync with {:?}", config);

    let monitor = PadMonitor::<Initializing>::create(&config)
        .map_err(|e| eyre!("Failed to create pad monitor: {}", e))?
        .initialize();

    monitor
        .run()
        .await
        .map_err(|e| eyre!("Pad monitor stopped: {}", e))?;

    info!("padsync stopped");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    Ok(())
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
