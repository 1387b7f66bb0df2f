use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use habit_planner::{AppConfig, SqliteTaskStore, http_api};

#[derive(Parser)]
#[command(name = "habit-planner-http", about = "Serve the Seven Habits planner API")]
struct Args {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, overriding the config file.
    #[arg(long)]
    addr: Option<SocketAddr>,
    /// SQLite database, overriding the config file.
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    habit_planner::init_tracing();
    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(db) = args.db {
        config.database_path = db;
    }

    let addr: SocketAddr = match args.addr {
        Some(addr) => addr,
        None => config
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address '{}'", config.listen_addr))?,
    };

    let store = SqliteTaskStore::open(&config.database_path).with_context(|| {
        format!("opening task database {}", config.database_path.display())
    })?;
    tracing::info!(database = %config.database_path.display(), "task database ready");

    let state = http_api::AppState::new(store).with_schedule_configs(config.schedule, config.print);
    http_api::serve(addr, state).await?;
    Ok(())
}
